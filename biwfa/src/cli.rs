use crate::{
    params::{AlignerParams, Heuristic, MemoryMode, SystemParams, DEFAULT_BASE_CASE_THRESHOLD},
    Result,
};
use biwfa_types::{AlignmentForm, Diag, DistanceMetric, Penalties};
use clap::{Parser, ValueEnum};
use pa_types::Cost;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(ValueEnum, Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetricArg {
    /// Insertions and deletions of cost 1, no mismatches.
    Indel,
    /// Unit cost edit distance.
    Edit,
    /// Mismatch and per-character indel cost.
    GapLinear,
    /// Gap cost `gap_open + len * gap_extend`.
    #[default]
    GapAffine,
    /// Gap cost is the minimum of two affine pieces.
    GapAffine2p,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[clap(next_help_heading = "Aligner")]
pub struct AlignerArgs {
    /// The distance metric.
    #[clap(long, default_value_t, value_enum, display_order = 10)]
    pub metric: MetricArg,

    #[clap(long, default_value_t = 4, display_order = 11)]
    pub mismatch: Cost,

    /// Per-character cost for gap-linear.
    #[clap(long, default_value_t = 2, display_order = 12)]
    pub indel: Cost,

    #[clap(long, default_value_t = 6, display_order = 13)]
    pub gap_open: Cost,

    #[clap(long, default_value_t = 2, display_order = 14)]
    pub gap_extend: Cost,

    /// Opening cost of the second piece for gap-affine-2p.
    #[clap(long, default_value_t = 24, hide_short_help = true)]
    pub gap_open2: Cost,

    /// Extension cost of the second piece for gap-affine-2p.
    #[clap(long, default_value_t = 1, hide_short_help = true)]
    pub gap_extend2: Cost,

    /// Free ends as `pattern_begin,pattern_end,text_begin,text_end`.
    #[clap(long, value_delimiter = ',', num_args = 4, value_name = "PB,PE,TB,TE")]
    pub ends_free: Option<Vec<usize>>,

    #[clap(long, default_value_t, value_enum)]
    pub memory_mode: MemoryMode,

    /// Only compute diagonals in `min_k,max_k`.
    #[clap(long, value_delimiter = ',', num_args = 2, allow_negative_numbers = true, value_name = "MIN_K,MAX_K")]
    pub band: Option<Vec<Diag>>,

    /// Align sub-problems with at most this remaining score in a single pass.
    #[clap(long, default_value_t = DEFAULT_BASE_CASE_THRESHOLD, hide_short_help = true)]
    pub base_case_threshold: Cost,

    /// Abort alignments with a larger score.
    #[clap(long)]
    pub max_score: Option<Cost>,

    /// Abort alignments whose wavefronts use more bytes.
    #[clap(long)]
    pub max_memory: Option<usize>,

    /// Abort alignments that run longer, e.g. `10s` or `1min`.
    #[clap(long, value_parser = parse_duration::parse)]
    pub timeout: Option<Duration>,

    /// Only compute the cost of each alignment, not the cigar.
    #[clap(long)]
    #[serde(default)]
    pub score_only: bool,
}

impl AlignerArgs {
    pub fn penalties(&self) -> Penalties {
        let metric = match self.metric {
            MetricArg::Indel => DistanceMetric::Indel,
            MetricArg::Edit => DistanceMetric::Edit,
            MetricArg::GapLinear => DistanceMetric::GapLinear {
                mismatch: self.mismatch,
                indel: self.indel,
            },
            MetricArg::GapAffine => DistanceMetric::GapAffine {
                mismatch: self.mismatch,
                gap_opening: self.gap_open,
                gap_extension: self.gap_extend,
            },
            MetricArg::GapAffine2p => DistanceMetric::GapAffine2p {
                mismatch: self.mismatch,
                gap_opening1: self.gap_open,
                gap_extension1: self.gap_extend,
                gap_opening2: self.gap_open2,
                gap_extension2: self.gap_extend2,
            },
        };
        Penalties::new(metric)
    }

    /// The parameters described by the flags. They are validated when the
    /// aligner is built.
    pub fn params(&self) -> AlignerParams {
        let form = match self.ends_free.as_deref() {
            Some(&[pb, pe, tb, te]) => AlignmentForm::ends_free(pb, pe, tb, te),
            _ => AlignmentForm::end_to_end(),
        };
        let heuristic = match self.band.as_deref() {
            Some(&[min_k, max_k]) => Heuristic::BandedStatic { min_k, max_k },
            _ => Heuristic::None,
        };
        AlignerParams {
            name: format!("{:?}", self.memory_mode).to_lowercase(),
            penalties: self.penalties(),
            form,
            heuristic,
            memory_mode: self.memory_mode,
            base_case_threshold: self.base_case_threshold,
            system: SystemParams {
                max_alignment_score: self.max_score,
                max_memory: self.max_memory,
                max_time: self.timeout,
            },
        }
    }

    pub fn make_aligner(&self) -> Result<crate::WavefrontAligner> {
        self.params().make_aligner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[clap(flatten)]
        aligner: AlignerArgs,
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::parse_from([
            "biwfa",
            "--metric",
            "gap-linear",
            "--indel",
            "3",
            "--band=-5,5",
            "--ends-free",
            "1,2,3,4",
            "--timeout",
            "2s",
            "--score-only",
        ]);
        let params = cli.aligner.params();
        assert_eq!(params.penalties, Penalties::linear(4, 3));
        assert_eq!(
            params.heuristic,
            Heuristic::BandedStatic { min_k: -5, max_k: 5 }
        );
        assert_eq!(params.form, AlignmentForm::ends_free(1, 2, 3, 4));
        assert_eq!(params.system.max_time, Some(Duration::from_secs(2)));
        assert_eq!(params.memory_mode, MemoryMode::Ultralow);
        assert!(cli.aligner.score_only);
    }

    #[test]
    fn defaults_are_valid() {
        let cli = Cli::parse_from(["biwfa"]);
        assert_eq!(cli.aligner.penalties(), Penalties::affine(4, 6, 2));
        assert!(cli.aligner.make_aligner().is_ok());
        assert!(!cli.aligner.score_only);
    }

    #[test]
    fn command() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
