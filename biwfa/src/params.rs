use crate::{aligner::WavefrontAligner, AlignError, Result};
use biwfa_types::{AlignmentForm, Diag, Penalties};
use pa_types::Cost;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sub-problems whose remaining score is at most this are aligned in a single
/// pass instead of being split further.
pub const DEFAULT_BASE_CASE_THRESHOLD: Cost = 100;

/// How much of the wavefront history is kept.
#[derive(clap::ValueEnum, Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemoryMode {
    /// Keep every wavefront and trace back through them. Quadratic memory in the score.
    High,
    /// Bidirectional divide and conquer. Memory linear in the score.
    #[default]
    Ultralow,
}

/// Pruning of the diagonals that are computed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Heuristic {
    /// Exact alignment.
    #[default]
    None,
    /// Only compute diagonals `min_k..=max_k` of the full problem.
    /// The result is optimal among alignments that stay inside the band.
    BandedStatic { min_k: Diag, max_k: Diag },
}

/// Limits after which an alignment is aborted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SystemParams {
    /// Stop when the alignment cost exceeds this.
    #[serde(default)]
    pub max_alignment_score: Option<Cost>,
    /// Stop when the wavefronts held at once exceed this many bytes.
    #[serde(default)]
    pub max_memory: Option<usize>,
    /// Stop when a single alignment runs longer than this.
    #[serde(default)]
    pub max_time: Option<Duration>,
}

/// All parameters of a wavefront aligner. Read-only once an aligner is built,
/// so that one set of parameters can be shared by concurrent alignments.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AlignerParams {
    /// An optional name for the parameter set.
    #[serde(default)]
    pub name: String,

    pub penalties: Penalties,

    #[serde(default)]
    pub form: AlignmentForm,

    #[serde(default)]
    pub heuristic: Heuristic,

    #[serde(default)]
    pub memory_mode: MemoryMode,

    /// Remaining score at or below which the bidirectional recursion switches
    /// to the single-pass aligner.
    #[serde(default = "default_base_case_threshold")]
    pub base_case_threshold: Cost,

    #[serde(default)]
    pub system: SystemParams,
}

fn default_base_case_threshold() -> Cost {
    DEFAULT_BASE_CASE_THRESHOLD
}

impl Default for AlignerParams {
    fn default() -> Self {
        Self::new(Penalties::default())
    }
}

impl AlignerParams {
    pub fn new(penalties: Penalties) -> Self {
        Self {
            name: String::new(),
            penalties,
            form: AlignmentForm::end_to_end(),
            heuristic: Heuristic::None,
            memory_mode: MemoryMode::Ultralow,
            base_case_threshold: DEFAULT_BASE_CASE_THRESHOLD,
            system: SystemParams::default(),
        }
    }

    /// Bidirectional alignment in memory linear in the score.
    pub fn biwfa(penalties: Penalties) -> Self {
        Self {
            name: "biwfa".into(),
            ..Self::new(penalties)
        }
    }

    /// Single-pass alignment keeping all wavefronts.
    pub fn high_memory(penalties: Penalties) -> Self {
        Self {
            name: "high".into(),
            memory_mode: MemoryMode::High,
            ..Self::new(penalties)
        }
    }

    /// Checks everything that can be checked without knowing the sequences.
    pub fn validate(&self) -> Result<()> {
        self.penalties.validate().map_err(AlignError::Configuration)?;
        if let Heuristic::BandedStatic { min_k, max_k } = self.heuristic {
            if min_k > max_k {
                return Err(AlignError::Configuration(format!(
                    "empty band: min_k {min_k} > max_k {max_k}"
                )));
            }
        }
        if self.base_case_threshold < 0 {
            return Err(AlignError::Configuration(format!(
                "base case threshold must be non-negative, got {}",
                self.base_case_threshold
            )));
        }
        Ok(())
    }

    pub fn make_aligner(&self) -> Result<WavefrontAligner> {
        WavefrontAligner::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biwfa_types::DistanceMetric;

    #[test]
    fn validate() {
        assert!(AlignerParams::default().validate().is_ok());
        let mut params = AlignerParams::biwfa(Penalties::linear(4, 0));
        assert!(matches!(
            params.validate(),
            Err(AlignError::Configuration(_))
        ));
        params.penalties = Penalties::linear(4, 2);
        params.heuristic = Heuristic::BandedStatic { min_k: 3, max_k: 2 };
        assert!(params.validate().is_err());
    }

    #[test]
    fn deserialize_with_defaults() {
        let params: AlignerParams = serde_json::from_str(
            r#"{"penalties": {"metric": {"GapLinear": {"mismatch": 4, "indel": 2}}}}"#,
        )
        .unwrap();
        assert_eq!(
            params.penalties.metric,
            DistanceMetric::GapLinear {
                mismatch: 4,
                indel: 2
            }
        );
        assert_eq!(params.memory_mode, MemoryMode::Ultralow);
        assert_eq!(params.base_case_threshold, DEFAULT_BASE_CASE_THRESHOLD);
        assert!(serde_json::from_str::<AlignerParams>(
            r#"{"penalties": {"metric": "Edit"}, "unknown": 1}"#
        )
        .is_err());
    }
}
