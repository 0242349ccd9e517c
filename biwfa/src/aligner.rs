use crate::{
    abort::AbortCheck,
    align::align_single_pass,
    bialign::{BiAlign, SubProblem},
    params::{AlignerParams, Heuristic, MemoryMode},
    AbortReason, AlignError, Result,
};
use biwfa_types::{Cigar, Component, Diag};
use log::warn;
use pa_types::{Cost, Seq};

/// Aligns pairs of sequences with fixed parameters.
///
/// The aligner holds no per-alignment state, so a single instance can be
/// shared between threads that align different pairs at the same time.
#[derive(Debug, Clone)]
pub struct WavefrontAligner {
    params: AlignerParams,
}

impl WavefrontAligner {
    pub fn new(params: AlignerParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AlignerParams {
        &self.params
    }

    /// Aligns `pattern` against `text`.
    ///
    /// The score of the returned cigar is the negated cost of the alignment.
    /// Deletions consume pattern characters and insertions consume text characters.
    pub fn align(&self, pattern: Seq, text: Seq) -> Result<Cigar> {
        let result = self.align_impl(pattern, text);
        Self::warn_abort(&result, pattern, text);
        result
    }

    /// The cost of an optimal alignment, without the alignment itself.
    ///
    /// In `MemoryMode::Ultralow` this only searches for the first junction.
    pub fn cost(&self, pattern: Seq, text: Seq) -> Result<Cost> {
        let result = self.cost_impl(pattern, text);
        Self::warn_abort(&result, pattern, text);
        result
    }

    fn warn_abort<T>(result: &Result<T>, pattern: Seq, text: Seq) {
        if let Err(AlignError::ResourceExhausted(reason)) = result {
            warn!(
                "Aborted alignment of lengths {} and {}: {reason}",
                pattern.len(),
                text.len()
            );
        }
    }

    fn band(&self) -> Option<(Diag, Diag)> {
        match self.params.heuristic {
            Heuristic::None => None,
            Heuristic::BandedStatic { min_k, max_k } => Some((min_k, max_k)),
        }
    }

    fn bialign<'p>(&'p self, abort: &'p AbortCheck) -> BiAlign<'p> {
        BiAlign {
            penalties: &self.params.penalties,
            heuristic: self.params.heuristic,
            base_case_threshold: self.params.base_case_threshold,
            abort,
        }
    }

    fn cost_impl(&self, pattern: Seq, text: Seq) -> Result<Cost> {
        self.check_band(pattern.len(), text.len())?;
        let abort = AbortCheck::new(self.params.system);
        let form = self.params.form.clamped(pattern.len(), text.len());
        let cost = match self.params.memory_mode {
            MemoryMode::High => -align_single_pass(
                pattern,
                text,
                &self.params.penalties,
                &form,
                Component::M,
                Component::M,
                self.band(),
                &abort,
            )?
            .score(),
            MemoryMode::Ultralow => self.bialign(&abort).score(pattern, text, form)?,
        };
        self.check_max_score(cost)?;
        Ok(cost)
    }

    fn align_impl(&self, pattern: Seq, text: Seq) -> Result<Cigar> {
        self.check_band(pattern.len(), text.len())?;
        let abort = AbortCheck::new(self.params.system);
        let form = self.params.form.clamped(pattern.len(), text.len());
        let band = self.band();

        let cigar = match self.params.memory_mode {
            MemoryMode::High => align_single_pass(
                pattern,
                text,
                &self.params.penalties,
                &form,
                Component::M,
                Component::M,
                band,
                &abort,
            )?,
            MemoryMode::Ultralow => {
                let mut cigar = Cigar::new();
                let cost = self
                    .bialign(&abort)
                    .align(SubProblem::root(pattern, text, form), 0, &mut cigar)?;
                cigar.set_score(-cost);
                cigar
            }
        };

        self.check_max_score(-cigar.score())?;
        Ok(cigar)
    }

    fn check_max_score(&self, cost: Cost) -> Result<()> {
        match self.params.system.max_alignment_score {
            Some(limit) if cost > limit => {
                Err(AlignError::ResourceExhausted(AbortReason::MaxScore { limit }))
            }
            _ => Ok(()),
        }
    }

    /// A band must contain the start and end diagonal of the problem.
    fn check_band(&self, pattern_len: usize, text_len: usize) -> Result<()> {
        let Heuristic::BandedStatic { min_k, max_k } = self.params.heuristic else {
            return Ok(());
        };
        let k_end = text_len as Diag - pattern_len as Diag;
        for k in [0, k_end] {
            if k < min_k || k > max_k {
                return Err(AlignError::Configuration(format!(
                    "band {min_k}..={max_k} does not contain diagonal {k} for lengths {pattern_len} and {text_len}"
                )));
            }
        }
        Ok(())
    }
}
