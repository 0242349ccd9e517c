use crate::{params::SystemParams, AbortReason, AlignError, Result};
use instant::Instant;
use pa_types::Cost;

/// Enforces the limits of `SystemParams` for one alignment.
///
/// Searches poll this once per score step, and the bidirectional driver once
/// per recursive call. The first failing check aborts the whole alignment.
#[derive(Debug, Clone)]
pub struct AbortCheck {
    start: Instant,
    limits: SystemParams,
}

impl AbortCheck {
    pub fn new(limits: SystemParams) -> Self {
        Self {
            start: Instant::now(),
            limits,
        }
    }

    /// Checks the score, memory and time limits.
    pub fn check(&self, score: Cost, memory: usize) -> Result<()> {
        if let Some(limit) = self.limits.max_alignment_score {
            if score > limit {
                return Err(AlignError::ResourceExhausted(AbortReason::MaxScore {
                    limit,
                }));
            }
        }
        if let Some(limit) = self.limits.max_memory {
            if memory > limit {
                return Err(AlignError::ResourceExhausted(AbortReason::MaxMemory {
                    limit,
                    used: memory,
                }));
            }
        }
        self.check_time()
    }

    /// Checks only the time limit.
    pub fn check_time(&self) -> Result<()> {
        if let Some(limit) = self.limits.max_time {
            if self.start.elapsed() > limit {
                return Err(AlignError::ResourceExhausted(AbortReason::Timeout { limit }));
            }
        }
        Ok(())
    }
}
