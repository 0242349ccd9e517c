use pa_types::Cost;
use std::time::Duration;

/// The resource limit that stopped an alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// The alignment score exceeded `max_alignment_score`.
    MaxScore { limit: Cost },
    /// The wavefronts of a search used more than `max_memory` bytes.
    MaxMemory { limit: usize, used: usize },
    /// The alignment ran longer than `max_time`.
    Timeout { limit: Duration },
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::MaxScore { limit } => write!(f, "alignment score exceeds {limit}"),
            AbortReason::MaxMemory { limit, used } => {
                write!(f, "wavefronts use {used} bytes, more than {limit}")
            }
            AbortReason::Timeout { limit } => write!(f, "alignment takes longer than {limit:?}"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// The parameters do not describe an alignment that can be computed.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A resource limit was hit. No partial alignment is returned.
    #[error("alignment aborted: {0}")]
    ResourceExhausted(AbortReason),
}

pub type Result<T> = std::result::Result<T, AlignError>;
