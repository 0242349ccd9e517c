//! Exact pairwise alignment with the wavefront algorithm.
//!
//! `WavefrontAligner` computes an optimal alignment under indel, edit,
//! gap-linear, gap-affine and two-piece gap-affine penalties. In the default
//! `MemoryMode::Ultralow`, a forward and a backward wavefront search meet in
//! the middle and the problem is split recursively at their cheapest junction,
//! so that only the last few wavefronts of each search are kept in memory.
//!
//! ```
//! use biwfa::{AlignerParams, Penalties};
//!
//! let aligner = AlignerParams::biwfa(Penalties::affine(4, 6, 2))
//!     .make_aligner()
//!     .unwrap();
//! let cigar = aligner.align(b"ACGT", b"ACT").unwrap();
//! assert_eq!(cigar.score(), -8);
//! assert_eq!(cigar.to_string(), "2M1D1M");
//! ```

mod abort;
mod align;
mod aligner;
mod backtrace;
mod bialign;
mod compute;
mod error;
mod extend;
mod search;
mod wavefront;

pub mod cli;
pub mod params;

#[cfg(test)]
mod tests;

pub use aligner::WavefrontAligner;
pub use bialign::Junction;
pub use error::*;
pub use extend::Direction;
pub use params::{AlignerParams, Heuristic, MemoryMode, SystemParams};

pub use biwfa_types::{AlignmentForm, Cigar, CigarOp, Component, DistanceMetric, Penalties};
