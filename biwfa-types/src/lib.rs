use serde::{Deserialize, Serialize};

pub mod cigar;
pub mod cost_model;
pub mod form;

// Re-export types for convenience of `use biwfa_types::*;`.
pub use cigar::*;
pub use cost_model::*;
pub use form::*;

/// Furthest reaching point on a diagonal, stored as the text coordinate `h`.
/// The pattern coordinate follows as `v = h - k`.
pub type Offset = i32;

/// Diagonal index `k = h - v`: text index minus pattern index.
pub type Diag = i32;

/// Marks a diagonal that has not been reached.
/// Far enough from `i32::MIN` that adding a few penalties can not wrap around.
pub const OFFSET_NULL: Offset = i32::MIN / 2;

/// The state of the gap-affine automaton a wavefront belongs to.
///
/// Indel, edit and gap-linear alignments only use `M`. Gap-affine adds the
/// `I1`/`D1` gap layers, and two-piece gap-affine additionally `I2`/`D2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Component {
    /// Match/mismatch.
    #[default]
    M,
    /// Insertion in the first gap piece (consumes text).
    I1,
    /// Deletion in the first gap piece (consumes pattern).
    D1,
    /// Insertion in the second gap piece.
    I2,
    /// Deletion in the second gap piece.
    D2,
}

impl Component {
    pub fn is_insertion(&self) -> bool {
        matches!(self, Component::I1 | Component::I2)
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, Component::D1 | Component::D2)
    }

    /// The gap piece (0 or 1) of an indel component, or `None` for `M`.
    pub fn piece(&self) -> Option<usize> {
        match self {
            Component::M => None,
            Component::I1 | Component::D1 => Some(0),
            Component::I2 | Component::D2 => Some(1),
        }
    }
}

/// The pattern coordinate of offset `h` on diagonal `k`.
#[inline]
pub fn offset_v(k: Diag, h: Offset) -> Offset {
    h - k
}

/// The anti-diagonal `v + h` of offset `h` on diagonal `k`.
#[inline]
pub fn antidiagonal(k: Diag, h: Offset) -> Offset {
    2 * h - k
}

/// Maps a diagonal between the forward and the reversed problem.
/// Applying it twice gives back the original diagonal.
#[inline]
pub fn diagonal_inverse(k: Diag, pattern_len: usize, text_len: usize) -> Diag {
    (text_len as Diag - pattern_len as Diag) - k
}
