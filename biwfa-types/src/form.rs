//! The alignment form: which ends of the sequences may be skipped for free.

use serde::{Deserialize, Serialize};

/// Whether an alignment spans both sequences entirely or may skip some of their ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Span {
    EndToEnd,
    EndsFree,
}

/// Maximum number of characters at each end of the pattern and text that may
/// be left unaligned without penalty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentForm {
    pub pattern_begin_free: usize,
    pub pattern_end_free: usize,
    pub text_begin_free: usize,
    pub text_end_free: usize,
}

impl AlignmentForm {
    /// A global alignment: all four ends are penalized.
    pub fn end_to_end() -> Self {
        Self::default()
    }

    pub fn ends_free(
        pattern_begin_free: usize,
        pattern_end_free: usize,
        text_begin_free: usize,
        text_end_free: usize,
    ) -> Self {
        Self {
            pattern_begin_free,
            pattern_end_free,
            text_begin_free,
            text_end_free,
        }
    }

    pub fn span(&self) -> Span {
        if self.has_free_begin() || self.has_free_end() {
            Span::EndsFree
        } else {
            Span::EndToEnd
        }
    }

    pub fn has_free_begin(&self) -> bool {
        self.pattern_begin_free > 0 || self.text_begin_free > 0
    }

    pub fn has_free_end(&self) -> bool {
        self.pattern_end_free > 0 || self.text_end_free > 0
    }

    /// Keeps only the free begins. Used for the first half of a split problem.
    pub fn leading(&self) -> Self {
        Self {
            pattern_end_free: 0,
            text_end_free: 0,
            ..*self
        }
    }

    /// Keeps only the free ends. Used for the second half of a split problem.
    pub fn trailing(&self) -> Self {
        Self {
            pattern_begin_free: 0,
            text_begin_free: 0,
            ..*self
        }
    }

    /// The form of the reversed problem: begins and ends swap roles.
    pub fn reversed(&self) -> Self {
        Self {
            pattern_begin_free: self.pattern_end_free,
            pattern_end_free: self.pattern_begin_free,
            text_begin_free: self.text_end_free,
            text_end_free: self.text_begin_free,
        }
    }

    /// Limits the free lengths to the actual sequence lengths.
    pub fn clamped(&self, pattern_len: usize, text_len: usize) -> Self {
        Self {
            pattern_begin_free: self.pattern_begin_free.min(pattern_len),
            pattern_end_free: self.pattern_end_free.min(pattern_len),
            text_begin_free: self.text_begin_free.min(text_len),
            text_end_free: self.text_end_free.min(text_len),
        }
    }
}
