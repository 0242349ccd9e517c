//! This module contains the `Penalties` and `DistanceMetric` cost models.
//!
//! All penalties are positive costs; the aligners minimize the total cost and
//! report it negated as the alignment score.

use crate::Component;
use pa_types::Cost;
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};

/// The distance metric, together with the penalties it uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Insertions and deletions of cost 1. Mismatches are not allowed.
    Indel,
    /// Levenshtein distance: mismatches, insertions and deletions cost 1.
    Edit,
    /// Linear gap cost: a gap of length `l` costs `l * indel`.
    GapLinear { mismatch: Cost, indel: Cost },
    /// A gap of length `l` costs `gap_opening + l * gap_extension`.
    GapAffine {
        mismatch: Cost,
        gap_opening: Cost,
        gap_extension: Cost,
    },
    /// A gap of length `l` costs the minimum over both pieces of
    /// `gap_opening + l * gap_extension`.
    GapAffine2p {
        mismatch: Cost,
        gap_opening1: Cost,
        gap_extension1: Cost,
        gap_opening2: Cost,
        gap_extension2: Cost,
    },
}

use DistanceMetric::*;

/// A full cost model: the match score and the distance metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Penalties {
    /// The score of a match. Only `0` is supported.
    #[serde(default)]
    pub match_score: Cost,
    pub metric: DistanceMetric,
}

impl Default for Penalties {
    /// Gap-affine with mismatch 4, gap opening 6 and gap extension 2.
    fn default() -> Self {
        Self::affine(4, 6, 2)
    }
}

impl Penalties {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            match_score: 0,
            metric,
        }
    }
    pub fn indel() -> Self {
        Self::new(Indel)
    }
    pub fn edit() -> Self {
        Self::new(Edit)
    }
    pub fn linear(mismatch: Cost, indel: Cost) -> Self {
        Self::new(GapLinear { mismatch, indel })
    }
    pub fn affine(mismatch: Cost, gap_opening: Cost, gap_extension: Cost) -> Self {
        Self::new(GapAffine {
            mismatch,
            gap_opening,
            gap_extension,
        })
    }
    pub fn affine2p(
        mismatch: Cost,
        gap_opening1: Cost,
        gap_extension1: Cost,
        gap_opening2: Cost,
        gap_extension2: Cost,
    ) -> Self {
        Self::new(GapAffine2p {
            mismatch,
            gap_opening1,
            gap_extension1,
            gap_opening2,
            gap_extension2,
        })
    }

    /// Checks that the penalties describe a metric the wavefront recurrences
    /// can handle. Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.match_score != 0 {
            return Err(format!(
                "match score must be 0, got {}",
                self.match_score
            ));
        }
        let positive = |name: &str, c: Cost| {
            if c > 0 {
                Ok(())
            } else {
                Err(format!("{name} must be positive, got {c}"))
            }
        };
        let non_negative = |name: &str, c: Cost| {
            if c >= 0 {
                Ok(())
            } else {
                Err(format!("{name} must be non-negative, got {c}"))
            }
        };
        match self.metric {
            Indel | Edit => Ok(()),
            GapLinear { mismatch, indel } => {
                positive("mismatch", mismatch)?;
                positive("indel", indel)
            }
            GapAffine {
                mismatch,
                gap_opening,
                gap_extension,
            } => {
                positive("mismatch", mismatch)?;
                non_negative("gap opening", gap_opening)?;
                positive("gap extension", gap_extension)
            }
            GapAffine2p {
                mismatch,
                gap_opening1,
                gap_extension1,
                gap_opening2,
                gap_extension2,
            } => {
                positive("mismatch", mismatch)?;
                non_negative("gap opening 1", gap_opening1)?;
                positive("gap extension 1", gap_extension1)?;
                non_negative("gap opening 2", gap_opening2)?;
                positive("gap extension 2", gap_extension2)
            }
        }
    }

    /// The mismatch cost, or `None` when mismatches are not allowed.
    pub fn mismatch(&self) -> Option<Cost> {
        match self.metric {
            Indel => None,
            Edit => Some(1),
            GapLinear { mismatch, .. }
            | GapAffine { mismatch, .. }
            | GapAffine2p { mismatch, .. } => Some(mismatch),
        }
    }

    /// The cost of a single indel for metrics without gap layers.
    pub fn linear_indel(&self) -> Option<Cost> {
        match self.metric {
            Indel | Edit => Some(1),
            GapLinear { indel, .. } => Some(indel),
            GapAffine { .. } | GapAffine2p { .. } => None,
        }
    }

    /// `(gap_opening, gap_extension)` of the given gap piece, when the metric has it.
    pub fn gap_piece(&self, piece: usize) -> Option<(Cost, Cost)> {
        match (self.metric, piece) {
            (
                GapAffine {
                    gap_opening,
                    gap_extension,
                    ..
                },
                0,
            ) => Some((gap_opening, gap_extension)),
            (
                GapAffine2p {
                    gap_opening1,
                    gap_extension1,
                    ..
                },
                0,
            ) => Some((gap_opening1, gap_extension1)),
            (
                GapAffine2p {
                    gap_opening2,
                    gap_extension2,
                    ..
                },
                1,
            ) => Some((gap_opening2, gap_extension2)),
            _ => None,
        }
    }

    /// The number of gap pieces: 0 for indel/edit/linear, 1 for affine, 2 for 2-piece affine.
    pub fn num_pieces(&self) -> usize {
        match self.metric {
            Indel | Edit | GapLinear { .. } => 0,
            GapAffine { .. } => 1,
            GapAffine2p { .. } => 2,
        }
    }

    /// The components whose wavefronts this metric computes, in the order
    /// junctions between them are checked.
    pub fn components(&self) -> &'static [Component] {
        match self.num_pieces() {
            0 => &[Component::M],
            1 => &[Component::M, Component::D1, Component::I1],
            _ => &[
                Component::M,
                Component::D1,
                Component::I1,
                Component::D2,
                Component::I2,
            ],
        }
    }

    /// The most expensive single edge of the alignment graph: a mismatch, or
    /// opening and extending a gap by one.
    pub fn max_edge_cost(&self) -> Cost {
        let mut cost = self.mismatch().unwrap_or(0);
        if let Some(indel) = self.linear_indel() {
            cost = max(cost, indel);
        }
        for piece in 0..self.num_pieces() {
            if let Some((o, e)) = self.gap_piece(piece) {
                cost = max(cost, o + e);
            }
        }
        cost
    }

    /// The number of consecutive scores a wavefront computation looks back.
    /// Keeping this many scores is enough to compute the next one.
    pub fn max_score_scope(&self) -> usize {
        self.max_edge_cost() as usize + 1
    }

    /// The cost charged once per gap that is counted twice when a forward and
    /// a reverse path meet inside the same gap component.
    pub fn gap_opening(&self, component: Component) -> Cost {
        component
            .piece()
            .and_then(|p| self.gap_piece(p))
            .map_or(0, |(o, _)| o)
    }

    /// The gap-opening slack used when proving that no better junction can be
    /// found. For metrics without gap layers this is the single indel cost.
    pub fn termination_gap_opening(&self) -> Cost {
        match self.metric {
            Indel | Edit => 1,
            GapLinear { indel, .. } => indel,
            GapAffine { gap_opening, .. } => gap_opening,
            GapAffine2p {
                gap_opening1,
                gap_opening2,
                ..
            } => max(gap_opening1, gap_opening2),
        }
    }

    /// The cost of a gap of `len` characters, opened fresh.
    pub fn gap_cost(&self, len: usize) -> Cost {
        if len == 0 {
            return 0;
        }
        let len = len as Cost;
        match self.metric {
            Indel | Edit => len,
            GapLinear { indel, .. } => len * indel,
            GapAffine {
                gap_opening,
                gap_extension,
                ..
            } => gap_opening + len * gap_extension,
            GapAffine2p {
                gap_opening1,
                gap_extension1,
                gap_opening2,
                gap_extension2,
                ..
            } => min(
                gap_opening1 + len * gap_extension1,
                gap_opening2 + len * gap_extension2,
            ),
        }
    }

    /// The cost of extending an already open gap of the given component by `len` characters.
    pub fn gap_extension_cost(&self, component: Component, len: usize) -> Cost {
        match component.piece().and_then(|p| self.gap_piece(p)) {
            Some((_, e)) => len as Cost * e,
            None => self.gap_cost(len),
        }
    }
}
