//! The wavefront recurrences.
//!
//! Each output offset is the maximum over a few sources, where a source is a
//! wavefront of an earlier score (or an earlier component of the same score)
//! read at diagonal `k - dk` and advanced by `dh` text characters.
//! Insertions consume text and come from diagonal `k - 1`, deletions consume
//! pattern and come from diagonal `k + 1`.
use crate::wavefront::{Front, Wavefront, WavefrontSet};
use biwfa_types::{Component, Diag, DistanceMetric, Offset, Penalties, OFFSET_NULL};
use pa_types::Cost;

/// Limits on the diagonals and offsets one search may produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub pattern_len: Offset,
    pub text_len: Offset,
    /// Inclusive range of diagonals that may be computed, in the coordinates of the search.
    pub band: Option<(Diag, Diag)>,
}

impl Bounds {
    pub fn new(pattern_len: usize, text_len: usize, band: Option<(Diag, Diag)>) -> Self {
        Self {
            pattern_len: pattern_len as Offset,
            text_len: text_len as Offset,
            band,
        }
    }

    /// The diagonals inside the matrix and the band.
    pub fn diagonals(&self) -> (Diag, Diag) {
        let (lo, hi) = (-self.pattern_len, self.text_len);
        match self.band {
            Some((min_k, max_k)) => (lo.max(min_k), hi.min(max_k)),
            None => (lo, hi),
        }
    }

    /// Whether offset `h` on diagonal `k` lies inside the matrix.
    #[inline]
    pub fn is_valid(&self, k: Diag, h: Offset) -> bool {
        let v = h - k;
        0 <= h && h <= self.text_len && 0 <= v && v <= self.pattern_len
    }
}

#[derive(Clone, Copy)]
struct Source<'w> {
    wf: &'w Wavefront,
    dk: Diag,
    dh: Offset,
}

impl<'w> Source<'w> {
    #[inline]
    fn get(&self, k: Diag) -> Offset {
        let o = self.wf.get(k - self.dk);
        if o == OFFSET_NULL {
            OFFSET_NULL
        } else {
            o + self.dh
        }
    }
}

fn source(wf: Option<&Wavefront>, dk: Diag, dh: Offset) -> Option<Source<'_>> {
    wf.map(|wf| Source { wf, dk, dh })
}

/// Takes the maximum of the sources on each diagonal of the union of their
/// shifted ranges. Offsets outside the matrix are dropped, and `None` is
/// returned when nothing remains.
fn combine<const N: usize>(bounds: &Bounds, sources: [Option<Source<'_>>; N]) -> Option<Wavefront> {
    let sources = sources.iter().flatten();
    let lo = sources.clone().map(|s| s.wf.lo() + s.dk).min()?;
    let hi = sources.clone().map(|s| s.wf.hi() + s.dk).max()?;
    let (min_k, max_k) = bounds.diagonals();
    let (lo, hi) = (lo.max(min_k), hi.min(max_k));
    if lo > hi {
        return None;
    }
    let mut wf = Wavefront::new(lo, hi);
    for k in lo..=hi {
        let h = sources.clone().map(|s| s.get(k)).max().unwrap_or(OFFSET_NULL);
        if h != OFFSET_NULL && bounds.is_valid(k, h) {
            wf[k] = h;
        }
    }
    wf.trimmed()
}

/// Computes the front of score `s` from the fronts of lower scores.
pub fn compute_front(
    fronts: &WavefrontSet,
    penalties: &Penalties,
    bounds: &Bounds,
    s: Cost,
) -> Front {
    let layer = |cost: Cost, c: Component| fronts.layer(s - cost, c);
    let m = |cost: Cost| layer(cost, Component::M);

    match penalties.metric {
        DistanceMetric::Indel => Front {
            m: combine(bounds, [source(m(1), 1, 1), source(m(1), -1, 0)]),
            ..Default::default()
        },
        DistanceMetric::Edit => Front {
            m: combine(
                bounds,
                [
                    source(m(1), 0, 1),
                    source(m(1), 1, 1),
                    source(m(1), -1, 0),
                ],
            ),
            ..Default::default()
        },
        DistanceMetric::GapLinear { mismatch, indel } => Front {
            m: combine(
                bounds,
                [
                    source(m(mismatch), 0, 1),
                    source(m(indel), 1, 1),
                    source(m(indel), -1, 0),
                ],
            ),
            ..Default::default()
        },
        DistanceMetric::GapAffine {
            mismatch,
            gap_opening: o,
            gap_extension: e,
        } => {
            let i1 = combine(
                bounds,
                [source(m(o + e), 1, 1), source(layer(e, Component::I1), 1, 1)],
            );
            let d1 = combine(
                bounds,
                [source(m(o + e), -1, 0), source(layer(e, Component::D1), -1, 0)],
            );
            let m = combine(
                bounds,
                [
                    source(m(mismatch), 0, 1),
                    source(i1.as_ref(), 0, 0),
                    source(d1.as_ref(), 0, 0),
                ],
            );
            Front {
                m,
                i1,
                d1,
                ..Default::default()
            }
        }
        DistanceMetric::GapAffine2p {
            mismatch,
            gap_opening1: o1,
            gap_extension1: e1,
            gap_opening2: o2,
            gap_extension2: e2,
        } => {
            let i1 = combine(
                bounds,
                [source(m(o1 + e1), 1, 1), source(layer(e1, Component::I1), 1, 1)],
            );
            let d1 = combine(
                bounds,
                [source(m(o1 + e1), -1, 0), source(layer(e1, Component::D1), -1, 0)],
            );
            let i2 = combine(
                bounds,
                [source(m(o2 + e2), 1, 1), source(layer(e2, Component::I2), 1, 1)],
            );
            let d2 = combine(
                bounds,
                [source(m(o2 + e2), -1, 0), source(layer(e2, Component::D2), -1, 0)],
            );
            let m = combine(
                bounds,
                [
                    source(m(mismatch), 0, 1),
                    source(i1.as_ref(), 0, 0),
                    source(d1.as_ref(), 0, 0),
                    source(i2.as_ref(), 0, 0),
                    source(d2.as_ref(), 0, 0),
                ],
            );
            Front { m, i1, d1, i2, d2 }
        }
    }
}

/// How the M offset at some `(s, k)` was produced, before extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MSource {
    /// From `M[s - cost][k]` by one mismatch.
    Mismatch(Cost),
    /// From `M[s - cost][k - 1]` by one insertion.
    Ins(Cost),
    /// From `M[s - cost][k + 1]` by one deletion.
    Del(Cost),
    /// Closing the gap component at the same score.
    Gap(Component),
}

/// Recomputes the M offset at `(s, k)` before extension, together with the
/// first source that produces it. `None` when no source exists, which only
/// happens for the initial front.
pub fn m_source(
    fronts: &WavefrontSet,
    penalties: &Penalties,
    s: Cost,
    k: Diag,
) -> Option<(Offset, MSource)> {
    let m = |cost: Cost, dk: Diag, dh: Offset| {
        let o = fronts
            .layer(s - cost, Component::M)
            .map_or(OFFSET_NULL, |wf| wf.get(k - dk));
        if o == OFFSET_NULL {
            OFFSET_NULL
        } else {
            o + dh
        }
    };
    let gap = |c: Component| fronts.get(s).map_or(OFFSET_NULL, |f| f.get(c, k));

    let mut candidates: Vec<(Offset, MSource)> = Vec::with_capacity(5);
    if let Some(x) = penalties.mismatch() {
        candidates.push((m(x, 0, 1), MSource::Mismatch(x)));
    }
    if let Some(i) = penalties.linear_indel() {
        candidates.push((m(i, 1, 1), MSource::Ins(i)));
        candidates.push((m(i, -1, 0), MSource::Del(i)));
    }
    for &c in penalties.components() {
        if c != Component::M {
            candidates.push((gap(c), MSource::Gap(c)));
        }
    }

    let mut best: Option<(Offset, MSource)> = None;
    for (h, src) in candidates {
        if h != OFFSET_NULL && best.map_or(true, |(b, _)| h > b) {
            best = Some((h, src));
        }
    }
    best
}
