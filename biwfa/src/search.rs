//! One wavefront search, running forward or backward over a pair of sequences.
use crate::{
    abort::AbortCheck,
    compute::{compute_front, Bounds},
    extend::{extend_wavefront, Direction},
    wavefront::{Front, Wavefront, WavefrontSet},
    Result,
};
use biwfa_types::{AlignmentForm, Component, Diag, Offset, Penalties};
use pa_types::{Cost, Seq};

/// A point where a search may stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndPoint {
    pub component: Component,
    pub k: Diag,
    pub offset: Offset,
}

pub struct Search<'a> {
    pub a: Seq<'a>,
    pub b: Seq<'a>,
    pub direction: Direction,
    pub penalties: &'a Penalties,
    pub bounds: Bounds,
    pub fronts: WavefrontSet,
    /// The largest anti-diagonal reached by any M offset so far.
    max_antidiagonal: Offset,
    /// The last score with a non-empty front.
    last_reached: Cost,
}

impl<'a> Search<'a> {
    /// Starts a search and extends its initial front.
    ///
    /// `begin_free` holds the free begins of this search's own direction: for a
    /// backward search, those are the free ends of the forward problem.
    /// Free begins only apply when the search starts in `M`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        a: Seq<'a>,
        b: Seq<'a>,
        direction: Direction,
        penalties: &'a Penalties,
        begin_free: &AlignmentForm,
        component_begin: Component,
        band: Option<(Diag, Diag)>,
        bounded: bool,
    ) -> Self {
        let bounds = Bounds::new(a.len(), b.len(), band);
        let mut fronts = if bounded {
            WavefrontSet::bounded(penalties.max_score_scope())
        } else {
            WavefrontSet::full()
        };
        fronts.push(0, Self::initial_front(begin_free, component_begin, &bounds));
        let mut search = Self {
            a,
            b,
            direction,
            penalties,
            bounds,
            fronts,
            max_antidiagonal: 0,
            last_reached: 0,
        };
        search.extend();
        search
    }

    fn initial_front(begin_free: &AlignmentForm, component_begin: Component, bounds: &Bounds) -> Front {
        let mut front = Front::default();
        if component_begin == Component::M && begin_free.has_free_begin() {
            let (min_k, max_k) = bounds.diagonals();
            let lo = (-(begin_free.pattern_begin_free.min(bounds.pattern_len as usize) as Diag)).max(min_k);
            let hi = (begin_free.text_begin_free.min(bounds.text_len as usize) as Diag).min(max_k);
            let mut wf = Wavefront::new(lo.min(0), hi.max(0));
            for k in lo..=hi {
                wf[k] = k.max(0);
            }
            front.m = wf.trimmed();
        } else {
            *front.layer_mut(component_begin) = Some(Wavefront::single(0, 0));
        }
        front
    }

    /// The last computed score.
    pub fn score(&self) -> Cost {
        self.fronts.last_score()
    }

    pub fn max_antidiagonal(&self) -> Offset {
        self.max_antidiagonal
    }

    pub fn memory(&self) -> usize {
        self.fronts.memory()
    }

    /// Whether no front was reached for a full score scope, so that no later
    /// score can be reached either.
    pub fn is_exhausted(&self) -> bool {
        self.score() - self.last_reached >= self.penalties.max_score_scope() as Cost
    }

    /// Computes and extends the front of the next score.
    pub fn step(&mut self) {
        let s = self.score() + 1;
        let front = compute_front(&self.fronts, self.penalties, &self.bounds, s);
        if !front.is_empty() {
            self.last_reached = s;
        }
        self.fronts.push(s, front);
        self.extend();
    }

    /// Checks the limits for the next score, then steps.
    pub fn checked_step(&mut self, abort: &AbortCheck, other_memory: usize) -> Result<()> {
        abort.check(self.score() + 1, self.memory() + other_memory)?;
        self.step();
        Ok(())
    }

    fn extend(&mut self) {
        let s = self.score();
        let (a, b, direction) = (self.a, self.b, self.direction);
        if let Some(wf) = self.fronts.get_mut(s).m.as_mut() {
            if let Some(ak) = extend_wavefront(direction, a, b, wf) {
                self.max_antidiagonal = self.max_antidiagonal.max(ak);
            }
        }
    }

    /// Whether the front of the last score reaches the end of the alignment
    /// in `component_end`. Free ends apply only when ending in `M`.
    pub fn end_reached(&self, end_free: &AlignmentForm, component_end: Component) -> Option<EndPoint> {
        let front = self.fronts.get(self.score())?;
        let (plen, tlen) = (self.bounds.pattern_len, self.bounds.text_len);
        if component_end == Component::M && end_free.has_free_end() {
            let pattern_end_free = end_free.pattern_end_free as Offset;
            let text_end_free = end_free.text_end_free as Offset;
            front.m.as_ref()?.iter().find_map(|(k, h)| {
                let v = h - k;
                ((h == tlen && plen - v <= pattern_end_free)
                    || (v == plen && tlen - h <= text_end_free))
                    .then_some(EndPoint {
                        component: Component::M,
                        k,
                        offset: h,
                    })
            })
        } else {
            let k = tlen - plen;
            (front.get(component_end, k) == tlen).then_some(EndPoint {
                component: component_end,
                k,
                offset: tlen,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_front_is_extended() {
        let p = Penalties::edit();
        let s = Search::new(
            b"ACGT",
            b"ACCT",
            Direction::Forward,
            &p,
            &AlignmentForm::end_to_end(),
            Component::M,
            None,
            false,
        );
        assert_eq!(s.fronts.layer(0, Component::M).unwrap().get(0), 2);
        assert_eq!(s.max_antidiagonal(), 4);

        let r = Search::new(
            b"ACGT",
            b"ACCT",
            Direction::Backward,
            &p,
            &AlignmentForm::end_to_end(),
            Component::M,
            None,
            true,
        );
        assert_eq!(r.fronts.layer(0, Component::M).unwrap().get(0), 1);
    }

    #[test]
    fn free_begin_diagonals() {
        let p = Penalties::linear(4, 2);
        let s = Search::new(
            b"TTAC",
            b"ACG",
            Direction::Forward,
            &p,
            &AlignmentForm::ends_free(2, 0, 1, 0),
            Component::M,
            None,
            false,
        );
        let m = s.fronts.layer(0, Component::M).unwrap();
        assert_eq!(m.range(), -2..=1);
        // Diagonal -2 starts at (2, 0) and matches "AC".
        assert_eq!(m.get(-2), 2);
        assert_eq!(m.get(1), 1);
        assert_eq!(
            s.end_reached(&AlignmentForm::end_to_end(), Component::M),
            None
        );
    }

    #[test]
    fn gap_component_start() {
        let p = Penalties::affine(4, 6, 2);
        let mut s = Search::new(
            b"AAAA",
            b"",
            Direction::Forward,
            &p,
            &AlignmentForm::end_to_end(),
            Component::D1,
            None,
            false,
        );
        assert!(s.fronts.layer(0, Component::M).is_none());
        for _ in 0..8 {
            s.step();
        }
        // Four extensions of an already open deletion.
        let end = s.end_reached(&AlignmentForm::end_to_end(), Component::D1);
        assert_eq!(
            end,
            Some(EndPoint {
                component: Component::D1,
                k: -4,
                offset: 0
            })
        );
    }
}
