//! Storage for wavefronts.
//!
//! A `Wavefront` holds the furthest reaching offset of each diagonal in an
//! inclusive range `lo..=hi`, for one score and one component.
//! A `Front` groups the wavefronts of all components for one score, and a
//! `WavefrontSet` holds the fronts of a search, either all of them or only
//! the last `max_score_scope` scores.
use biwfa_types::{Component, Diag, Offset, OFFSET_NULL};
use pa_types::Cost;
use std::{
    fmt::Debug,
    ops::{Index, IndexMut, RangeInclusive},
};

/// Furthest reaching offsets for a contiguous range of diagonals.
///
/// Offsets are stored with a bias of `lo`, so that diagonal `k` lives at index `k - lo`.
#[derive(Clone, PartialEq, Eq)]
pub struct Wavefront {
    offsets: Vec<Offset>,
    lo: Diag,
    hi: Diag,
}

impl Debug for Wavefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wavefront")
            .field("range", &self.range())
            .field(
                "offsets",
                &self
                    .offsets
                    .iter()
                    .map(|&o| (o != OFFSET_NULL).then_some(o))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Wavefront {
    /// A wavefront for diagonals `lo..=hi` with all offsets unset.
    pub fn new(lo: Diag, hi: Diag) -> Self {
        assert!(lo <= hi, "Empty wavefront range {lo}..={hi}");
        Self {
            offsets: vec![OFFSET_NULL; (hi - lo + 1) as usize],
            lo,
            hi,
        }
    }

    /// A wavefront with a single offset.
    pub fn single(k: Diag, offset: Offset) -> Self {
        let mut wf = Self::new(k, k);
        wf[k] = offset;
        wf
    }

    #[inline]
    pub fn lo(&self) -> Diag {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> Diag {
        self.hi
    }

    #[inline]
    pub fn range(&self) -> RangeInclusive<Diag> {
        self.lo..=self.hi
    }

    #[inline]
    pub fn contains(&self, k: Diag) -> bool {
        self.lo <= k && k <= self.hi
    }

    /// The offset on diagonal `k`, or `OFFSET_NULL` outside the range.
    #[inline]
    pub fn get(&self, k: Diag) -> Offset {
        if self.contains(k) {
            self.offsets[(k - self.lo) as usize]
        } else {
            OFFSET_NULL
        }
    }

    /// Iterates the set offsets as `(k, offset)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Diag, Offset)> + '_ {
        self.range()
            .zip(self.offsets.iter().copied())
            .filter(|&(_, o)| o != OFFSET_NULL)
    }

    /// Shrinks the range to the first and last set offset.
    /// Returns `None` when no offset is set.
    pub fn trimmed(mut self) -> Option<Self> {
        let first = self.offsets.iter().position(|&o| o != OFFSET_NULL)?;
        let last = self.offsets.iter().rposition(|&o| o != OFFSET_NULL)?;
        self.offsets.truncate(last + 1);
        self.offsets.drain(..first);
        self.hi = self.lo + last as Diag;
        self.lo += first as Diag;
        Some(self)
    }

    /// Bytes used by the offsets.
    pub fn memory(&self) -> usize {
        self.offsets.capacity() * std::mem::size_of::<Offset>()
    }
}

impl Index<Diag> for Wavefront {
    type Output = Offset;

    #[inline]
    fn index(&self, k: Diag) -> &Self::Output {
        assert!(self.contains(k), "Diagonal {k} outside {:?}", self.range());
        &self.offsets[(k - self.lo) as usize]
    }
}

impl IndexMut<Diag> for Wavefront {
    #[inline]
    fn index_mut(&mut self, k: Diag) -> &mut Self::Output {
        assert!(self.contains(k), "Diagonal {k} outside {:?}", self.range());
        &mut self.offsets[(k - self.lo) as usize]
    }
}

/// The wavefronts of all components for a single score.
/// Components that are not reached at this score are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Front {
    pub m: Option<Wavefront>,
    pub i1: Option<Wavefront>,
    pub d1: Option<Wavefront>,
    pub i2: Option<Wavefront>,
    pub d2: Option<Wavefront>,
}

impl Front {
    #[inline]
    pub fn layer(&self, component: Component) -> Option<&Wavefront> {
        match component {
            Component::M => self.m.as_ref(),
            Component::I1 => self.i1.as_ref(),
            Component::D1 => self.d1.as_ref(),
            Component::I2 => self.i2.as_ref(),
            Component::D2 => self.d2.as_ref(),
        }
    }

    #[inline]
    pub fn layer_mut(&mut self, component: Component) -> &mut Option<Wavefront> {
        match component {
            Component::M => &mut self.m,
            Component::I1 => &mut self.i1,
            Component::D1 => &mut self.d1,
            Component::I2 => &mut self.i2,
            Component::D2 => &mut self.d2,
        }
    }

    /// The offset of `component` on diagonal `k`, or `OFFSET_NULL`.
    #[inline]
    pub fn get(&self, component: Component, k: Diag) -> Offset {
        self.layer(component).map_or(OFFSET_NULL, |wf| wf.get(k))
    }

    pub fn is_empty(&self) -> bool {
        self.m.is_none()
            && self.i1.is_none()
            && self.d1.is_none()
            && self.i2.is_none()
            && self.d2.is_none()
    }

    pub fn memory(&self) -> usize {
        [&self.m, &self.i1, &self.d1, &self.i2, &self.d2]
            .into_iter()
            .flatten()
            .map(Wavefront::memory)
            .sum()
    }
}

/// The fronts of one search, indexed by score.
///
/// In bounded mode only the last `scope` scores are retained, in a ring buffer
/// indexed by `score % scope`. Looking up an older score returns `None`.
#[derive(Debug)]
pub struct WavefrontSet {
    /// Each slot remembers which score it holds.
    fronts: Vec<(Cost, Front)>,
    /// The ring size in bounded mode.
    scope: Option<usize>,
    /// The highest score stored so far.
    last: Cost,
}

impl WavefrontSet {
    /// Keeps all fronts.
    pub fn full() -> Self {
        Self {
            fronts: vec![],
            scope: None,
            last: -1,
        }
    }

    /// Keeps only the fronts of the last `scope` scores.
    pub fn bounded(scope: usize) -> Self {
        assert!(scope > 0);
        Self {
            fronts: (0..scope).map(|_| (-1, Front::default())).collect(),
            scope: Some(scope),
            last: -1,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.scope.is_some()
    }

    /// The highest score stored so far, or -1.
    pub fn last_score(&self) -> Cost {
        self.last
    }

    /// The lowest score that is still retained.
    pub fn min_retained_score(&self) -> Cost {
        match self.scope {
            Some(scope) => (self.last - (scope as Cost - 1)).max(0),
            None => 0,
        }
    }

    /// The front for score `s`, if it is retained.
    #[inline]
    pub fn get(&self, s: Cost) -> Option<&Front> {
        if s < 0 || s > self.last {
            return None;
        }
        let idx = match self.scope {
            Some(scope) => s as usize % scope,
            None => s as usize,
        };
        match self.fronts.get(idx) {
            Some((score, front)) if *score == s => Some(front),
            _ => None,
        }
    }

    /// The wavefront of `component` at score `s`, if it is retained and reached.
    #[inline]
    pub fn layer(&self, s: Cost, component: Component) -> Option<&Wavefront> {
        self.get(s)?.layer(component)
    }

    /// The mutable front for score `s`. Panics if `s` is not retained.
    pub fn get_mut(&mut self, s: Cost) -> &mut Front {
        let idx = match self.scope {
            Some(scope) => s as usize % scope,
            None => s as usize,
        };
        let (score, front) = &mut self.fronts[idx];
        assert_eq!(*score, s, "Front for score {s} is not retained");
        front
    }

    /// Stores the front for score `s`, which must be the next score.
    /// In bounded mode this drops the front of score `s - scope`.
    pub fn push(&mut self, s: Cost, front: Front) {
        assert_eq!(s, self.last + 1, "Fronts must be pushed in order of score");
        match self.scope {
            Some(scope) => self.fronts[s as usize % scope] = (s, front),
            None => self.fronts.push((s, front)),
        }
        self.last = s;
    }

    /// Bytes used by all retained offsets.
    pub fn memory(&self) -> usize {
        self.fronts.iter().map(|(_, f)| f.memory()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wavefront_indexing() {
        let mut wf = Wavefront::new(-2, 3);
        assert_eq!(wf.get(-3), OFFSET_NULL);
        assert_eq!(wf.get(4), OFFSET_NULL);
        wf[-2] = 5;
        wf[1] = 7;
        assert_eq!(wf.get(-2), 5);
        assert_eq!(wf.iter().collect::<Vec<_>>(), vec![(-2, 5), (1, 7)]);
        let wf = wf.trimmed().unwrap();
        assert_eq!(wf.range(), -2..=1);
        assert_eq!(wf[1], 7);
        assert!(Wavefront::new(0, 4).trimmed().is_none());
    }

    #[test]
    #[should_panic]
    fn wavefront_out_of_range() {
        let wf = Wavefront::new(0, 1);
        let _ = wf[2];
    }

    #[test]
    fn trim_both_ends() {
        let mut wf = Wavefront::new(-3, 3);
        wf[-1] = 2;
        wf[2] = 4;
        let wf = wf.trimmed().unwrap();
        assert_eq!(wf.range(), -1..=2);
        assert_eq!(wf.get(-1), 2);
        assert_eq!(wf.get(0), OFFSET_NULL);
        assert_eq!(wf.get(2), 4);
    }

    #[test]
    fn bounded_set_forgets_old_scores() {
        let mut set = WavefrontSet::bounded(3);
        for s in 0..5 {
            set.push(
                s,
                Front {
                    m: Some(Wavefront::single(0, s)),
                    ..Default::default()
                },
            );
        }
        assert_eq!(set.last_score(), 4);
        assert_eq!(set.min_retained_score(), 2);
        assert!(set.get(1).is_none());
        assert!(set.get(5).is_none());
        assert_eq!(set.layer(3, Component::M).unwrap().get(0), 3);
        assert!(set.layer(3, Component::I1).is_none());
    }

    #[test]
    fn full_set_keeps_all_scores() {
        let mut set = WavefrontSet::full();
        for s in 0..5 {
            set.push(s, Front::default());
        }
        assert!(set.get(0).is_some());
        assert!(set.get(0).unwrap().is_empty());
        assert_eq!(set.min_retained_score(), 0);
    }
}
