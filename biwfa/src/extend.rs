//! Greedy matching along diagonals.
use crate::wavefront::Wavefront;
use biwfa_types::{antidiagonal, Offset, OFFSET_NULL};
use pa_types::Seq;
use std::iter::zip;

/// The direction to run in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    /// From the start of both sequences.
    Forward,
    /// From the end of both sequences, reading them back to front.
    Backward,
}

/// Given two sequences and a point `(v, h)` on a diagonal, returns the number
/// of matching characters starting at that point.
///
/// For `Backward`, `v` and `h` count characters from the end of `a` and `b`.
#[inline]
pub fn extend_diagonal(direction: Direction, a: Seq, b: Seq, v: usize, h: usize) -> usize {
    if v > a.len() || h > b.len() {
        return 0;
    }
    match direction {
        Direction::Forward => zip(a[v..].iter(), b[h..].iter())
            .take_while(|(ca, cb)| ca == cb)
            .count(),
        Direction::Backward => zip(
            a[..a.len() - v].iter().rev(),
            b[..b.len() - h].iter().rev(),
        )
        .take_while(|(ca, cb)| ca == cb)
        .count(),
    }
}

/// Extends every set offset of `wf` as far as the characters match.
/// Returns the largest anti-diagonal `v + h` reached, if any offset is set.
pub fn extend_wavefront(direction: Direction, a: Seq, b: Seq, wf: &mut Wavefront) -> Option<Offset> {
    let mut max_antidiagonal = None;
    for k in wf.range() {
        let h = wf[k];
        if h == OFFSET_NULL {
            continue;
        }
        let v = h - k;
        let h = h + extend_diagonal(direction, a, b, v as usize, h as usize) as Offset;
        wf[k] = h;
        max_antidiagonal = max_antidiagonal.max(Some(antidiagonal(k, h)));
    }
    max_antidiagonal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_both_directions() {
        let a = b"ACGTTT";
        let b = b"ACGATTT";
        assert_eq!(extend_diagonal(Direction::Forward, a, b, 0, 0), 3);
        assert_eq!(extend_diagonal(Direction::Forward, a, b, 3, 4), 3);
        assert_eq!(extend_diagonal(Direction::Backward, a, b, 0, 0), 3);
        assert_eq!(extend_diagonal(Direction::Backward, a, b, 3, 4), 3);
        assert_eq!(extend_diagonal(Direction::Forward, a, b, 6, 7), 0);
        assert_eq!(extend_diagonal(Direction::Backward, a, b, 6, 7), 0);
    }

    #[test]
    fn extend_wavefront_reports_antidiagonal() {
        let a = b"AAAC";
        let b = b"AAAG";
        let mut wf = Wavefront::new(-1, 1);
        wf[0] = 0;
        wf[1] = 1;
        assert_eq!(
            extend_wavefront(Direction::Forward, a, b, &mut wf),
            Some(6)
        );
        assert_eq!(wf[0], 3);
        assert_eq!(wf[1], 3);
        assert_eq!(wf.get(-1), OFFSET_NULL);
    }
}
