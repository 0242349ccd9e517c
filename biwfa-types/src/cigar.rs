use crate::{AlignmentForm, Penalties};
use pa_types::{Cost, Seq};
use std::{fmt, slice};

/// A single alignment operation.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CigarOp {
    Match,
    Mismatch,
    /// Consumes one text character.
    Ins,
    /// Consumes one pattern character.
    Del,
}

impl CigarOp {
    pub fn to_char(&self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Mismatch => 'X',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CigarElem {
    pub op: CigarOp,
    pub cnt: usize,
}

/// A run-length encoded edit script, together with the score of the alignment
/// it describes. Scores are non-positive: the negated alignment cost.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Cigar {
    ops: Vec<CigarElem>,
    score: Cost,
}

/// SAM-style output, e.g. `2M1D1M`, with `X` for mismatches.
impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for elem in &self.ops {
            write!(f, "{}{}", elem.cnt, elem.op.to_char())?;
        }
        Ok(())
    }
}

impl Cigar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> Cost {
        self.score
    }

    pub fn set_score(&mut self, score: Cost) {
        self.score = score;
    }

    pub fn ops(&self) -> &[CigarElem] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.score = 0;
    }

    pub fn push_op(&mut self, op: CigarOp) {
        self.push_elem(op, 1);
    }

    /// Appends `cnt` operations of the given type, merging with the last run.
    pub fn push_elem(&mut self, op: CigarOp, cnt: usize) {
        if cnt == 0 {
            return;
        }
        if let Some(s) = self.ops.last_mut() {
            if s.op == op {
                s.cnt += cnt;
                return;
            }
        }
        self.ops.push(CigarElem { op, cnt });
    }

    /// Extend the cigar by the given number of matches.
    pub fn match_push(&mut self, cnt: usize) {
        self.push_elem(CigarOp::Match, cnt);
    }

    pub fn append_insertion(&mut self, len: usize) {
        self.push_elem(CigarOp::Ins, len);
    }

    pub fn append_deletion(&mut self, len: usize) {
        self.push_elem(CigarOp::Del, len);
    }

    /// Append another cigar to this one, leaving `other` empty.
    /// The score of `self` is not changed.
    pub fn append(&mut self, other: &mut Self) {
        let mut ops = std::mem::take(&mut other.ops).into_iter();
        let Some(first) = ops.next() else {
            return;
        };
        self.push_elem(first.op, first.cnt);
        self.ops.extend(ops);
    }

    /// Reverse the cigar string.
    pub fn reverse(&mut self) {
        self.ops.reverse()
    }

    /// The number of pattern characters consumed.
    pub fn pattern_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|e| e.op != CigarOp::Ins)
            .map(|e| e.cnt)
            .sum()
    }

    /// The number of text characters consumed.
    pub fn text_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|e| e.op != CigarOp::Del)
            .map(|e| e.cnt)
            .sum()
    }

    /// One character per operation, e.g. `MMDM`.
    pub fn to_ops_string(&self) -> String {
        self.ops
            .iter()
            .flat_map(|e| std::iter::repeat(e.op.to_char()).take(e.cnt))
            .collect()
    }

    /// Whether the operations consume both sequences exactly, with matches on
    /// equal characters and mismatches on different ones.
    pub fn is_valid(&self, a: Seq, b: Seq) -> bool {
        let (mut i, mut j) = (0, 0);
        for &CigarElem { op, cnt } in self {
            match op {
                CigarOp::Match | CigarOp::Mismatch => {
                    if i + cnt > a.len() || j + cnt > b.len() {
                        return false;
                    }
                    let equal = op == CigarOp::Match;
                    if (0..cnt).any(|x| (a[i + x] == b[j + x]) != equal) {
                        return false;
                    }
                    i += cnt;
                    j += cnt;
                }
                CigarOp::Ins => j += cnt,
                CigarOp::Del => i += cnt,
            }
        }
        i == a.len() && j == b.len()
    }

    /// The cost of this alignment under the given penalties and form.
    ///
    /// Every run of insertions or deletions is a single gap. A leading or
    /// trailing gap is free up to the corresponding free-end length of `form`.
    pub fn cost(&self, penalties: &Penalties, form: &AlignmentForm) -> Cost {
        let last = self.ops.len().saturating_sub(1);
        let mut cost = 0;
        for (idx, &CigarElem { op, cnt }) in self.ops.iter().enumerate() {
            let (begin_free, end_free) = match op {
                CigarOp::Match => continue,
                CigarOp::Mismatch => {
                    cost += cnt as Cost
                        * penalties
                            .mismatch()
                            .expect("Mismatches are not allowed by this metric.");
                    continue;
                }
                CigarOp::Ins => (form.text_begin_free, form.text_end_free),
                CigarOp::Del => (form.pattern_begin_free, form.pattern_end_free),
            };
            let mut free = 0;
            if idx == 0 {
                free += begin_free;
            }
            if idx == last {
                free += end_free;
            }
            cost += penalties.gap_cost(cnt.saturating_sub(free));
        }
        cost
    }

    /// Asserts that the cigar is a valid alignment of `a` and `b`, and returns its cost.
    pub fn verify(&self, penalties: &Penalties, form: &AlignmentForm, a: Seq, b: Seq) -> Cost {
        assert!(
            self.is_valid(a, b),
            "Cigar {self} does not align sequences of lengths {} and {}",
            a.len(),
            b.len()
        );
        self.cost(penalties, form)
    }
}

impl<'a> IntoIterator for &'a Cigar {
    type Item = &'a CigarElem;

    type IntoIter = slice::Iter<'a, CigarElem>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
