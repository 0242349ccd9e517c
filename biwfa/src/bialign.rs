//! Bidirectional alignment in memory linear in the score.
//!
//! A forward and a backward search run towards each other, each keeping only
//! the last `max_score_scope` fronts. Once their wavefronts overlap, the
//! cheapest meeting point (the junction) splits the problem in two halves that
//! are aligned recursively. Small halves are aligned in a single pass.
use crate::{
    abort::AbortCheck,
    align::align_single_pass,
    extend::Direction,
    params::Heuristic,
    search::Search,
    AlignError, Result,
};
use biwfa_types::{diagonal_inverse, AlignmentForm, Cigar, Component, Diag, Offset, Penalties, OFFSET_NULL};
use log::{debug, trace};
use pa_types::{Cost, Seq};

/// The cheapest point found where the forward and backward searches meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Junction {
    /// Cost of the alignment through this point.
    ///
    /// When the sub-problem ends in a gap component, the backward search starts
    /// inside that gap and never pays its opening, so the costs of the two
    /// halves do not add up to this score. They do when both ends are in `M`.
    pub score: Cost,
    pub score_forward: Cost,
    pub score_reverse: Cost,
    pub k_forward: Diag,
    pub k_reverse: Diag,
    pub offset_forward: Offset,
    pub offset_reverse: Offset,
    /// The component both halves meet in.
    pub component: Component,
}

impl Junction {
    fn none() -> Self {
        Self {
            score: Cost::MAX,
            score_forward: 0,
            score_reverse: 0,
            k_forward: 0,
            k_reverse: 0,
            offset_forward: OFFSET_NULL,
            offset_reverse: OFFSET_NULL,
            component: Component::M,
        }
    }

    /// The split point `(v, h)` in the coordinates of the forward problem.
    pub fn split(&self) -> (usize, usize) {
        (
            (self.offset_forward - self.k_forward) as usize,
            self.offset_forward as usize,
        )
    }
}

/// A part of the problem still to be aligned.
#[derive(Clone, Copy, Debug)]
pub struct SubProblem<'a> {
    pub a: Seq<'a>,
    pub b: Seq<'a>,
    pub form: AlignmentForm,
    pub component_begin: Component,
    pub component_end: Component,
    /// Upper bound on the cost of this part.
    pub score_remaining: Cost,
    /// Diagonal of the start of this part in the full problem.
    pub k_shift: Diag,
}

impl<'a> SubProblem<'a> {
    pub fn root(a: Seq<'a>, b: Seq<'a>, form: AlignmentForm) -> Self {
        Self {
            a,
            b,
            form,
            component_begin: Component::M,
            component_end: Component::M,
            score_remaining: Cost::MAX,
            k_shift: 0,
        }
    }
}

pub struct BiAlign<'p> {
    pub penalties: &'p Penalties,
    pub heuristic: Heuristic,
    pub base_case_threshold: Cost,
    pub abort: &'p AbortCheck,
}

impl<'p> BiAlign<'p> {
    /// The band of the full problem, shifted to a sub-problem.
    fn band(&self, k_shift: Diag) -> Option<(Diag, Diag)> {
        match self.heuristic {
            Heuristic::None => None,
            Heuristic::BandedStatic { min_k, max_k } => Some((min_k - k_shift, max_k - k_shift)),
        }
    }

    /// Aligns `p`, appending its operations to `cigar`. Returns the cost.
    pub fn align(&self, p: SubProblem, level: usize, cigar: &mut Cigar) -> Result<Cost> {
        self.abort.check_time()?;
        let form = p.form.clamped(p.a.len(), p.b.len());

        if p.a.is_empty() || p.b.is_empty() {
            return Ok(self.align_gap(&p, &form, cigar));
        }

        if p.score_remaining <= self.base_case_threshold {
            return self.align_base_case(&p, &form, level, cigar);
        }

        let junction = self.find_junction(&p, &form)?;
        let (v, h) = junction.split();
        if (v, h) == (0, 0) || (v, h) == (p.a.len(), p.b.len()) {
            // One half would be the whole problem again.
            return self.align_base_case(&p, &form, level, cigar);
        }
        debug!(
            "{:indent$}[{level}] Junction at (v, h) = ({v}, {h}) in {:?}, score {} = {} + {}",
            "",
            junction.component,
            junction.score,
            junction.score_forward,
            junction.score_reverse,
            indent = 2 * level
        );

        let cost_a = self.align(
            SubProblem {
                a: &p.a[..v],
                b: &p.b[..h],
                form: form.leading(),
                component_begin: p.component_begin,
                component_end: junction.component,
                score_remaining: junction.score_forward,
                k_shift: p.k_shift,
            },
            level + 1,
            cigar,
        )?;
        let cost_b = self.align(
            SubProblem {
                a: &p.a[v..],
                b: &p.b[h..],
                form: form.trailing(),
                component_begin: junction.component,
                component_end: p.component_end,
                score_remaining: junction.score_reverse,
                k_shift: p.k_shift + (h as Diag - v as Diag),
            },
            level + 1,
            cigar,
        )?;
        if p.component_begin == Component::M && p.component_end == Component::M {
            debug_assert_eq!(cost_a + cost_b, junction.score);
        }
        Ok(cost_a + cost_b)
    }

    fn align_base_case(
        &self,
        p: &SubProblem,
        form: &AlignmentForm,
        level: usize,
        cigar: &mut Cigar,
    ) -> Result<Cost> {
        let mut sub = align_single_pass(
            p.a,
            p.b,
            self.penalties,
            form,
            p.component_begin,
            p.component_end,
            self.band(p.k_shift),
            self.abort,
        )?;
        let cost = -sub.score();
        trace!(
            "{:indent$}[{level}] Base case {}x{} cost {cost}",
            "",
            p.a.len(),
            p.b.len(),
            indent = 2 * level
        );
        cigar.append(&mut sub);
        Ok(cost)
    }

    /// The cost of the full problem without its alignment. This is the score of
    /// the root junction, so nothing is recursed into and no cigar is built.
    pub fn score(&self, a: Seq, b: Seq, form: AlignmentForm) -> Result<Cost> {
        self.abort.check_time()?;
        let p = SubProblem::root(a, b, form);
        let form = p.form.clamped(a.len(), b.len());
        if a.is_empty() || b.is_empty() {
            return Ok(self.gap_cost(&p, &form));
        }
        let junction = self.find_junction(&p, &form)?;
        debug!("Score-only junction for {}x{}: {}", a.len(), b.len(), junction.score);
        Ok(junction.score)
    }

    /// One of the sequences is empty: the alignment is a single gap.
    fn align_gap(&self, p: &SubProblem, form: &AlignmentForm, cigar: &mut Cigar) -> Cost {
        if p.b.is_empty() {
            cigar.append_deletion(p.a.len());
        } else {
            cigar.append_insertion(p.b.len());
        }
        self.gap_cost(p, form)
    }

    fn gap_cost(&self, p: &SubProblem, form: &AlignmentForm) -> Cost {
        let deletion = p.b.is_empty();
        let (len, free) = if deletion {
            (p.a.len(), form.pattern_begin_free + form.pattern_end_free)
        } else {
            (p.b.len(), form.text_begin_free + form.text_end_free)
        };
        let same_kind = |c: Component| {
            if deletion {
                c.is_deletion()
            } else {
                c.is_insertion()
            }
        };
        let len = len.saturating_sub(free);
        if len == 0 {
            0
        } else if same_kind(p.component_begin) {
            // The gap was opened before this part.
            self.penalties.gap_extension_cost(p.component_begin, len)
        } else if same_kind(p.component_end) {
            // The gap continues after this part, in the same piece.
            self.penalties.gap_opening(p.component_end)
                + self.penalties.gap_extension_cost(p.component_end, len)
        } else {
            self.penalties.gap_cost(len)
        }
    }

    /// Runs the forward and backward searches until the cheapest junction is known.
    pub fn find_junction(&self, p: &SubProblem, form: &AlignmentForm) -> Result<Junction> {
        let (plen, tlen) = (p.a.len(), p.b.len());
        let band = self.band(p.k_shift);
        let k_end = tlen as Diag - plen as Diag;
        let mut forward = Search::new(
            p.a,
            p.b,
            Direction::Forward,
            self.penalties,
            &form.leading(),
            p.component_begin,
            band,
            true,
        );
        let mut reverse = Search::new(
            p.a,
            p.b,
            Direction::Backward,
            self.penalties,
            &form.reversed().leading(),
            p.component_end,
            band.map(|(lo, hi)| (k_end - hi, k_end - lo)),
            true,
        );

        // Advance both searches, alternating, until their furthest points could touch.
        let max_antidiagonal = (plen + tlen) as Offset - 1;
        let mut last_forward = false;
        loop {
            if forward.max_antidiagonal() + reverse.max_antidiagonal() >= max_antidiagonal {
                break;
            }
            self.advance(&mut forward, &reverse, false)?;
            last_forward = true;
            if forward.max_antidiagonal() + reverse.max_antidiagonal() >= max_antidiagonal {
                break;
            }
            self.advance(&mut reverse, &forward, false)?;
            last_forward = false;
        }

        // Keep alternating and checking for overlaps until no cheaper junction is possible.
        let slack = self.penalties.termination_gap_opening() + self.penalties.max_edge_cost();
        let mut junction = Junction::none();
        loop {
            if last_forward {
                if forward.score() + reverse.fronts.min_retained_score() - slack >= junction.score {
                    break;
                }
                self.check_overlap(&forward, &reverse, true, &mut junction);
                self.advance(&mut reverse, &forward, junction.score < Cost::MAX)?;
            }
            if forward.fronts.min_retained_score() + reverse.score() - slack >= junction.score {
                break;
            }
            self.check_overlap(&forward, &reverse, false, &mut junction);
            self.advance(&mut forward, &reverse, junction.score < Cost::MAX)?;
            last_forward = true;
        }
        Ok(junction)
    }

    /// Steps `search`. Fails when neither search can reach anything new and
    /// no junction has been found.
    fn advance(&self, search: &mut Search, other: &Search, found: bool) -> Result<()> {
        if !found && search.is_exhausted() && other.is_exhausted() {
            return Err(AlignError::Configuration(format!(
                "no alignment of lengths {} and {} fits in the band",
                search.a.len(),
                search.b.len()
            )));
        }
        search.checked_step(self.abort, other.memory())
    }

    /// Compares the `M` diagonals of the last front of one search against all
    /// retained fronts of the other, and records any cheaper junction.
    fn check_overlap(
        &self,
        forward: &Search,
        reverse: &Search,
        forward_is_last: bool,
        junction: &mut Junction,
    ) {
        let (plen, tlen) = (forward.a.len(), forward.b.len());
        let (last, other) = if forward_is_last {
            (forward, reverse)
        } else {
            (reverse, forward)
        };
        let s_last = last.score();
        let Some(front_last) = last.fronts.get(s_last) else {
            return;
        };
        let Some(m_last) = front_last.m.as_ref() else {
            return;
        };
        let (lo, hi) = (m_last.lo(), m_last.hi());
        let min_other = other.fronts.min_retained_score();
        for k_last in lo..=hi {
            let k_other = diagonal_inverse(k_last, plen, tlen);
            for s_other in (min_other..=other.score()).rev() {
                let Some(front_other) = other.fronts.get(s_other) else {
                    continue;
                };
                for &c in self.penalties.components() {
                    let h_last = front_last.get(c, k_last);
                    let h_other = front_other.get(c, k_other);
                    if h_last == OFFSET_NULL
                        || h_other == OFFSET_NULL
                        || h_last + h_other < tlen as Offset
                    {
                        continue;
                    }
                    let score = s_last + s_other - self.penalties.gap_opening(c);
                    if score >= junction.score {
                        continue;
                    }
                    *junction = if forward_is_last {
                        Junction {
                            score,
                            score_forward: s_last,
                            score_reverse: s_other,
                            k_forward: k_last,
                            k_reverse: k_other,
                            offset_forward: h_last,
                            offset_reverse: h_other,
                            component: c,
                        }
                    } else {
                        Junction {
                            score,
                            score_forward: s_other,
                            score_reverse: s_last,
                            k_forward: k_other,
                            k_reverse: k_last,
                            offset_forward: h_other,
                            offset_reverse: h_last,
                            component: c,
                        }
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SystemParams;

    fn junction(penalties: &Penalties, a: &[u8], b: &[u8]) -> Junction {
        let abort = AbortCheck::new(SystemParams::default());
        let bi = BiAlign {
            penalties,
            heuristic: Heuristic::None,
            base_case_threshold: 0,
            abort: &abort,
        };
        let p = SubProblem::root(a, b, AlignmentForm::end_to_end());
        bi.find_junction(&p, &p.form).unwrap()
    }

    #[test]
    fn junction_on_optimal_path() {
        let penalties = Penalties::affine(4, 6, 2);
        let j = junction(&penalties, b"ACGT", b"ACT");
        assert_eq!(j.score, 8);
        assert_eq!(j.score_forward + j.score_reverse - penalties.gap_opening(j.component), 8);
        let (v, h) = j.split();
        assert!(v <= 4 && h <= 3);
        assert_eq!(j.k_reverse, diagonal_inverse(j.k_forward, 4, 3));
    }

    #[test]
    fn junction_identical_sequences() {
        let j = junction(&Penalties::edit(), b"ACGTACGT", b"ACGTACGT");
        assert_eq!(j.score, 0);
        assert_eq!(j.component, Component::M);
        assert_eq!(j.k_forward, 0);
    }

    #[test]
    fn gap_continues_open_component() {
        let penalties = Penalties::affine(4, 6, 2);
        let abort = AbortCheck::new(SystemParams::default());
        let bi = BiAlign {
            penalties: &penalties,
            heuristic: Heuristic::None,
            base_case_threshold: 0,
            abort: &abort,
        };
        let mut cigar = Cigar::new();
        let p = SubProblem {
            component_begin: Component::D1,
            ..SubProblem::root(b"AAA", b"", AlignmentForm::end_to_end())
        };
        assert_eq!(bi.align(p, 0, &mut cigar).unwrap(), 6);
        let p = SubProblem::root(b"", b"CC", AlignmentForm::end_to_end());
        assert_eq!(bi.align(p, 0, &mut cigar).unwrap(), 10);
        assert_eq!(cigar.to_string(), "3D2I");
    }

    #[test]
    fn junction_inside_long_deletion() {
        let penalties = Penalties::affine(4, 6, 2);
        let a = [b"ACGTACGTAC".as_slice(), &[b'T'; 60], b"GATTACAGAT"].concat();
        let b = [b"ACGTACGTAC".as_slice(), b"GATTACAGAT"].concat();
        let j = junction(&penalties, &a, &b);
        assert_eq!(j.score, 6 + 2 * 60);
        // The only optimal alignment is 10M60D10M.
        let (v, h) = j.split();
        assert_eq!(h, 10);
        assert!((10..=70).contains(&v));
    }

    #[test]
    fn sub_problem_ending_in_gap() {
        let penalties = Penalties::affine(4, 6, 2);
        let abort = AbortCheck::new(SystemParams::default());
        let bi = BiAlign {
            penalties: &penalties,
            heuristic: Heuristic::None,
            base_case_threshold: 0,
            abort: &abort,
        };
        // Split all the way down while the last insertion run stays open.
        let p = SubProblem {
            component_end: Component::I1,
            ..SubProblem::root(b"ACGTACGTAC", b"ACGTACGTACGGGG", AlignmentForm::end_to_end())
        };
        let mut cigar = Cigar::new();
        assert_eq!(bi.align(p, 0, &mut cigar).unwrap(), 6 + 2 * 4);
        assert_eq!(cigar.to_string(), "10M4I");
    }

    #[test]
    fn score_matches_alignment() {
        let penalties = Penalties::affine2p(4, 6, 2, 24, 1);
        let abort = AbortCheck::new(SystemParams::default());
        let bi = BiAlign {
            penalties: &penalties,
            heuristic: Heuristic::None,
            base_case_threshold: 0,
            abort: &abort,
        };
        let form = AlignmentForm::end_to_end();
        for (a, b) in [
            (b"ACGT".as_slice(), b"ACT".as_slice()),
            (b"", b"ACGT"),
            (b"AGTTTTAT", b"ACCGATTTTTA"),
        ] {
            let mut cigar = Cigar::new();
            let cost = bi.align(SubProblem::root(a, b, form), 0, &mut cigar).unwrap();
            assert_eq!(bi.score(a, b, form).unwrap(), cost);
        }
    }

    #[test]
    fn gap_keeps_piece_of_junction() {
        let penalties = Penalties::affine2p(4, 6, 2, 24, 1);
        let abort = AbortCheck::new(SystemParams::default());
        let bi = BiAlign {
            penalties: &penalties,
            heuristic: Heuristic::None,
            base_case_threshold: 0,
            abort: &abort,
        };
        let mut cigar = Cigar::new();
        // The cheapest gap of length 4 uses the first piece, but the part ends in D2.
        let p = SubProblem {
            component_end: Component::D2,
            ..SubProblem::root(b"AAAA", b"", AlignmentForm::end_to_end())
        };
        assert_eq!(bi.align(p, 0, &mut cigar).unwrap(), 28);
        let p = SubProblem::root(b"AAAA", b"", AlignmentForm::end_to_end());
        assert_eq!(bi.align(p, 0, &mut cigar).unwrap(), 14);
    }
}
