//! Recovering the alignment from a search that kept all its fronts.
use crate::{
    compute::{m_source, MSource},
    search::{EndPoint, Search},
};
use biwfa_types::{Cigar, CigarOp, Component, OFFSET_NULL};

/// Walks back from `end` to the start of the search and returns the
/// operations in forward order. The score of the cigar is left at 0.
pub fn backtrace(search: &Search, end: EndPoint) -> Cigar {
    assert!(!search.fronts.is_bounded(), "Backtrace needs all fronts.");
    let fronts = &search.fronts;
    let penalties = search.penalties;
    let (plen, tlen) = (search.bounds.pattern_len, search.bounds.text_len);

    // The cigar is built back to front.
    let mut cigar = Cigar::new();
    cigar.append_deletion((plen - (end.offset - end.k)) as usize);
    cigar.append_insertion((tlen - end.offset) as usize);

    let mut s = search.score();
    let mut k = end.k;
    let mut h = end.offset;
    let mut component = end.component;
    loop {
        if component == Component::M {
            let Some((from, src)) = m_source(fronts, penalties, s, k) else {
                // The initial front: diagonal `k` starts at `(max(-k, 0), max(k, 0))`.
                assert_eq!(s, 0, "No source for M at score {s}, diagonal {k}");
                let start = k.max(0);
                cigar.match_push((h - start) as usize);
                if k > 0 {
                    cigar.append_insertion(k as usize);
                } else {
                    cigar.append_deletion((-k) as usize);
                }
                break;
            };
            assert!(from <= h);
            cigar.match_push((h - from) as usize);
            h = from;
            match src {
                MSource::Mismatch(cost) => {
                    cigar.push_op(CigarOp::Mismatch);
                    h -= 1;
                    s -= cost;
                }
                MSource::Ins(cost) => {
                    cigar.push_op(CigarOp::Ins);
                    h -= 1;
                    k -= 1;
                    s -= cost;
                }
                MSource::Del(cost) => {
                    cigar.push_op(CigarOp::Del);
                    k += 1;
                    s -= cost;
                }
                MSource::Gap(c) => component = c,
            }
            continue;
        }

        if s == 0 {
            // Started inside this gap.
            assert!(k == 0 && h == 0);
            break;
        }
        let (o, e) = component
            .piece()
            .and_then(|piece| penalties.gap_piece(piece))
            .expect("Gap component without gap penalties");
        let (dk, dh, op) = if component.is_insertion() {
            (1, 1, CigarOp::Ins)
        } else {
            (-1, 0, CigarOp::Del)
        };
        let reaches = |score, c| {
            let o = fronts
                .layer(score, c)
                .map_or(OFFSET_NULL, |wf| wf.get(k - dk));
            o != OFFSET_NULL && o + dh == h
        };
        let open = reaches(s - o - e, Component::M);
        assert!(
            open || reaches(s - e, component),
            "No source for {component:?} at score {s}, diagonal {k}"
        );
        cigar.push_op(op);
        k -= dk;
        h -= dh;
        if open {
            s -= o + e;
            component = Component::M;
        } else {
            s -= e;
        }
    }
    cigar.reverse();
    cigar
}
