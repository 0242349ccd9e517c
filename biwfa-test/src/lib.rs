//! Test inputs and a quadratic reference aligner shared by the aligner tests.
use itertools::Itertools;
use rand::{seq::IteratorRandom, thread_rng, Rng};

use biwfa_types::{AlignmentForm, Cigar, DistanceMetric, Penalties};
use pa_generate::ErrorModel;
use pa_types::*;

pub fn test_sequences() -> Vec<(Seq<'static>, Seq<'static>)> {
    vec![
        (b"", b""),
        (b"", b"ACGT"),
        (b"ACGT", b""),
        (b"ACGT", b"ACT"),
        (b"TTGGGTCAATCAGCCAGTTTTTA", b"TTTGAGTGGGTCATCACCGATTTTAT"),
        (b"ACTGACCAGT", b"CCGACAGGA"),
        (b"AGTTTTAT", b"ACCGATTTTTA"),
        (b"CTCTCTTCTCTCTCTA", b"CCTCTCTCTCTCCTCTC"),
        (b"AGTGGGTTGCCTTCATTCCG", b"AGTGGTGTCTTCAGGCCTTCATTCCG"),
        (b"GCACGTCGCCCCCCGCCCGCG", b"GCCCGCCCGCCCGCCCCCGCCCCC"),
        (b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", b"AAAAAAAAAA"),
        (b"CGCGTGTATCCGTCCACATCGAGCCGCCCTTGTTGCTTTTCGAGCGCTCATTTCCCGCAAGAGTGGCGTGCGGTCACTTTCGCGCAGCAATTAGAGTACTAACGGGTAGACGTGGCTTTCCTCCTCGTCCTGTCAACGCGCATAGGATGTCCTGCAGCAGGCCGCCGCGATTGCCTAAATCAAGGGGTTCCAATGGAGTTTCCATCTGATATCCGCGCTCCGGTTCTGAGTCTAAAGTGGAAATACTCCGAATGGGCCGGTATGAGGTTGGGTCAATCAGCCAGTTTTTA",
         b"CGCTGGGGATGCCTCCACCTTTCGAGTGCCTGTTGGTTCCGACGCTATCATAGTCCCCATGCAAGGAGATGGCTGCGCGTCCTATCGCGCGGCAAATAGAGTCTACGGGGGCGGCTGTCCTCCTCGTCCTGGTCAACGGCCATAGGATTTCCGCGATGGTCGCCCGGATGTGCCTAAACCAAGGCTCCGATGGAGCTGCCTCTGATATCCGCGCTGCCGGTTTCCTGACGTCTGAAAACGTTGGAAAATACCTCCGAATGGGCCCCGTTTGAGTGGGTCATCACCGATTTTAT"),
    ]
}

const FIXED: bool = false;

pub fn gen_seqs() -> impl Iterator<Item = ((Sequence, Sequence), (usize, f32, ErrorModel, u64))> {
    let rng = &mut thread_rng();
    let mut ns = vec![
        0usize, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 30, 40, 50,
        60, 70, 80, 90, 100, 110, 120, 130, 140, 150, 200, 250, 300, 400, 500,
    ];
    let mut es = vec![
        0.0f32, 0.01, 0.02, 0.03, 0.05, 0.10, 0.20, 0.30, 0.40, 0.50, 0.70, 1.0,
    ];

    // Pick a random subset of the above. CI runs often enough to get good coverage.
    if !FIXED {
        let nl = ns.len();
        ns = ns.into_iter().choose_multiple(rng, nl / 4);
        let el = es.len();
        es = es.into_iter().choose_multiple(rng, el / 4);
    }

    let models = [
        ErrorModel::Uniform,
        ErrorModel::NoisyInsert,
        ErrorModel::NoisyDelete,
        ErrorModel::SymmetricRepeat,
    ];
    // Run each test on a new random seed for increased coverage over time.
    let seeds = if FIXED {
        [31415]
    } else {
        [rng.gen_range(0..u64::MAX)]
    };
    ns.into_iter()
        .cartesian_product(es)
        .cartesian_product(models)
        .cartesian_product(seeds)
        .map(|(((n, e), error_model), seed)| {
            let (a, b) = pa_generate::generate_model(n, e, error_model, seed);
            ((a, b), (n, e, error_model, seed))
        })
}

const INF: Cost = Cost::MAX / 4;

/// The optimal alignment cost by quadratic dynamic programming, with up to two
/// affine gap pieces.
pub fn align_dp(penalties: &Penalties, form: &AlignmentForm, a: Seq, b: Seq) -> Cost {
    let form = form.clamped(a.len(), b.len());
    let (n, m) = (a.len(), b.len());
    let (mismatch, linear, pieces): (Option<Cost>, Option<Cost>, Vec<(Cost, Cost)>) =
        match penalties.metric {
            DistanceMetric::Indel => (None, Some(1), vec![]),
            DistanceMetric::Edit => (Some(1), Some(1), vec![]),
            DistanceMetric::GapLinear { mismatch, indel } => (Some(mismatch), Some(indel), vec![]),
            DistanceMetric::GapAffine {
                mismatch,
                gap_opening,
                gap_extension,
            } => (Some(mismatch), None, vec![(gap_opening, gap_extension)]),
            DistanceMetric::GapAffine2p {
                mismatch,
                gap_opening1,
                gap_extension1,
                gap_opening2,
                gap_extension2,
            } => (
                Some(mismatch),
                None,
                vec![(gap_opening1, gap_extension1), (gap_opening2, gap_extension2)],
            ),
        };

    // `h[i][j]`: best cost to align `a[..i]` and `b[..j]`.
    // `ins[p][i][j]` / `del[p][i][j]`: the same, ending in a gap of piece `p`.
    let mut h = vec![vec![INF; m + 1]; n + 1];
    let mut ins = vec![vec![vec![INF; m + 1]; n + 1]; pieces.len()];
    let mut del = vec![vec![vec![INF; m + 1]; n + 1]; pieces.len()];
    for i in 0..=n {
        for j in 0..=m {
            if (i == 0 && j <= form.text_begin_free) || (j == 0 && i <= form.pattern_begin_free) {
                h[i][j] = 0;
                continue;
            }
            let mut best = INF;
            if i > 0 && j > 0 {
                if a[i - 1] == b[j - 1] {
                    best = best.min(h[i - 1][j - 1]);
                } else if let Some(x) = mismatch {
                    best = best.min(h[i - 1][j - 1] + x);
                }
            }
            if let Some(indel) = linear {
                if j > 0 {
                    best = best.min(h[i][j - 1] + indel);
                }
                if i > 0 {
                    best = best.min(h[i - 1][j] + indel);
                }
            }
            for (p, &(o, e)) in pieces.iter().enumerate() {
                if j > 0 {
                    ins[p][i][j] = (h[i][j - 1] + o + e).min(ins[p][i][j - 1] + e);
                    best = best.min(ins[p][i][j]);
                }
                if i > 0 {
                    del[p][i][j] = (h[i - 1][j] + o + e).min(del[p][i - 1][j] + e);
                    best = best.min(del[p][i][j]);
                }
            }
            h[i][j] = best;
        }
    }

    let mut cost = h[n][m];
    for j in m.saturating_sub(form.text_end_free)..=m {
        cost = cost.min(h[n][j]);
    }
    for i in n.saturating_sub(form.pattern_end_free)..=n {
        cost = cost.min(h[i][m]);
    }
    cost
}

/// Aligns one pair and checks the result against the reference:
/// - the cost must equal `align_dp`,
/// - the cigar must be a valid alignment of `a` and `b`,
/// - the cigar must have exactly the reported cost.
pub fn test_aligner_on_input(
    a: Seq,
    b: Seq,
    penalties: &Penalties,
    form: &AlignmentForm,
    align: &mut impl FnMut(Seq, Seq) -> Cigar,
    params: &str,
) {
    // Set to true for local debugging.
    const D: bool = false;

    // useful in case of panics inside the alignment code.
    eprintln!("{params}");
    if D {
        eprintln!("a {}\nb {}", seq_to_string(a), seq_to_string(b));
    }
    let cost = align_dp(penalties, form, a, b);
    let cigar = align(a, b);
    assert_eq!(
        cost,
        -cigar.score(),
        "\n{params}\nlet a = \"{}\".as_bytes();\nlet b = \"{}\".as_bytes();\ncigar: {cigar}",
        seq_to_string(a),
        seq_to_string(b),
    );
    assert_eq!(
        cigar.verify(penalties, form, a, b),
        cost,
        "\n{params}\nCigar {cigar} does not have the reported cost."
    );
}

/// Test the given aligner on the hardcoded sequences and a random set of
/// generated ones:
/// - length 0 to 500
/// - error rate 0 to 1.0
/// - error models: uniform, noisy insert, noisy delete, symmetric repeat (using `pa_generate`)
pub fn test_aligner(penalties: &Penalties, form: &AlignmentForm, align: impl FnMut(Seq, Seq) -> Cigar) {
    test_aligner_up_to(penalties, form, align, usize::MAX);
}

/// As test_aligner, but only test generated sequences with n <= max_n.
pub fn test_aligner_up_to(
    penalties: &Penalties,
    form: &AlignmentForm,
    mut align: impl FnMut(Seq, Seq) -> Cigar,
    max_n: usize,
) {
    for (a, b) in test_sequences() {
        test_aligner_on_input(
            a,
            b,
            penalties,
            form,
            &mut align,
            &format!(
                "hardcoded test_sequences: a {:?} b {:?} penalties {penalties:?} form {form:?}",
                seq_to_string(a),
                seq_to_string(b)
            ),
        );
    }
    for ((a, b), (n, e, error_model, seed)) in gen_seqs() {
        if n > max_n {
            continue;
        }
        test_aligner_on_input(
            &a,
            &b,
            penalties,
            form,
            &mut align,
            &format!(
                "seed {seed:>10} n {n:>5} e {e:>.2} error_model {error_model:?} penalties {penalties:?} form {form:?}"
            ),
        );
    }
}
