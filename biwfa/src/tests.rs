use crate::{
    AbortReason, AlignError, AlignerParams, AlignmentForm, Heuristic, MemoryMode, Penalties,
    SystemParams, WavefrontAligner,
};
use biwfa_test::{test_aligner, test_aligner_on_input};
use pa_types::Cost;
use std::time::Duration;

fn test_params(params: AlignerParams) {
    let aligner = params.make_aligner().unwrap();
    test_aligner(&params.penalties, &params.form, |a, b| aligner.align(a, b).unwrap());
    // The score-only path gives the cost of the full alignment.
    for (a, b) in biwfa_test::test_sequences() {
        assert_eq!(
            aligner.cost(a, b).unwrap(),
            -aligner.align(a, b).unwrap().score(),
            "a {a:?} b {b:?}"
        );
    }
}

macro_rules! test_functions_macro {
    () => {
        #[test]
        fn indel() {
            test(Penalties::indel());
        }

        #[test]
        fn edit() {
            test(Penalties::edit());
        }

        #[test]
        fn linear() {
            // mismatch=4, indel=2
            test(Penalties::linear(4, 2));
        }

        #[test]
        fn linear_expensive_mismatch() {
            // A mismatch costs more than an insertion and a deletion.
            test(Penalties::linear(5, 2));
        }

        #[test]
        fn affine() {
            // mismatch=4, open=6, extend=2
            test(Penalties::affine(4, 6, 2));
        }

        #[test]
        fn affine_unit() {
            test(Penalties::affine(1, 1, 1));
        }

        #[test]
        fn affine_free_opening() {
            test(Penalties::affine(3, 0, 1));
        }

        #[test]
        fn affine2p() {
            // Gap cost is min(6+2*l, 24+l).
            test(Penalties::affine2p(4, 6, 2, 24, 1));
        }

        #[test]
        fn affine2p_small() {
            test(Penalties::affine2p(2, 2, 3, 6, 1));
        }
    };
}

mod high_memory {
    use super::*;

    fn test(p: Penalties) {
        test_params(AlignerParams::high_memory(p));
    }

    test_functions_macro!();
}

mod biwfa {
    use super::*;

    fn test(p: Penalties) {
        test_params(AlignerParams::biwfa(p));
    }

    test_functions_macro!();
}

/// Split all the way down, so that every base case is a single pass of score 0.
mod biwfa_no_base_case {
    use super::*;

    fn test(p: Penalties) {
        test_params(AlignerParams {
            base_case_threshold: 0,
            ..AlignerParams::biwfa(p)
        });
    }

    test_functions_macro!();
}

mod biwfa_ends_free {
    use super::*;

    fn test(p: Penalties) {
        test_params(AlignerParams {
            form: AlignmentForm::ends_free(5, 3, 4, 10),
            base_case_threshold: 10,
            ..AlignerParams::biwfa(p)
        });
    }

    test_functions_macro!();
}

mod high_memory_ends_free {
    use super::*;

    fn test(p: Penalties) {
        test_params(AlignerParams {
            form: AlignmentForm::ends_free(0, 20, 20, 0),
            ..AlignerParams::high_memory(p)
        });
    }

    test_functions_macro!();
}

#[test]
fn worked_example() {
    for params in [
        AlignerParams::biwfa(Penalties::affine(4, 6, 2)),
        AlignerParams::high_memory(Penalties::affine(4, 6, 2)),
        AlignerParams {
            base_case_threshold: 0,
            ..AlignerParams::biwfa(Penalties::affine(4, 6, 2))
        },
    ] {
        let aligner = params.make_aligner().unwrap();
        let cigar = aligner.align(b"ACGT", b"ACT").unwrap();
        assert_eq!(cigar.score(), -8);
        assert_eq!(cigar.to_ops_string(), "MMDM");
        assert_eq!(cigar.to_string(), "2M1D1M");
        assert_eq!(aligner.cost(b"ACGT", b"ACT").unwrap(), 8);
    }
}

#[test]
fn empty_sequences() {
    let p = Penalties::affine(4, 6, 2);
    for params in [AlignerParams::biwfa(p), AlignerParams::high_memory(p)] {
        let aligner = params.make_aligner().unwrap();

        let cigar = aligner.align(b"", b"").unwrap();
        assert!(cigar.is_empty());
        assert_eq!(cigar.score(), 0);

        let cigar = aligner.align(b"", b"ACGT").unwrap();
        assert_eq!(cigar.to_string(), "4I");
        assert_eq!(cigar.score(), -(6 + 4 * 2));

        let cigar = aligner.align(b"ACGT", b"").unwrap();
        assert_eq!(cigar.to_string(), "4D");
        assert_eq!(cigar.score(), -(6 + 4 * 2));
    }
}

#[test]
fn identical_sequences() {
    let a = b"ACGTACGTTTGACCA";
    for params in [
        AlignerParams::biwfa(Penalties::edit()),
        AlignerParams::high_memory(Penalties::linear(4, 2)),
    ] {
        let cigar = params.make_aligner().unwrap().align(a, a).unwrap();
        assert_eq!(cigar.score(), 0);
        assert_eq!(cigar.to_string(), "15M");
    }
}

#[test]
fn deterministic() {
    let aligner = AlignerParams {
        base_case_threshold: 8,
        ..AlignerParams::biwfa(Penalties::affine(4, 6, 2))
    }
    .make_aligner()
    .unwrap();
    let (a, b) = pa_generate::uniform_fixed(300, 0.2);
    let first = aligner.align(&a, &b).unwrap();
    for _ in 0..3 {
        assert_eq!(aligner.align(&a, &b).unwrap(), first);
    }
}

#[test]
fn concurrent_alignments() {
    let p = Penalties::affine2p(4, 6, 2, 24, 1);
    let aligner = AlignerParams {
        base_case_threshold: 20,
        ..AlignerParams::biwfa(p)
    }
    .make_aligner()
    .unwrap();
    let pairs: Vec<_> = (0..4)
        .map(|i| pa_generate::uniform_fixed(200 + 50 * i, 0.1))
        .collect();
    let expected: Vec<Cost> = pairs
        .iter()
        .map(|(a, b)| biwfa_test::align_dp(&p, &AlignmentForm::end_to_end(), a, b))
        .collect();
    std::thread::scope(|scope| {
        let handles: Vec<_> = pairs
            .iter()
            .map(|(a, b)| scope.spawn(|| aligner.cost(a, b).unwrap()))
            .collect();
        for (handle, expected) in handles.into_iter().zip(expected) {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn max_score_aborts() {
    let (a, b) = pa_generate::uniform_fixed(500, 0.3);
    for memory_mode in [MemoryMode::High, MemoryMode::Ultralow] {
        let aligner = AlignerParams {
            memory_mode,
            base_case_threshold: 0,
            system: SystemParams {
                max_alignment_score: Some(20),
                ..Default::default()
            },
            ..AlignerParams::new(Penalties::edit())
        }
        .make_aligner()
        .unwrap();
        assert_eq!(
            aligner.align(&a, &b),
            Err(AlignError::ResourceExhausted(AbortReason::MaxScore { limit: 20 }))
        );
        // Cheap alignments still succeed.
        assert_eq!(aligner.cost(b"ACGT", b"ACT").unwrap(), 1);
    }
}

#[test]
fn max_memory_aborts() {
    let (a, b) = pa_generate::uniform_fixed(2000, 0.3);
    let aligner = AlignerParams {
        system: SystemParams {
            max_memory: Some(1000),
            ..Default::default()
        },
        ..AlignerParams::biwfa(Penalties::edit())
    }
    .make_aligner()
    .unwrap();
    assert!(matches!(
        aligner.align(&a, &b),
        Err(AlignError::ResourceExhausted(AbortReason::MaxMemory { limit: 1000, .. }))
    ));
}

#[test]
fn timeout_aborts() {
    let (a, b) = pa_generate::uniform_fixed(2000, 0.5);
    let aligner = AlignerParams {
        system: SystemParams {
            max_time: Some(Duration::ZERO),
            ..Default::default()
        },
        ..AlignerParams::biwfa(Penalties::affine(4, 6, 2))
    }
    .make_aligner()
    .unwrap();
    assert!(matches!(
        aligner.align(&a, &b),
        Err(AlignError::ResourceExhausted(AbortReason::Timeout { .. }))
    ));
}

#[test]
fn invalid_configuration() {
    assert!(matches!(
        AlignerParams::biwfa(Penalties::affine(0, 6, 2)).make_aligner(),
        Err(AlignError::Configuration(_))
    ));
    let mut p = Penalties::edit();
    p.match_score = -1;
    assert!(WavefrontAligner::new(AlignerParams::biwfa(p)).is_err());

    // The band must contain the start and end diagonals.
    let aligner = AlignerParams {
        heuristic: Heuristic::BandedStatic { min_k: -2, max_k: 2 },
        ..AlignerParams::biwfa(Penalties::edit())
    }
    .make_aligner()
    .unwrap();
    assert!(matches!(
        aligner.align(b"AAAAAAAA", b"A"),
        Err(AlignError::Configuration(_))
    ));
}

#[test]
fn banded() {
    let p = Penalties::affine(4, 6, 2);
    let (a, b) = pa_generate::uniform_fixed(300, 0.05);
    let k_end = b.len() as i32 - a.len() as i32;
    // A band wide enough to contain an optimal alignment gives the optimal cost.
    let heuristic = Heuristic::BandedStatic {
        min_k: k_end.min(0) - 100,
        max_k: k_end.max(0) + 100,
    };
    let expected = biwfa_test::align_dp(&p, &AlignmentForm::end_to_end(), &a, &b);
    for params in [
        AlignerParams::biwfa(p),
        AlignerParams::high_memory(p),
        AlignerParams {
            base_case_threshold: 0,
            ..AlignerParams::biwfa(p)
        },
    ] {
        let aligner = AlignerParams { heuristic, ..params }.make_aligner().unwrap();
        let cigar = aligner.align(&a, &b).unwrap();
        assert!(cigar.is_valid(&a, &b));
        assert_eq!(-cigar.score(), expected);
    }

    // A narrow band still gives a valid alignment, that may be more expensive.
    let aligner = AlignerParams {
        heuristic: Heuristic::BandedStatic { min_k: 0, max_k: 0 },
        ..AlignerParams::biwfa(p)
    }
    .make_aligner()
    .unwrap();
    let cigar = aligner.align(b"ACGTTACG", b"AGGTCACG").unwrap();
    assert_eq!(cigar.to_string(), "1M1X2M1X3M");
    assert_eq!(cigar.score(), -8);
}

#[test]
fn all_deletions_in_gap_component() {
    // A long gap in the middle forces a junction inside a gap component.
    let p = Penalties::affine(4, 6, 2);
    let a = [b"ACGTACGTAC".as_slice(), &[b'T'; 60], b"GATTACAGAT"].concat();
    let b = [b"ACGTACGTAC".as_slice(), b"GATTACAGAT"].concat();
    let aligner = AlignerParams {
        base_case_threshold: 0,
        ..AlignerParams::biwfa(p)
    }
    .make_aligner()
    .unwrap();
    let mut align = |a: &[u8], b: &[u8]| aligner.align(a, b).unwrap();
    test_aligner_on_input(
        &a,
        &b,
        &p,
        &AlignmentForm::end_to_end(),
        &mut align,
        "long deletion",
    );
    assert_eq!(align(&a, &b).to_string(), "10M60D10M");
}
