mod cli;
mod stats;

use biwfa::{AlignError, AlignmentForm, Cigar, Penalties};
use clap::Parser;
use cli::Cli;
use log::{error, info, LevelFilter};
use pa_types::{seq_to_string, Cost, Seq};
use stats::AlignStats;
use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::ControlFlow,
    process::ExitCode,
    time::Instant,
};

/// Checks a cigar against the sequences and the quadratic reference.
/// Returns a description of the first problem.
fn check(penalties: &Penalties, form: &AlignmentForm, a: Seq, b: Seq, cigar: &Cigar) -> Option<String> {
    if !cigar.is_valid(a, b) {
        return Some(format!("cigar {cigar} is not an alignment of the input"));
    }
    let cost = cigar.cost(penalties, form);
    if cost != -cigar.score() {
        return Some(format!("cigar {cigar} costs {cost}, reported {}", -cigar.score()));
    }
    check_cost(penalties, form, a, b, cost)
}

/// Compares a cost against the quadratic reference.
fn check_cost(penalties: &Penalties, form: &AlignmentForm, a: Seq, b: Seq, cost: Cost) -> Option<String> {
    let expected = biwfa_test::align_dp(penalties, form, a, b);
    (expected != cost).then(|| format!("cost {cost} is not optimal, expected {expected}"))
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let aligner = match args.aligner.make_aligner() {
        Ok(aligner) => aligner,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let params = aligner.params().clone();

    let mut output = match &args.output {
        Some(path) => match File::create(path) {
            Ok(f) => Some(BufWriter::new(f)),
            Err(e) => {
                error!("could not create {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let mut total = AlignStats::default();
    let mut write_error = None;
    let start = Instant::now();

    // Process the input.
    let result = args.process_input_pairs(|a: Seq, b: Seq| {
        let pair_start = Instant::now();
        let result = if args.aligner.score_only {
            aligner.cost(a, b).map(|cost| (cost, None))
        } else {
            aligner.align(a, b).map(|cigar| (-cigar.score(), Some(cigar)))
        };
        let mut stats = AlignStats::new(a, b, pair_start.elapsed().as_secs_f64());

        let line = match result {
            Ok((cost, cigar)) => {
                stats.cost = cost as i64;
                if args.check {
                    let problem = match &cigar {
                        Some(cigar) => check(&params.penalties, &params.form, a, b, cigar),
                        None => check_cost(&params.penalties, &params.form, a, b, cost),
                    };
                    if let Some(problem) = problem {
                        error!(
                            "Check failed: {problem}\na {}\nb {}",
                            seq_to_string(a),
                            seq_to_string(b)
                        );
                        stats.failed = 1;
                    }
                }
                match cigar {
                    Some(cigar) => format!("{}\t{cigar}", cigar.score()),
                    None => format!("{}\t*", -cost),
                }
            }
            Err(AlignError::ResourceExhausted(reason)) => {
                stats.aborted = 1;
                format!("*\taborted: {reason}")
            }
            Err(e) => {
                error!("{e}");
                stats.failed = 1;
                format!("*\t{e}")
            }
        };
        if args.silent == 0 {
            info!("{:>5} {:>7} {:>7} {line}", total.sample_size, a.len(), b.len());
        }
        total += stats;

        if let Some(out) = &mut output {
            if let Err(e) = writeln!(out, "{line}") {
                write_error = Some(e);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    });

    if let Err(e) = result {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    if let Some(e) = write_error.or_else(|| output.as_mut().and_then(|o| o.flush().err())) {
        error!("could not write output: {e}");
        return ExitCode::FAILURE;
    }

    if args.silent <= 1 && total.sample_size > 0 {
        info!("{} in {:.3?}\n{}", params.name, start.elapsed(), total.table());
    }
    if total.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
