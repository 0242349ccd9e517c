use bio::io::fasta;
use biwfa::cli::AlignerArgs;
use clap::{value_parser, Parser};
use itertools::Itertools;
use pa_types::Seq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    ops::ControlFlow,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: unknown file extension, must be one of seq, txt, fna, fa, fasta", .0.display())]
    Extension(PathBuf),
    #[error("{}: line {line} does not start with '{marker}'", path.display())]
    Marker {
        path: PathBuf,
        line: usize,
        marker: char,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> InputError + '_ {
    move |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Align pairs of sequences with the bidirectional wavefront algorithm.
#[derive(Parser, Serialize, Deserialize)]
#[clap(author, about, disable_version_flag(true))]
// Override some generator flags
#[clap(mut_arg("seed", |a| a.hide_short_help(true)))]
#[clap(mut_arg("cnt", |a| a.hide_short_help(true)))]
#[clap(mut_arg("size", |a| a.hide_short_help(true)))]
#[clap(mut_arg("error_model", |a| a.hide_short_help(true)))]
#[clap(group(
    clap::ArgGroup::new("input_type")
        .required(true)
        .args(&["input", "length"]),
))]
pub struct Cli {
    /// A .seq, .txt, or Fasta file with sequence pairs to align, or a directory of them.
    #[clap(short, long, value_parser = value_parser!(PathBuf), display_order = 1)]
    pub input: Option<PathBuf>,

    /// Write a `{score}\t{cigar}` line per pair.
    #[clap(short, long, value_parser = value_parser!(PathBuf), display_order = 1)]
    pub output: Option<PathBuf>,

    /// Verify each alignment against the sequences and a quadratic reference aligner.
    #[clap(long, display_order = 2)]
    pub check: bool,

    /// Print less stats. Pass twice for no stats at all.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub silent: u8,

    /// Log more. Pass once for junctions, twice for base cases.
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(flatten)]
    pub aligner: AlignerArgs,

    /// Options to generate an input pair.
    #[clap(flatten, next_help_heading = "Generated input")]
    pub generate: pa_generate::DatasetGenerator,
}

impl Cli {
    /// Call the given function for each pair in the input.
    pub fn process_input_pairs(
        &self,
        mut run_pair: impl FnMut(Seq, Seq) -> ControlFlow<()>,
    ) -> Result<(), InputError> {
        let Some(input) = &self.input else {
            // Generate random input.
            let seed = self.generate.seed.unwrap_or_else(|| {
                let seed = ChaCha8Rng::from_entropy().gen_range(0..1_000);
                eprintln!("Seed: {seed}");
                seed
            });
            let rng = &mut ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..self.generate.cnt.unwrap_or(1) {
                let (a, b) = self.generate.settings.generate(rng);
                if let ControlFlow::Break(()) = run_pair(&a, &b) {
                    break;
                }
            }
            return Ok(());
        };

        let files = if input.is_file() {
            vec![input.clone()]
        } else {
            let mut files = input
                .read_dir()
                .map_err(io_error(input))?
                .map_ok(|entry| entry.path())
                .collect::<Result<Vec<_>, _>>()
                .map_err(io_error(input))?;
            files.sort();
            files
        };

        for f in files {
            let ext = f.extension().and_then(|e| e.to_str()).unwrap_or_default();
            let flow = match ext {
                "seq" | "txt" => {
                    let reader = BufReader::new(File::open(&f).map_err(io_error(&f))?);
                    let lines = reader
                        .lines()
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(io_error(&f))?;
                    let mut flow = ControlFlow::Continue(());
                    for (idx, (a, b)) in lines.iter().tuples().enumerate() {
                        let (mut a, mut b) = (a.as_bytes(), b.as_bytes());
                        if ext == "seq" {
                            a = strip_marker(&f, 2 * idx + 1, a, '>')?;
                            b = strip_marker(&f, 2 * idx + 2, b, '<')?;
                        }
                        flow = run_pair(a, b);
                        if flow.is_break() {
                            break;
                        }
                    }
                    flow
                }
                "fna" | "fa" | "fasta" => {
                    let reader = fasta::Reader::new(BufReader::new(File::open(&f).map_err(io_error(&f))?));
                    let mut flow = ControlFlow::Continue(());
                    for (a, b) in reader.records().tuples() {
                        let (a, b) = (a.map_err(io_error(&f))?, b.map_err(io_error(&f))?);
                        flow = run_pair(a.seq(), b.seq());
                        if flow.is_break() {
                            break;
                        }
                    }
                    flow
                }
                _ => return Err(InputError::Extension(f)),
            };
            if flow.is_break() {
                break;
            }
        }
        Ok(())
    }
}

fn strip_marker<'l>(path: &Path, line: usize, seq: &'l [u8], marker: char) -> Result<&'l [u8], InputError> {
    match seq.split_first() {
        Some((&c, rest)) if c == marker as u8 => Ok(rest),
        _ => Err(InputError::Marker {
            path: path.to_path_buf(),
            line,
            marker,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_file_pairs() {
        let dir = std::env::temp_dir().join(format!("biwfa-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pairs.seq");
        std::fs::write(&path, ">ACGT\n<ACT\n>AA\n<A\n").unwrap();
        let cli = Cli::parse_from(["biwfa", "-i", path.to_str().unwrap()]);
        let mut pairs = vec![];
        cli.process_input_pairs(|a, b| {
            pairs.push((a.to_vec(), b.to_vec()));
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                (b"ACGT".to_vec(), b"ACT".to_vec()),
                (b"AA".to_vec(), b"A".to_vec())
            ]
        );

        std::fs::write(&path, "ACGT\n<ACT\n").unwrap();
        assert!(matches!(
            cli.process_input_pairs(|_, _| ControlFlow::Continue(())),
            Err(InputError::Marker { line: 1, .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
