//! CLI collaborator of the diff core: reads two files, prints the structured
//! diff in source order.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use kamili_diff::sources::split_lines;
use kamili_diff::{compute_diff, DiffOptions};

#[derive(Parser)]
#[command(
    name = "diff_tool",
    about = "Structured diff between two text files",
    version
)]
struct Cli {
    /// The original file.
    original: PathBuf,
    /// The modified file.
    modified: PathBuf,

    /// Report lines differing only in leading/trailing whitespace as equal.
    #[arg(long)]
    ignore_trim_whitespace: bool,

    /// Wall-clock budget in milliseconds (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    max_computation_time_ms: u32,

    /// Extend character diffs to subword boundaries.
    #[arg(long)]
    extend_to_subwords: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("diff_tool: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let original = read(&cli.original)?;
    let modified = read(&cli.modified)?;
    let options = DiffOptions {
        ignore_trim_whitespace: cli.ignore_trim_whitespace,
        max_computation_time_ms: cli.max_computation_time_ms,
        compute_moves: false,
        extend_to_subwords: cli.extend_to_subwords,
    };
    let diff = compute_diff(&split_lines(&original), &split_lines(&modified), &options);

    println!(
        "{} -> {}: {} change(s){}",
        cli.original.display(),
        cli.modified.display(),
        diff.changes.len(),
        if diff.hit_timeout {
            " (timed out, rerun with a higher budget)"
        } else {
            ""
        }
    );
    for change in &diff.changes {
        println!("{change}");
        for inner in &change.inner_changes {
            println!("    {inner}");
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
