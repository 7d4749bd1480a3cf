//! CLI command for removing byte order marks

use std::path::Path;

use anyhow::bail;
use indicatif::ProgressBar;

use crate::bom::strip_bom_dir;
use crate::cli::progress::{simple_spinner, DISK, WARNING};

/// Strip BOMs from every `*.txt` under `dir`
pub fn execute(dir: &Path, dry_run: bool, quiet: bool) -> anyhow::Result<()> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        simple_spinner(&format!("Checking {}...", dir.display()))
    };
    let report = strip_bom_dir(dir, dry_run)?;
    spinner.finish_and_clear();

    if !quiet {
        let verb = if dry_run { "Would strip" } else { "Stripped" };
        println!(
            "{}{verb} {} of {} file(s)",
            DISK,
            report.changed.len(),
            report.scanned
        );
        for path in &report.changed {
            println!("  {}", path.display());
        }
    }

    for (path, reason) in &report.failed {
        println!("{WARNING}{}: {reason}", path.display());
    }
    if !report.failed.is_empty() {
        bail!("{} file(s) could not be rewritten", report.failed.len());
    }

    Ok(())
}
