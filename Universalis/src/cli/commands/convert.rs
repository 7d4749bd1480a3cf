//! CLI command for a full conversion run

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use clausewitz::localisation::LookupPolicy;
use indicatif::ProgressBar;

use crate::cli::progress::{print_done, print_stage, simple_bar, WARNING};
use crate::config::{ColorPolicy, Settings, SETTINGS_FILE};
use crate::corpus::ScanProgress;
use crate::pipeline::{Converter, RunProgress};
use crate::summary::{DiagnosticKind, RunSummary};

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub ir_game: Option<PathBuf>,
    pub eu5_game: Option<PathBuf>,
    pub mod_root: Option<PathBuf>,
    pub hue_factor: Option<f64>,
    pub language: Option<String>,
    pub loose: bool,
    pub keep_explicit_colors: bool,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.ir_game {
            settings.ir_game = Some(path.clone());
        }
        if let Some(path) = &self.eu5_game {
            settings.eu5_game = Some(path.clone());
        }
        if let Some(path) = &self.mod_root {
            settings.mod_root = Some(path.clone());
        }
        if let Some(factor) = self.hue_factor {
            settings.hue_factor = factor;
        }
        if let Some(language) = &self.language {
            settings.language.clone_from(language);
        }
        if self.loose {
            settings.localisation_policy = LookupPolicy::Loose;
        }
        if self.keep_explicit_colors {
            settings.color_policy = ColorPolicy::KeepExplicit;
        }
    }
}

/// Load the settings file (explicit, or `universalis.toml` in the working
/// directory when present) and apply command-line overrides.
pub fn load_settings(config: Option<&Path>, overrides: &SettingsOverrides) -> anyhow::Result<Settings> {
    let default_file = Path::new(SETTINGS_FILE);
    let mut settings = match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None if default_file.is_file() => Settings::load(default_file)
            .with_context(|| format!("Failed to load settings from {SETTINGS_FILE}"))?,
        None => Settings::default(),
    };
    overrides.apply(&mut settings);
    Ok(settings)
}

/// Run the conversion
pub fn execute(
    config: Option<&Path>,
    overrides: &SettingsOverrides,
    dry_run: bool,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let settings = load_settings(config, overrides)?;
    if !dry_run && settings.mod_root.is_some() && settings.mod_root == settings.ir_game {
        bail!("mod_root must not be the Imperator game directory");
    }

    let show_progress = !quiet && !json;
    let started = Instant::now();
    let pb = if show_progress {
        simple_bar(0, "")
    } else {
        ProgressBar::hidden()
    };

    let result = Converter::new(settings).run_with_progress(dry_run, |event| match event {
        RunProgress::Stage(stage) => pb.suspend(|| print_stage(*stage)),
        RunProgress::File(file) => show_file(&pb, file),
    });
    pb.finish_and_clear();
    let summary = result.context("Conversion failed")?;

    if json {
        println!("{}", summary.to_json()?);
    } else if !quiet {
        print_summary(&summary);
        print_done(started.elapsed());
    }

    Ok(())
}

/// Each scanned directory reports its own total, so the length follows it.
fn show_file(pb: &ProgressBar, file: &ScanProgress) {
    pb.set_length(file.total as u64);
    pb.set_position(file.current as u64);
    pb.set_message(file.file.clone());
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Files scanned: {}", summary.files_scanned);

    if !summary.skipped.is_empty() {
        println!("{}Skipped {} file(s):", WARNING, summary.skipped.len());
        for skipped in &summary.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    if !summary.diagnostics.is_empty() {
        println!("Diagnostics: {}", summary.diagnostics.len());
        for kind in [
            DiagnosticKind::MalformedColor,
            DiagnosticKind::DuplicateKey,
            DiagnosticKind::MissingLocalisation,
            DiagnosticKind::UnresolvedReference,
            DiagnosticKind::InvalidRow,
        ] {
            let count = summary.count(kind);
            if count > 0 {
                println!("  {kind}: {count}");
            }
        }
        for diagnostic in &summary.diagnostics {
            tracing::debug!("{diagnostic}");
        }
    }

    if summary.dry_run {
        println!("Would write {} file(s):", summary.files_written.len());
        for path in &summary.files_written {
            println!("  {}", path.display());
        }
    } else {
        println!("Files written: {}", summary.files_written.len());
    }
}
