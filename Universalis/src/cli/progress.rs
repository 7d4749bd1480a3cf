//! CLI progress display utilities
//!
//! Step indicators with emojis, plus the spinner and bar styles used while
//! scanning.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::pipeline::Stage;

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Books - for localisation tables
pub static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Gear - for processing/conversion operations
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Warning sign - for skipped files and diagnostics
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
/// Palette - for color operations
pub static PALETTE: Emoji<'_, '_> = Emoji("🎨 ", "");

/// Print a step indicator: `[1/4] 🔍 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print the step line for a pipeline stage.
pub fn print_stage(stage: Stage) {
    let emoji = match stage {
        Stage::Localisation => BOOKS,
        Stage::Scanning => LOOKING_GLASS,
        Stage::Extracting => GEAR,
        Stage::Writing => DISK,
    };
    print_step(stage.step(), Stage::COUNT, emoji, stage.description());
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style for per-file progress
///
/// Format: `common/cultures/latin.txt [████████░░░░░░░░] 50/100`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .expect("valid template")
}

/// Create a simple spinner
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn simple_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a simple progress bar
///
/// The length can be changed later with `set_length` when the total is only
/// known per batch.
#[must_use]
pub fn simple_bar(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(bar_style());
    pb.set_message(msg.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_bar() {
        let pb = simple_bar(4, "Scanning");
        assert_eq!(pb.length(), Some(4));
        assert_eq!(pb.position(), 0);
        assert_eq!(pb.message(), "Scanning");
    }
}
