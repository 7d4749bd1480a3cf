//! Command execution implementations

use super::convert::SettingsOverrides;
use super::definitions::ColorCommands;
use super::Commands;
use super::{color, convert, inspect, strip_bom};
use crate::corpus::ScanMode;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, quiet: bool) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                config,
                ir_game,
                eu5_game,
                mod_root,
                hue_factor,
                language,
                loose,
                keep_explicit_colors,
                dry_run,
                json,
            } => convert::execute(
                config.as_deref(),
                &SettingsOverrides {
                    ir_game: ir_game.clone(),
                    eu5_game: eu5_game.clone(),
                    mod_root: mod_root.clone(),
                    hue_factor: *hue_factor,
                    language: language.clone(),
                    loose: *loose,
                    keep_explicit_colors: *keep_explicit_colors,
                },
                *dry_run,
                *json,
                quiet,
            ),
            Commands::Inspect {
                path,
                json,
                permissive,
                document,
            } => {
                let mode = if *document { ScanMode::Document } else { ScanMode::Blocks };
                inspect::execute(path, mode, *permissive, *json, quiet)
            }
            Commands::Color { command } => command.execute(),
            Commands::StripBom { dir, dry_run } => strip_bom::execute(dir, *dry_run, quiet),
        }
    }
}

impl ColorCommands {
    /// Execute the selected color command.
    ///
    /// # Errors
    /// Returns an error if the color expression cannot be read.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ColorCommands::Parse { expr } => color::parse(expr),
            ColorCommands::Derive { name } => {
                color::derive(name);
                Ok(())
            }
            ColorCommands::Rotate {
                expr,
                index,
                factor,
                count,
            } => color::rotate(expr, *index, *factor, *count),
        }
    }
}
