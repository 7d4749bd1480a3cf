//! Subcommand enum definitions for CLI

use clap::Subcommand;

/// Color commands
#[derive(Subcommand)]
pub enum ColorCommands {
    /// Parse a color expression (`rgb { 1 2 3 }`, `hsv { .5 .4 .8 }`, `{ .4 .6 .8 }` or `color = ...`)
    Parse {
        /// Color expression
        expr: String,
    },

    /// Derive the stable color for a name
    Derive {
        /// Entity name
        name: String,
    },

    /// Hue-rotate a base color
    Rotate {
        /// Base color expression
        expr: String,

        /// Sibling index to rotate to
        #[arg(short, long, default_value = "1")]
        index: u32,

        /// Hue step per index
        #[arg(short, long, default_value = "0.04")]
        factor: f64,

        /// Print this many consecutive siblings starting at index 0
        #[arg(short, long, conflicts_with = "index")]
        count: Option<u32>,
    },
}
