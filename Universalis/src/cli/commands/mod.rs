//! CLI command definitions and handlers

pub mod color;
pub mod convert;
pub mod definitions;
pub mod execute;
pub mod inspect;
pub mod strip_bom;

use clap::Subcommand;
use std::path::PathBuf;

pub use definitions::ColorCommands;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an Imperator install into EU5 mod files
    Convert {
        /// Settings file (defaults to ./universalis.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Imperator game directory (the one containing common/ and setup/)
        #[arg(long)]
        ir_game: Option<PathBuf>,

        /// EU5 game directory, for basegame localisation
        #[arg(long)]
        eu5_game: Option<PathBuf>,

        /// Output mod directory
        #[arg(short, long)]
        mod_root: Option<PathBuf>,

        /// Hue step between sibling cultures
        #[arg(long)]
        hue_factor: Option<f64>,

        /// Localisation language
        #[arg(long)]
        language: Option<String>,

        /// Fall back to comments and identifiers when localisation is missing
        #[arg(long)]
        loose: bool,

        /// Never rotate culture colors, derive missing ones from names
        #[arg(long)]
        keep_explicit_colors: bool,

        /// Scan and convert, but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan a script file and print its block tree
    Inspect {
        /// Script file to scan
        path: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,

        /// Accept `.`, `:`, `@`, `-` and `'` in block names
        #[arg(long)]
        permissive: bool,

        /// Read the whole file as one root block (flat files like countries.txt)
        #[arg(long)]
        document: bool,
    },

    /// Color utilities
    Color {
        #[command(subcommand)]
        command: ColorCommands,
    },

    /// Remove UTF-8 byte order marks from *.txt files under a directory
    StripBom {
        /// Directory to process
        dir: PathBuf,

        /// Only report which files carry a BOM
        #[arg(long)]
        dry_run: bool,
    },
}
