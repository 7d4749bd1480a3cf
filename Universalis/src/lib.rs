//! # Universalis
//!
//! Converts an Imperator: Rome install into Europa Universalis V mod files.
//!
//! ## What gets converted
//!
//! - **Cultures** - culture groups, per-culture colors, graphical culture tags
//! - **Religions** - colors, display names, optional religion groups
//! - **Countries** - colors plus culture/religion references, grouped by setup folder
//! - **Map** - named locations from `definition.csv` and the region hierarchy
//! - **Localisation** - country names and adjectives, culture and religion names
//!
//! ## Quick Start
//!
//! ```no_run
//! use universalis::prelude::*;
//!
//! let settings = Settings::load("universalis.toml")?;
//! let summary = Converter::new(settings).run(false)?;
//! println!("{} files written", summary.files_written.len());
//! # Ok::<(), universalis::Error>(())
//! ```
//!
//! Reading and writing are separated: a run scans every source file and
//! resolves every cross-reference first, then writes all outputs in one go.
//! A file that fails to scan is recorded in the [`RunSummary`](summary::RunSummary)
//! and the rest of the batch continues.
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `universalis` command-line binary

pub mod bom;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod localisation;
pub mod output;
pub mod pipeline;
pub mod summary;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::config::{ColorPolicy, MapHierarchy, Settings, SETTINGS_FILE};
    pub use crate::corpus::{find_script_files, scan_files, CorpusScan, ScanMode, SourceFile};
    pub use crate::extract::{
        extract_countries, extract_cultures, extract_map, extract_religions, Country,
        CountrySet, Culture, CultureSet, ExtractContext, MapData, Religion, ReligionSet,
    };
    pub use crate::output::OutputSet;
    pub use crate::pipeline::{Converter, RunProgress, Stage};
    pub use crate::summary::{DiagnosticKind, RunDiagnostic, RunSummary};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
