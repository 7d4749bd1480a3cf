//! Per-category extraction from scanned Imperator files
//!
//! Each extractor takes scanned [`SourceFile`](crate::corpus::SourceFile)s and
//! returns typed records, the localisation entries it produced and its
//! diagnostics. Nothing here touches the disk.

pub mod countries;
pub mod cultures;
pub mod map;
pub mod religions;

use std::path::Path;

use clausewitz::localisation::LocalisationResolver;

use crate::config::Settings;
use crate::summary::{DiagnosticKind, RunDiagnostic};

pub use countries::{extract_countries, Country, CountrySet};
pub use cultures::{extract_cultures, ColorOrigin, Culture, CultureGroup, CultureSet};
pub use map::{extract_map, MapData};
pub use religions::{extract_religions, Religion, ReligionSet};

/// What every extractor reads from.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub settings: &'a Settings,
    pub resolver: &'a LocalisationResolver,
}

impl<'a> ExtractContext<'a> {
    pub fn new(settings: &'a Settings, resolver: &'a LocalisationResolver) -> Self {
        Self { settings, resolver }
    }

    /// Resolve display text, recording a diagnostic when nothing was found.
    pub(crate) fn label(
        &self,
        candidates: &[&str],
        comment: Option<&str>,
        identifier: &str,
        file: &Path,
        diagnostics: &mut Vec<RunDiagnostic>,
    ) -> String {
        let resolution = self.resolver.resolve(candidates, comment, identifier);
        if let Some(err) = &resolution.diagnostic {
            diagnostics.push(RunDiagnostic::new(DiagnosticKind::MissingLocalisation, err.to_string()).in_file(file));
        }
        resolution.text
    }
}

/// Sibling position as a hue rotation index.
pub(crate) fn rotation_index(position: usize) -> u32 {
    u32::try_from(position).unwrap_or(u32::MAX)
}
