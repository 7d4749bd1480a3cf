//! Run summary: what was scanned, skipped, reported and written

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::corpus::{SkippedFile, SourceFile};
use crate::error::Result;

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A color expression was present but unusable.
    MalformedColor,
    /// Two entities produced the same output key; the first was kept.
    DuplicateKey,
    /// No localisation for any candidate key.
    MissingLocalisation,
    /// A reference (religion, culture, province) points at nothing scanned.
    UnresolvedReference,
    /// A data row could not be read.
    InvalidRow,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedColor => "malformed color",
            Self::DuplicateKey => "duplicate key",
            Self::MissingLocalisation => "missing localisation",
            Self::UnresolvedReference => "unresolved reference",
            Self::InvalidRow => "invalid row",
        };
        f.write_str(name)
    }
}

/// A recoverable problem found during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDiagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub message: String,
}

impl RunDiagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn in_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// The malformed-color diagnostics the script tree recorded for `file`.
    pub fn from_tree(file: &SourceFile) -> impl Iterator<Item = Self> + '_ {
        file.tree
            .diagnostics
            .iter()
            .map(|d| Self::new(DiagnosticKind::MalformedColor, d.to_string()).in_file(&file.relative))
    }
}

impl fmt::Display for RunDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "[{}] {}: {}", self.kind, file.display(), self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Outcome of a conversion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
    pub diagnostics: Vec<RunDiagnostic>,
    /// Output paths, relative to the mod root. Planned but unwritten on a dry run.
    pub files_written: Vec<PathBuf>,
    pub dry_run: bool,
}

impl RunSummary {
    /// Number of diagnostics of `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
