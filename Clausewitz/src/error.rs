//! Error types for `Clausewitz`
//!
//! Each stage of the pipeline has its own error family so callers can decide
//! what is fatal. Scan errors abort a single file, everything else is
//! recoverable and usually ends up as a diagnostic.

use thiserror::Error;

// ==================== Color Errors ====================

/// Failure to read a color expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No color expression (or other expected token) is present.
    #[error("no color expression found")]
    NotFound,

    /// A color expression is present but one of its tokens is unusable.
    #[error("malformed color token '{token}'")]
    Malformed {
        /// The offending token, verbatim.
        token: String,
    },
}

impl ParseError {
    pub(crate) fn malformed(token: impl Into<String>) -> Self {
        Self::Malformed {
            token: token.into(),
        }
    }
}

// ==================== Scan Errors ====================

/// Which side of a brace pair is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceFault {
    /// An opening brace never closes before end of text.
    Unclosed,
    /// A closing brace has no opening partner.
    Unopened,
}

impl std::fmt::Display for BraceFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclosed => f.write_str("unclosed '{'"),
            Self::Unopened => f.write_str("unopened '}'"),
        }
    }
}

/// Fatal structural errors. A file that produces one of these is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Brace nesting does not balance.
    #[error("unbalanced braces: {fault} at line {line} (byte {offset})")]
    UnbalancedBraces {
        /// Byte offset of the offending brace.
        offset: usize,
        /// 1-based line of the offending brace.
        line: usize,
        /// Which side is missing.
        fault: BraceFault,
    },
}

// ==================== Grouping Errors ====================

/// Recoverable grouping problems, recorded as diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// Two entities resolved to the same output identifier; the first one was kept.
    #[error("duplicate key '{key}' from '{source_tag}' dropped (first seen in '{kept_from}')")]
    DuplicateKey {
        /// The shared output identifier.
        key: String,
        /// Source tag of the dropped entity.
        source_tag: String,
        /// Source tag of the entity that was kept.
        kept_from: String,
    },
}

// ==================== Localisation Errors ====================

/// Recoverable localisation problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalisationError {
    /// None of the candidate keys resolved under the strict policy.
    #[error("no localisation for any of [{}]", candidates.join(", "))]
    Missing {
        /// The keys that were tried, in order.
        candidates: Vec<String>,
    },
}

// ==================== Umbrella ====================

/// The error type for `Clausewitz` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural scan failure.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Color expression failure.
    #[error(transparent)]
    Color(#[from] ParseError),

    /// Grouping failure.
    #[error(transparent)]
    Group(#[from] GroupError),

    /// Localisation failure.
    #[error(transparent)]
    Localisation(#[from] LocalisationError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for `Clausewitz` operations.
pub type Result<T> = std::result::Result<T, Error>;
