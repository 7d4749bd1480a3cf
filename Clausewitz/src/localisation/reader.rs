//! Localisation table reading
//!
//! Files look like:
//!
//! ```text
//! l_english:
//!  ROM: "Rome"
//!  ROM_ADJ:0 "Roman"
//! ```

use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::Result;

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\s*([^\s:#"]+)\s*:\s*\d*\s*"(.*)"\s*(?:#.*)?$"#).expect("valid entry pattern")
    })
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*l_([a-z_]+)\s*:\s*$").expect("valid header pattern"))
}

/// Ordered key → text table for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalisationTable {
    language: Option<String>,
    entries: IndexMap<String, String>,
}

impl LocalisationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one localisation file. Lines that are not entries are ignored;
    /// a later entry for the same key replaces the earlier one.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let line = line.trim_start_matches('\u{feff}');
            if let Some(caps) = entry_pattern().captures(line) {
                let text = caps[2].trim().replace("\\\"", "\"");
                table.insert(&caps[1], text);
            } else if table.language.is_none() {
                if let Some(caps) = header_pattern().captures(line) {
                    table.language = Some(caps[1].to_string());
                }
            }
        }
        table
    }

    /// Read and parse a single file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Merge every `*.yml` file under `dir` in file-name order.
    ///
    /// A missing directory gives an empty table.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut table = Self::new();
        if !dir.is_dir() {
            tracing::debug!("No localisation directory at {}", dir.display());
            return Ok(table);
        }

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("yml")
            {
                continue;
            }
            match Self::load(path) {
                Ok(file_table) => table.merge(file_table),
                Err(err) => tracing::warn!("Skipping {}: {err}", path.display()),
            }
        }
        tracing::info!("Loaded {} localisation entries from {}", table.len(), dir.display());
        Ok(table)
    }

    /// Language named by the `l_<language>:` header, if one was read.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), text.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Add `other`'s entries, replacing existing keys.
    pub fn merge(&mut self, other: Self) {
        if self.language.is_none() {
            self.language = other.language;
        }
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let text = "\u{feff}l_english:\n ROM: \"Rome\"\n ROM_ADJ:0 \"Roman\" # adjective\n# comment\n";
        let table = LocalisationTable::parse(text);
        assert_eq!(table.language(), Some("english"));
        assert_eq!(table.get("ROM"), Some("Rome"));
        assert_eq!(table.get("ROM_ADJ"), Some("Roman"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_escaped_quotes() {
        let table = LocalisationTable::parse(" say: \"the \\\"true\\\" king\"");
        assert_eq!(table.get("say"), Some("the \"true\" king"));
    }

    #[test]
    fn test_later_entry_replaces() {
        let table = LocalisationTable::parse(" a: \"one\"\n a: \"two\"");
        assert_eq!(table.get("a"), Some("two"));
    }

    #[test]
    fn test_load_dir_merges_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_l_english.yml"), "l_english:\n x: \"first\"\n").unwrap();
        std::fs::write(dir.path().join("b_l_english.yml"), "l_english:\n x: \"second\"\n y: \"y\"\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), " z: \"ignored\"").unwrap();

        let table = LocalisationTable::load_dir(dir.path()).unwrap();
        assert_eq!(table.get("x"), Some("second"));
        assert_eq!(table.get("y"), Some("y"));
        assert!(!table.contains("z"));
    }

    #[test]
    fn test_load_dir_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = LocalisationTable::load_dir(dir.path().join("nope")).unwrap();
        assert!(table.is_empty());
    }
}
