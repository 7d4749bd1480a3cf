//! Localisation output

use std::fmt::Write as _;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;

/// Entries collected during a conversion, threaded through extractors and
/// merged by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalisationAccumulator {
    entries: IndexMap<String, String>,
}

impl LocalisationAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` for `key`, returning the text it replaced.
    pub fn add(&mut self, key: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), text.into())
    }

    /// Absorb `other`; its entries replace existing ones.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Split into buckets chosen by `category`, keeping entry order.
    pub fn partition<C, F>(self, mut category: F) -> IndexMap<C, LocalisationAccumulator>
    where
        C: std::hash::Hash + Eq,
        F: FnMut(&str) -> C,
    {
        let mut buckets: IndexMap<C, LocalisationAccumulator> = IndexMap::new();
        for (key, text) in self.entries {
            buckets.entry(category(&key)).or_default().add(key, text);
        }
        buckets
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

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalisationAccumulator {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut acc = Self::new();
        for (k, v) in iter {
            acc.add(k, v);
        }
        acc
    }
}

/// Render a localisation file: `l_<language>:` header, a blank line, then
/// one ` key: "text"` line per entry sorted by key.
#[must_use]
pub fn render_localisation(language: &str, entries: &LocalisationAccumulator) -> String {
    let mut sorted: Vec<(&str, &str)> = entries.iter().collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut out = format!("l_{language}:\n\n");
    for (key, text) in sorted {
        let _ = writeln!(out, " {key}: \"{}\"", escape(text));
    }
    out
}

/// Write a localisation file as UTF-8 without a BOM.
pub fn write_localisation(
    path: impl AsRef<Path>,
    language: &str,
    entries: &LocalisationAccumulator,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_localisation(language, entries))?;
    tracing::debug!("Wrote {} localisation entries to {}", entries.len(), path.display());
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}
