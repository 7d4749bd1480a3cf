//! Display text lookup with fallbacks

use serde::{Deserialize, Serialize};

use super::reader::LocalisationTable;
use super::title_case;
use crate::error::LocalisationError;

/// Text written when nothing resolves under [`LookupPolicy::Strict`].
pub const MISSING: &str = "MISSING";

/// How far lookup may fall back when no table has a candidate key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPolicy {
    /// Tables only; otherwise [`MISSING`].
    #[default]
    Strict,
    /// Tables, then the source comment, then the humanized identifier.
    Loose,
}

/// Where a resolved text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    /// A table from the target game.
    Basegame,
    /// A table from the source game.
    Source,
    /// The comment above the source block.
    Comment,
    /// Generated from the identifier.
    Humanized,
    /// Nothing found.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub source: TextSource,
    /// The table key that matched, when a table supplied the text.
    pub key: Option<String>,
    pub diagnostic: Option<LocalisationError>,
}

impl Resolution {
    fn found(text: &str, source: TextSource, key: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            source,
            key: key.map(str::to_string),
            diagnostic: None,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.source == TextSource::Missing
    }
}

/// Looks keys up across several tables in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct LocalisationResolver {
    tables: Vec<(LocalisationTable, TextSource)>,
    policy: LookupPolicy,
}

impl LocalisationResolver {
    #[must_use]
    pub fn new(policy: LookupPolicy) -> Self {
        Self {
            tables: Vec::new(),
            policy,
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: LocalisationTable, source: TextSource) -> Self {
        self.add_table(table, source);
        self
    }

    pub fn add_table(&mut self, table: LocalisationTable, source: TextSource) {
        self.tables.push((table, source));
    }

    #[must_use]
    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    /// First table text for `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.tables.iter().find_map(|(table, _)| table.get(key))
    }

    /// Resolve display text for an entity.
    ///
    /// `candidates` are tried in order against every table (empty keys are
    /// skipped). Under [`LookupPolicy::Loose`] a non-empty `comment` and then
    /// the humanized `identifier` follow.
    #[must_use]
    pub fn resolve(&self, candidates: &[&str], comment: Option<&str>, identifier: &str) -> Resolution {
        for &key in candidates.iter().filter(|k| !k.is_empty()) {
            for (table, source) in &self.tables {
                if let Some(text) = table.get(key) {
                    return Resolution::found(text, *source, Some(key));
                }
            }
        }

        if self.policy == LookupPolicy::Loose {
            if let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) {
                return Resolution::found(comment, TextSource::Comment, None);
            }
            let humanized = humanize(identifier);
            if !humanized.is_empty() {
                return Resolution::found(&humanized, TextSource::Humanized, None);
            }
        }

        let err = LocalisationError::Missing {
            candidates: candidates.iter().map(|k| (*k).to_string()).collect(),
        };
        tracing::warn!("{err}");
        Resolution {
            text: MISSING.to_string(),
            source: TextSource::Missing,
            key: None,
            diagnostic: Some(err),
        }
    }
}

/// `roman_culture` → `Roman Culture`
#[must_use]
pub fn humanize(identifier: &str) -> String {
    title_case(identifier.replace(['_', '-'], " ").trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(policy: LookupPolicy) -> LocalisationResolver {
        let basegame = LocalisationTable::parse(" roman_culture: \"Roman\"\n");
        let source = LocalisationTable::parse(" roman_culture: \"Latin\"\n greek: \"Hellenic\"\n");
        LocalisationResolver::new(policy)
            .with_table(basegame, TextSource::Basegame)
            .with_table(source, TextSource::Source)
    }

    #[test]
    fn test_first_candidate_first_table() {
        let r = resolver(LookupPolicy::Strict).resolve(&["roman_culture", "greek"], None, "roman");
        assert_eq!(r.text, "Roman");
        assert_eq!(r.source, TextSource::Basegame);
        assert_eq!(r.key.as_deref(), Some("roman_culture"));
    }

    #[test]
    fn test_later_table_and_empty_candidates() {
        let r = resolver(LookupPolicy::Strict).resolve(&["", "greek"], None, "greek");
        assert_eq!(r.text, "Hellenic");
        assert_eq!(r.source, TextSource::Source);
    }

    #[test]
    fn test_strict_missing() {
        let r = resolver(LookupPolicy::Strict).resolve(&["punic"], Some("Punic people"), "punic");
        assert!(r.is_missing());
        assert_eq!(r.text, MISSING);
        assert_eq!(
            r.diagnostic,
            Some(LocalisationError::Missing {
                candidates: vec!["punic".to_string()]
            })
        );
    }

    #[test]
    fn test_loose_uses_comment_then_identifier() {
        let loose = resolver(LookupPolicy::Loose);
        let r = loose.resolve(&["punic"], Some("  Punic people "), "punic");
        assert_eq!(r.text, "Punic people");
        assert_eq!(r.source, TextSource::Comment);

        let r = loose.resolve(&["punic_culture"], Some("  "), "north-punic_culture");
        assert_eq!(r.text, "North Punic Culture");
        assert_eq!(r.source, TextSource::Humanized);
        assert!(r.diagnostic.is_none());
    }

    #[test]
    fn test_loose_with_nothing_is_missing() {
        let r = resolver(LookupPolicy::Loose).resolve(&[], None, "__");
        assert!(r.is_missing());
    }

    #[test]
    fn test_policy_from_toml_style_name() {
        let policy: LookupPolicy = serde_json::from_str("\"loose\"").unwrap();
        assert_eq!(policy, LookupPolicy::Loose);
    }
}
