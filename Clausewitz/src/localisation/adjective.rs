//! Country adjective derivation
//!
//! Turning a place name into an English adjective is guesswork, so it sits
//! behind [`AdjectiveStrategy`]. [`SuffixHeuristic`] is the stock guess and
//! [`WithOverrides`] layers per-tag answers on top of any strategy.

use indexmap::IndexMap;

use super::title_case;

/// Produces an adjective for a country.
pub trait AdjectiveStrategy {
    /// Adjective for the country `tag` whose display name is `name`, or
    /// `None` when nothing sensible can be produced.
    fn adjective(&self, tag: &str, name: &str) -> Option<String>;
}

/// Names whose adjective no suffix rule gets right.
const EXCEPTIONS: &[(&str, &str)] = &[
    ("France", "French"),
    ("Greece", "Greek"),
    ("England", "English"),
    ("Scotland", "Scottish"),
    ("Ireland", "Irish"),
    ("Rome", "Roman"),
    ("Persia", "Persian"),
    ("Spain", "Spanish"),
    ("Germany", "German"),
    ("Egypt", "Egyptian"),
    ("Herakleia Minoa", "Minoan"),
    ("Minoa", "Minoan"),
    ("Athens", "Athenian"),
    ("Byzantion", "Byzantine"),
    ("Byzantium", "Byzantine"),
];

/// Endings that already read as adjectives.
const ADJECTIVAL_SUFFIXES: &[&str] = &["ian", "an", "ese", "ish", "ic", "ean", "ine"];

/// Suffixes tried, in order, when no rule matched.
const FALLBACK_SUFFIXES: &[&str] = &["ian", "ese", "ish", "ic", "an"];

/// Per-tag adjectives for countries the heuristic mangles.
pub const DEFAULT_OVERRIDES: &[(&str, &str)] = &[
    ("HEM", "Minoan"),
    ("BAR", "Barbarian"),
    ("BOA", "Boian"),
    ("BOI", "Boian"),
    ("EPO", "Emporian"),
    ("SRM", "Sarmatian"),
    ("ABM", "Ambian"),
    ("MYD", "Mariandynian"),
];

/// Exceptions table plus English suffix rules applied to the last word of
/// the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixHeuristic;

impl AdjectiveStrategy for SuffixHeuristic {
    fn adjective(&self, _tag: &str, name: &str) -> Option<String> {
        derive_adjective(name)
    }
}

fn derive_adjective(name: &str) -> Option<String> {
    let name = name.trim().trim_matches('"');
    if name.is_empty() {
        return None;
    }
    if let Some((_, adjective)) = EXCEPTIONS.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        return Some((*adjective).to_string());
    }

    let last_word = name.split_whitespace().last().unwrap_or(name);
    let mut stem: String = last_word
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    // Latin plurals: Ambiani -> Ambian
    if stem.to_lowercase().ends_with('i') && stem.chars().count() > 2 {
        stem.pop();
    }
    if stem.is_empty() {
        return Some(title_case(name));
    }

    let lower = stem.to_lowercase();
    let len = stem.chars().count();
    if ADJECTIVAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return Some(title_case(&stem));
    }
    if lower.ends_with("ia") && len > 2 {
        return Some(title_case(&format!("{}ian", drop_chars(&stem, 2))));
    }
    if lower.ends_with("eion") && len > 4 {
        return Some(title_case(&format!("{}eian", drop_chars(&stem, 4))));
    }
    if lower.ends_with("ion") && len > 3 {
        return Some(title_case(&format!("{}ine", drop_chars(&stem, 3))));
    }
    if lower.ends_with("nses") && len > 4 {
        return Some(title_case(&format!("{}ian", drop_chars(&stem, 2))));
    }

    FALLBACK_SUFFIXES
        .iter()
        .map(|suffix| join_suffix(&stem, suffix))
        .find(|candidate| candidate.to_lowercase() != lower)
        .or_else(|| Some(title_case(&stem)))
}

fn drop_chars(s: &str, n: usize) -> String {
    let keep = s.chars().count().saturating_sub(n);
    s.chars().take(keep).collect()
}

/// Append `suffix`, trimming trailing letters that clash with its first
/// letter (same letter, or vowel meeting vowel).
fn join_suffix(stem: &str, suffix: &str) -> String {
    const VOWELS: &str = "aeiou";
    let Some(first) = suffix.chars().next().map(|c| c.to_ascii_lowercase()) else {
        return title_case(stem);
    };
    let mut base: Vec<char> = stem.chars().collect();
    while let Some(last) = base.last().map(char::to_ascii_lowercase) {
        if last == first || (VOWELS.contains(last) && VOWELS.contains(first)) {
            base.pop();
        } else {
            break;
        }
    }
    if base.is_empty() {
        return title_case(&format!("{stem}{suffix}"));
    }
    let base: String = base.into_iter().collect();
    title_case(&format!("{base}{suffix}"))
}

/// Per-tag overrides checked before the wrapped strategy.
#[derive(Debug, Clone, Default)]
pub struct WithOverrides<S> {
    overrides: IndexMap<String, String>,
    inner: S,
}

impl<S> WithOverrides<S> {
    pub fn new(inner: S, overrides: IndexMap<String, String>) -> Self {
        Self { overrides, inner }
    }

    /// Wrap `inner` with [`DEFAULT_OVERRIDES`].
    pub fn with_defaults(inner: S) -> Self {
        let overrides = DEFAULT_OVERRIDES
            .iter()
            .map(|(tag, adjective)| ((*tag).to_string(), (*adjective).to_string()))
            .collect();
        Self::new(inner, overrides)
    }

    #[must_use]
    pub fn override_for(&self, tag: &str) -> Option<&str> {
        self.overrides.get(tag).map(String::as_str)
    }
}

impl<S: AdjectiveStrategy> AdjectiveStrategy for WithOverrides<S> {
    fn adjective(&self, tag: &str, name: &str) -> Option<String> {
        self.override_for(tag)
            .map(str::to_string)
            .or_else(|| self.inner.adjective(tag, name))
    }
}
