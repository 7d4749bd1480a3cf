//! Localisation tables, lookup and output
//!
//! - [`LocalisationTable`] - parsed `*.yml` files
//! - [`LocalisationResolver`] - candidate-key lookup under a [`LookupPolicy`]
//! - [`LocalisationAccumulator`] - entries produced by a conversion
//! - [`AdjectiveStrategy`] - country adjectives

pub mod adjective;
pub mod reader;
pub mod resolver;
pub mod writer;

pub use adjective::{AdjectiveStrategy, SuffixHeuristic, WithOverrides, DEFAULT_OVERRIDES};
pub use reader::LocalisationTable;
pub use resolver::{humanize, LocalisationResolver, LookupPolicy, Resolution, TextSource, MISSING};
pub use writer::{render_localisation, write_localisation, LocalisationAccumulator};

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `"new york"` becomes `"New York"` and `"o'neil"` becomes `"O'Neil"`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}
