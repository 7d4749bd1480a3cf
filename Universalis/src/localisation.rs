//! Localisation output files
//!
//! Entries from every extractor are merged and then split by key shape into
//! the country, culture and religion files.

use std::path::PathBuf;

use clausewitz::localisation::{render_localisation, LocalisationAccumulator};

/// Which output file a localisation key belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocCategory {
    Countries,
    Cultures,
    Religion,
}

impl LocCategory {
    /// Upper-case tags (and their `_ADJ` keys) are countries, `*_culture`
    /// keys are cultures, anything else is a religion.
    pub fn of(key: &str) -> Self {
        let tag = key.strip_suffix("_ADJ").unwrap_or(key);
        let is_tag = !tag.is_empty()
            && tag.chars().count() <= 3
            && tag.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if is_tag {
            Self::Countries
        } else if key.ends_with("_culture") {
            Self::Cultures
        } else {
            Self::Religion
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            Self::Countries => "ir_countries",
            Self::Cultures => "ir_cultures",
            Self::Religion => "ir_religion",
        }
    }

    /// `main_menu/localization/<language>/<stem>_l_<language>.yml`
    pub fn output_path(self, language: &str) -> PathBuf {
        PathBuf::from(format!(
            "main_menu/localization/{language}/{}_l_{language}.yml",
            self.file_stem()
        ))
    }
}

/// Split merged entries into rendered localisation files.
pub fn render_files(entries: LocalisationAccumulator, language: &str) -> Vec<(PathBuf, String)> {
    entries
        .partition(LocCategory::of)
        .into_iter()
        .map(|(category, bucket)| (category.output_path(language), render_localisation(language, &bucket)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_categories() {
        assert_eq!(LocCategory::of("ROM"), LocCategory::Countries);
        assert_eq!(LocCategory::of("ROM_ADJ"), LocCategory::Countries);
        assert_eq!(LocCategory::of("A01"), LocCategory::Countries);
        assert_eq!(LocCategory::of("ROMA"), LocCategory::Religion);
        assert_eq!(LocCategory::of("roman_culture"), LocCategory::Cultures);
        assert_eq!(LocCategory::of("roman_pantheon"), LocCategory::Religion);
    }

    #[test]
    fn test_render_files() {
        let entries: LocalisationAccumulator = [
            ("roman_culture", "Roman"),
            ("ROM", "Rome"),
            ("ROM_ADJ", "Roman"),
            ("roman_pantheon", "Roman"),
        ]
        .into_iter()
        .collect();
        let files = render_files(entries, "english");

        assert_eq!(files.len(), 3);
        assert_eq!(
            files[0].0,
            PathBuf::from("main_menu/localization/english/ir_cultures_l_english.yml")
        );
        assert_eq!(files[1].1, "l_english:\n\n ROM: \"Rome\"\n ROM_ADJ: \"Roman\"\n");
        assert_eq!(
            files[2].0,
            PathBuf::from("main_menu/localization/english/ir_religion_l_english.yml")
        );
    }
}
