//! Countries
//!
//! `setup/countries/countries.txt` lists `TAG = "path"` pairs. Each path is a
//! flat setup file holding the country's color, religion and culture;
//! `setup/main/00_default.txt` may override the latter two under
//! `country = { countries = { TAG = { ... } } }`.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use clausewitz::color::{derive_color_from_name, parse_color, to_rgb8, Color};
use clausewitz::grouping::{Entity, GroupMapping, HierarchyGrouper};
use clausewitz::localisation::{AdjectiveStrategy, LocalisationAccumulator, WithOverrides, MISSING};
use clausewitz::script::{unquote, ScriptBlock, ScriptWriter};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use super::{ColorOrigin, CultureSet, ExtractContext, ReligionSet};
use crate::corpus::SourceFile;
use crate::summary::{DiagnosticKind, RunDiagnostic};

/// Group for setup files that sit directly in `setup/countries`.
pub const ROOT_GROUP: &str = "root";

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"^[A-Z0-9]{2,3}$").expect("valid regex"))
}

/// One `TAG = "path"` line of the country list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryEntry {
    pub tag: String,
    /// Setup file path relative to the game root, `/` separated.
    pub path: String,
}

impl CountryEntry {
    /// Parent directory name of the setup file, or [`ROOT_GROUP`].
    pub fn group(&self) -> String {
        Path::new(&self.path)
            .parent()
            .and_then(Path::file_name)
            .map_or_else(|| ROOT_GROUP.to_string(), |n| n.to_string_lossy().to_string())
    }
}

/// Read the country list. Keys that are not 2-3 character upper-case tags
/// are reported and ignored.
pub fn country_list(file: &SourceFile) -> (Vec<CountryEntry>, Vec<RunDiagnostic>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();
    let Some(root) = file.root() else {
        return (entries, diagnostics);
    };

    for (key, value) in &root.attributes {
        if !tag_pattern().is_match(key) {
            diagnostics.push(
                RunDiagnostic::new(DiagnosticKind::InvalidRow, format!("'{key}' is not a country tag"))
                    .in_file(&file.relative),
            );
            continue;
        }
        entries.push(CountryEntry {
            tag: key.clone(),
            path: unquote(value).replace('\\', "/"),
        });
    }
    (entries, diagnostics)
}

/// First comment at the top of a file, before any script.
pub fn file_comment(text: &str) -> Option<String> {
    for line in text.lines() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }
        let comment = line.strip_prefix('#')?.trim_start_matches('#').trim();
        if !comment.is_empty() {
            return Some(comment.to_string());
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    pub tag: String,
    pub setup_path: String,
    pub group: String,
    /// Always [`Color::Rgb8`].
    pub color: Color,
    pub origin: ColorOrigin,
    /// Imperator culture and religion, as written.
    pub culture: Option<String>,
    pub religion: Option<String>,
    /// Output culture key when the culture was extracted.
    pub culture_definition: Option<String>,
    /// Output religion key when the religion was extracted.
    pub religion_definition: Option<String>,
    pub label: String,
    pub adjective: String,
}

/// Everything extracted for countries.
#[derive(Debug, Clone, Default)]
pub struct CountrySet {
    pub countries: Vec<Country>,
    pub localisation: LocalisationAccumulator,
    pub diagnostics: Vec<RunDiagnostic>,
}

impl CountrySet {
    pub fn get(&self, tag: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// One file per setup directory.
    pub fn render(&self, writer: &ScriptWriter) -> Vec<(PathBuf, String)> {
        let mut groups: IndexMap<&str, Vec<ScriptBlock>> = IndexMap::new();
        for country in &self.countries {
            groups.entry(country.group.as_str()).or_default().push(country_block(country));
        }
        groups
            .into_iter()
            .map(|(group, blocks)| {
                (
                    PathBuf::from(format!("in_game/setup/countries/ir_{group}.txt")),
                    writer.render_file(&[format!("===== {group} =====")], &blocks),
                )
            })
            .collect()
    }
}

fn country_block(country: &Country) -> ScriptBlock {
    let mut block = ScriptBlock::new(&country.tag)
        .with_comment(format!("{} -> {}", country.tag, country.setup_path))
        .with_color(country.color);
    if let Some(culture) = &country.culture_definition {
        block = block.with_attribute("culture_definition", culture);
    }
    if let Some(religion) = &country.religion_definition {
        block = block.with_attribute("religion_definition", religion);
    }
    if country.origin == ColorOrigin::Derived {
        block = block.with_note("derived color");
    }
    if let (None, Some(culture)) = (&country.culture_definition, &country.culture) {
        block = block.with_note(format!("unresolved culture_definition = {culture}"));
    }
    if let (None, Some(religion)) = (&country.religion_definition, &country.religion) {
        block = block.with_note(format!("unresolved religion_definition = {religion}"));
    }
    block
}

/// `primary_culture` and `religion` from `setup/main/00_default.txt`.
fn default_setup(file: Option<&SourceFile>, tag: &str) -> (Option<String>, Option<String>) {
    let Some(entry) = file
        .and_then(|f| f.tree.get("country"))
        .and_then(|c| c.child("countries"))
        .and_then(|c| c.child(tag))
    else {
        return (None, None);
    };
    (
        entry.attribute_unquoted("primary_culture").map(str::to_string),
        entry.attribute_unquoted("religion").map(str::to_string),
    )
}

/// Country inputs, all scanned before extraction starts.
#[derive(Debug, Clone, Copy)]
pub struct CountrySources<'a> {
    pub entries: &'a [CountryEntry],
    /// Setup files, scanned as documents.
    pub setups: &'a [SourceFile],
    /// `setup/main/00_default.txt`, scanned as blocks.
    pub default_setup: Option<&'a SourceFile>,
}

/// Build every listed country, resolving culture and religion references
/// against what was extracted.
pub fn extract_countries(
    sources: CountrySources<'_>,
    cultures: &CultureSet,
    religions: &ReligionSet,
    ctx: &ExtractContext<'_>,
) -> CountrySet {
    let mut set = CountrySet::default();
    let strategy = ctx.settings.adjective_strategy();
    let setups: IndexMap<String, &SourceFile> = sources
        .setups
        .iter()
        .map(|f| (f.relative.to_string_lossy().replace('\\', "/"), f))
        .collect();
    for file in sources.setups.iter().chain(sources.default_setup) {
        set.diagnostics.extend(RunDiagnostic::from_tree(file));
    }

    let mut found: Vec<Country> = Vec::new();
    for entry in sources.entries {
        let setup = setups.get(&entry.path).copied();
        let root = setup.and_then(SourceFile::root);
        if setup.is_none() {
            set.diagnostics.push(
                RunDiagnostic::new(
                    DiagnosticKind::UnresolvedReference,
                    format!("{}: setup file {} was not scanned", entry.tag, entry.path),
                )
                .in_file(&entry.path),
            );
        }

        let (default_culture, default_religion) = default_setup(sources.default_setup, &entry.tag);
        let culture = default_culture.or_else(|| {
            root.and_then(|r| r.find_attribute("primary_culture"))
                .map(|v| unquote(v).to_string())
        });
        let religion = default_religion.or_else(|| {
            root.and_then(|r| r.find_attribute("religion"))
                .map(|v| unquote(v).to_string())
        });

        let explicit = root
            .and_then(|r| r.color)
            .or_else(|| setup.and_then(|f| parse_color(&f.text).ok()));
        let (color, origin) = match explicit {
            Some(color) => (color, ColorOrigin::Explicit),
            None => (derive_color_from_name(&entry.tag), ColorOrigin::Derived),
        };
        let (r, g, b) = to_rgb8(color);

        let stem = Path::new(&entry.path)
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let comment = setup.and_then(|f| file_comment(&f.text));
        let label = ctx.label(
            &[&entry.tag],
            comment.as_deref(),
            &stem,
            Path::new(&entry.path),
            &mut set.diagnostics,
        );
        let adjective = adjective_for(&entry.tag, &label, ctx, &strategy);

        let culture_definition = culture
            .as_deref()
            .and_then(|c| cultures.get(c))
            .map(|c| c.key.clone());
        let religion_definition = religion
            .as_deref()
            .filter(|r| religions.contains(r))
            .map(str::to_string);
        for (kind, name, resolved) in [
            ("culture", &culture, culture_definition.is_some()),
            ("religion", &religion, religion_definition.is_some()),
        ] {
            if let (Some(name), false) = (name, resolved) {
                set.diagnostics.push(
                    RunDiagnostic::new(
                        DiagnosticKind::UnresolvedReference,
                        format!("{}: {kind} '{name}' was not extracted", entry.tag),
                    )
                    .in_file(&entry.path),
                );
            }
        }

        found.push(Country {
            tag: entry.tag.clone(),
            setup_path: entry.path.clone(),
            group: entry.group(),
            color: Color::Rgb8(r, g, b),
            origin,
            culture,
            religion,
            culture_definition,
            religion_definition,
            label,
            adjective,
        });
    }

    let mapping: GroupMapping = found
        .iter()
        .map(|c| (c.group.as_str(), [c.group.as_str()]))
        .collect();
    let grouping = HierarchyGrouper::new().group(
        found.iter().map(|c| Entity::new(&c.tag, &c.group).with_label(&c.label)),
        &mapping,
    );
    for err in &grouping.diagnostics {
        set.diagnostics.push(RunDiagnostic::new(DiagnosticKind::DuplicateKey, err.to_string()));
    }

    let mut by_tag: IndexMap<String, Country> = IndexMap::new();
    for country in found {
        by_tag.entry(country.tag.clone()).or_insert(country);
    }
    for entity in grouping.entities() {
        if let Some(country) = by_tag.shift_remove(&entity.key) {
            set.localisation.add(&country.tag, &country.label);
            set.localisation.add(format!("{}_ADJ", country.tag), &country.adjective);
            set.countries.push(country);
        }
    }

    tracing::info!("Extracted {} countries", set.len());
    set
}

/// Override table, then any table's `<TAG>_ADJ`, then the strategy, then the name itself.
fn adjective_for<S: AdjectiveStrategy>(
    tag: &str,
    label: &str,
    ctx: &ExtractContext<'_>,
    strategy: &WithOverrides<S>,
) -> String {
    if label == MISSING {
        return MISSING.to_string();
    }
    if let Some(adjective) = strategy.override_for(tag) {
        return adjective.to_string();
    }
    if let Some(adjective) = ctx.resolver.lookup(&format!("{tag}_ADJ")) {
        return adjective.to_string();
    }
    strategy
        .adjective(tag, label)
        .unwrap_or_else(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::extract::{extract_cultures, extract_religions};
    use clausewitz::localisation::{LocalisationResolver, LocalisationTable, LookupPolicy, TextSource};
    use clausewitz::script::{BlockScanner, ScriptTree};
    use pretty_assertions::assert_eq;

    fn blocks(relative: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/ir").join(relative),
            relative: PathBuf::from(relative),
            text: text.to_string(),
            tree: ScriptTree::parse(text).unwrap(),
        }
    }

    fn document(relative: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/ir").join(relative),
            relative: PathBuf::from(relative),
            text: text.to_string(),
            tree: ScriptTree::parse_document(&BlockScanner::default(), text).unwrap(),
        }
    }

    #[test]
    fn test_country_list() {
        let list = document(
            "setup/countries/countries.txt",
            "ROM = \"setup/countries/rome/rome.txt\"\n# comment\nATH = \"setup/countries/athens.txt\"\nbad_key = \"x.txt\"\n",
        );
        let (entries, diagnostics) = country_list(&list);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tag, "ROM");
        assert_eq!(entries[0].group(), "rome");
        assert_eq!(entries[1].group(), "countries");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidRow);

        let flat = CountryEntry {
            tag: "X".into(),
            path: "x.txt".into(),
        };
        assert_eq!(flat.group(), ROOT_GROUP);
    }

    #[test]
    fn test_file_comment() {
        assert_eq!(file_comment("\u{feff}\n# Rome\ncolor = x"), Some("Rome".to_string()));
        assert_eq!(file_comment("#\n## Athens ##\n"), Some("Athens ##".to_string()));
        assert_eq!(file_comment("color = x\n# late"), None);
    }

    #[test]
    fn test_extract_countries() {
        let settings = Settings::default();
        let resolver = LocalisationResolver::new(LookupPolicy::Loose).with_table(
            LocalisationTable::parse(" ROM: \"Rome\"\n ROM_ADJ: \"Roman Republic's\"\n ATH: \"Athens\"\n"),
            TextSource::Source,
        );
        let ctx = ExtractContext::new(&settings, &resolver);
        let cultures = extract_cultures(&[blocks("common/cultures/latin.txt", "latin = { culture = { roman = { } } }")], &ctx);
        let religions = extract_religions(&[blocks("common/religions/00_default.txt", "roman_pantheon = { }")], &ctx);

        let entries = vec![
            CountryEntry {
                tag: "ROM".into(),
                path: "setup/countries/rome.txt".into(),
            },
            CountryEntry {
                tag: "ATH".into(),
                path: "setup/countries/athens.txt".into(),
            },
            CountryEntry {
                tag: "CAR".into(),
                path: "setup/countries/carthage.txt".into(),
            },
            CountryEntry {
                tag: "BAR".into(),
                path: "setup/countries/barbarians.txt".into(),
            },
        ];
        let setups = vec![
            document(
                "setup/countries/rome.txt",
                "# Rome\ncolor = rgb { 200 0 0 }\nreligion = roman_pantheon\nprimary_culture = roman\n",
            ),
            document("setup/countries/athens.txt", "color = hsv { 0.6 0.5 0.8 }\nreligion = hellenic\n"),
            document("setup/countries/barbarians.txt", "# Barbarians\n"),
        ];
        let default = blocks(
            "setup/main/00_default.txt",
            "country = { countries = { ATH = { primary_culture = attic } } }",
        );

        let set = extract_countries(
            CountrySources {
                entries: &entries,
                setups: &setups,
                default_setup: Some(&default),
            },
            &cultures,
            &religions,
            &ctx,
        );

        let rome = set.get("ROM").unwrap();
        assert_eq!(rome.color, Color::Rgb8(200, 0, 0));
        assert_eq!(rome.culture_definition.as_deref(), Some("roman_culture"));
        assert_eq!(rome.religion_definition.as_deref(), Some("roman_pantheon"));
        assert_eq!(rome.adjective, "Roman Republic's");

        let athens = set.get("ATH").unwrap();
        assert_eq!(athens.culture.as_deref(), Some("attic"));
        assert_eq!(athens.culture_definition, None);
        assert_eq!(athens.religion_definition, None);
        assert_eq!(athens.adjective, "Athenian");
        assert!(matches!(athens.color, Color::Rgb8(..)));

        let carthage = set.get("CAR").unwrap();
        assert_eq!(carthage.origin, ColorOrigin::Derived);
        assert_eq!(carthage.label, "Carthage");
        assert_eq!(carthage.adjective, "Carthagian");

        let barbarians = set.get("BAR").unwrap();
        assert_eq!(barbarians.label, "Barbarians");
        assert_eq!(barbarians.adjective, "Barbarian");

        assert_eq!(set.localisation.get("ATH_ADJ"), Some("Athenian"));
        let unresolved = set
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnresolvedReference)
            .count();
        // ATH culture and religion, CAR setup file
        assert_eq!(unresolved, 3);
    }

    #[test]
    fn test_render_groups_and_notes() {
        let country = Country {
            tag: "ATH".into(),
            setup_path: "setup/countries/greece/athens.txt".into(),
            group: "greece".into(),
            color: Color::Rgb8(1, 2, 3),
            origin: ColorOrigin::Explicit,
            culture: Some("attic".into()),
            religion: Some("hellenic_pantheon".into()),
            culture_definition: None,
            religion_definition: Some("hellenic_pantheon".into()),
            label: "Athens".into(),
            adjective: "Athenian".into(),
        };
        let set = CountrySet {
            countries: vec![country],
            ..CountrySet::default()
        };
        let files = set.render(&ScriptWriter::default());
        assert_eq!(files[0].0, PathBuf::from("in_game/setup/countries/ir_greece.txt"));
        assert_eq!(
            files[0].1,
            "# ===== greece =====\n\n# ATH -> setup/countries/greece/athens.txt\nATH = {\n\tcolor = rgb { 1 2 3 }\n\treligion_definition = hellenic_pantheon\n\t# unresolved culture_definition = attic\n}\n"
        );
    }
}
