//! Cultures and culture groups
//!
//! One Imperator culture file holds one culture group. The group key comes
//! from the file name (`00_latin_group.txt` → `latin`), the cultures from the
//! `culture = { ... }` blocks inside it.

use std::path::PathBuf;
use std::sync::OnceLock;

use clausewitz::color::{derive_color_from_name, hue_rotate, parse_color, render, to_rgb8, Color};
use clausewitz::grouping::{Entity, GroupMapping, HierarchyGrouper};
use clausewitz::localisation::LocalisationAccumulator;
use clausewitz::script::{ScriptBlock, ScriptWriter};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use super::{rotation_index, ExtractContext};
use crate::config::ColorPolicy;
use crate::corpus::SourceFile;
use crate::summary::{DiagnosticKind, RunDiagnostic};

/// Graphical culture used when neither the culture nor its group names one.
pub const DEFAULT_GFX: &str = "imperator_gfx";

/// Where a culture's color came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ColorOrigin {
    Explicit,
    /// Rotated from the file's base color by the culture's position.
    HueShifted { base: Color, index: u32 },
    /// Derived from the culture name.
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Culture {
    /// Imperator name, e.g. `roman`.
    pub name: String,
    /// Output key, e.g. `roman_culture`.
    pub key: String,
    pub group: String,
    /// Always [`Color::Rgb8`].
    pub color: Color,
    pub origin: ColorOrigin,
    pub gfx: String,
    pub label: String,
    pub source_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CultureGroup {
    pub key: String,
    pub color: Option<Color>,
    pub cultures: Vec<Culture>,
}

impl CultureGroup {
    /// Output key, e.g. `latin_group`.
    pub fn output_key(&self) -> String {
        format!("{}_group", self.key)
    }
}

/// Everything extracted from `common/cultures`.
#[derive(Debug, Clone, Default)]
pub struct CultureSet {
    pub groups: Vec<CultureGroup>,
    pub localisation: LocalisationAccumulator,
    pub diagnostics: Vec<RunDiagnostic>,
}

impl CultureSet {
    pub fn cultures(&self) -> impl Iterator<Item = &Culture> {
        self.groups.iter().flat_map(|g| g.cultures.iter())
    }

    /// The culture called `name` in Imperator.
    pub fn get(&self, name: &str) -> Option<&Culture> {
        self.cultures().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.cultures().count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Render every output file: one per group plus the group list.
    pub fn render(&self, writer: &ScriptWriter) -> Vec<(PathBuf, String)> {
        let mut files: Vec<(PathBuf, String)> = self
            .groups
            .iter()
            .map(|group| {
                let blocks: Vec<ScriptBlock> = group.cultures.iter().map(culture_block).collect();
                let header = [format!("Cultures of the Imperator group '{}'", group.key)];
                (
                    PathBuf::from(format!("in_game/common/cultures/ir_{}.txt", group.key)),
                    writer.render_file(&header, &blocks),
                )
            })
            .collect();

        if !self.groups.is_empty() {
            let blocks: Vec<ScriptBlock> = self
                .groups
                .iter()
                .map(|g| ScriptBlock::new(g.output_key()))
                .collect();
            files.push((
                PathBuf::from("in_game/common/culture_groups/ir_culture_groups.txt"),
                writer.render_file(&["Imperator culture groups".to_string()], &blocks),
            ));
        }
        files
    }
}

fn culture_block(culture: &Culture) -> ScriptBlock {
    let mut block = ScriptBlock::new(&culture.key)
        .with_color(culture.color)
        .with_note(format!("source_file = {}", culture.source_file));
    match culture.origin {
        ColorOrigin::Explicit => {}
        ColorOrigin::HueShifted { base, .. } => {
            block = block.with_note(format!("hue-shifted from {}", render(base)));
        }
        ColorOrigin::Derived => block = block.with_note("derived color"),
    }
    block
        .with_child(ScriptBlock::new("tags").with_value(&culture.gfx))
        .with_child(ScriptBlock::new("culture_groups").with_value(format!("{}_group", culture.group)))
}

/// Group key for a culture file stem: `00_latin_group` → `latin`.
pub fn group_key_for(stem: &str) -> String {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX.get_or_init(|| Regex::new(r"^[0-9]+_").expect("valid regex"));
    let key = prefix.replace(stem, "");
    key.strip_suffix("_group").unwrap_or(&key).to_string()
}

/// A culture as read, before its color is settled.
struct RawCulture<'a> {
    name: String,
    color: Option<Color>,
    comment: Option<&'a str>,
    gfx: Option<&'a str>,
}

impl<'a> RawCulture<'a> {
    fn from_block(block: &'a ScriptBlock) -> Self {
        Self {
            name: block.name.clone(),
            color: block.color,
            comment: block.comment.as_deref(),
            gfx: block.attribute_unquoted("graphical_culture"),
        }
    }
}

/// Cultures of one file plus the group-level color and graphics.
struct FileCultures<'a> {
    color: Option<Color>,
    gfx: Option<&'a str>,
    cultures: Vec<RawCulture<'a>>,
}

fn read_file<'a>(file: &'a SourceFile, group: &str) -> FileCultures<'a> {
    let group_blocks: Vec<&ScriptBlock> = file
        .tree
        .iter()
        .filter(|b| b.child("culture").is_some())
        .collect();

    if !group_blocks.is_empty() {
        let cultures = group_blocks
            .iter()
            .copied()
            .flat_map(|b| b.children_named("culture"))
            .flat_map(|c| c.children.iter())
            .map(RawCulture::from_block)
            .collect();
        return FileCultures {
            color: group_blocks.iter().find_map(|b| b.color),
            gfx: group_blocks
                .iter()
                .find_map(|b| b.attribute_unquoted("graphical_culture")),
            cultures,
        };
    }

    let loose: Vec<RawCulture<'a>> = file
        .tree
        .iter()
        .filter(|b| b.name != "culture" && !b.name.ends_with("_group"))
        .map(RawCulture::from_block)
        .collect();
    if !loose.is_empty() {
        return FileCultures {
            color: None,
            gfx: None,
            cultures: loose,
        };
    }

    // Nothing usable: the group stands in for its only culture.
    FileCultures {
        color: None,
        gfx: None,
        cultures: vec![RawCulture {
            name: group.to_string(),
            color: parse_color(&file.text).ok(),
            comment: None,
            gfx: None,
        }],
    }
}

fn rotated(base: Color, position: usize, ctx: &ExtractContext<'_>) -> (Color, ColorOrigin) {
    let index = rotation_index(position);
    (
        hue_rotate(base, index, ctx.settings.hue_factor),
        ColorOrigin::HueShifted { base, index },
    )
}

/// The color a file's cultures are rotated from, if the policy rotates.
fn rotation_base(read: &FileCultures<'_>, policy: ColorPolicy) -> Option<Color> {
    match policy {
        ColorPolicy::RotateSiblings => read.cultures.first().and_then(|first| first.color).or(read.color),
        ColorPolicy::RotateMissing => read.color.or_else(|| read.cultures.iter().find_map(|c| c.color)),
        ColorPolicy::KeepExplicit => None,
    }
}

fn settle_color(
    raw: &RawCulture<'_>,
    base: Option<Color>,
    position: usize,
    ctx: &ExtractContext<'_>,
) -> (Color, ColorOrigin) {
    let explicit = raw.color.map(|color| {
        let (r, g, b) = to_rgb8(color);
        Color::Rgb8(r, g, b)
    });
    match (ctx.settings.color_policy, explicit, base) {
        // Rotating the first culture by zero gives back its own color.
        (ColorPolicy::RotateSiblings, Some(color), _) if position == 0 => (color, ColorOrigin::Explicit),
        (ColorPolicy::RotateSiblings, _, Some(base)) | (ColorPolicy::RotateMissing, None, Some(base)) => {
            rotated(base, position, ctx)
        }
        (_, Some(color), _) => (color, ColorOrigin::Explicit),
        _ => {
            let (r, g, b) = to_rgb8(derive_color_from_name(&raw.name));
            (Color::Rgb8(r, g, b), ColorOrigin::Derived)
        }
    }
}

/// Extract every culture from the scanned `common/cultures` files.
pub fn extract_cultures(files: &[SourceFile], ctx: &ExtractContext<'_>) -> CultureSet {
    let mut set = CultureSet::default();
    let mut found: Vec<Culture> = Vec::new();
    let mut group_colors: IndexMap<String, Option<Color>> = IndexMap::new();

    for file in files {
        set.diagnostics.extend(RunDiagnostic::from_tree(file));
        let group = group_key_for(&file.stem());
        let read = read_file(file, &group);
        let base = rotation_base(&read, ctx.settings.color_policy);
        group_colors.entry(group.clone()).or_insert(read.color);

        for (position, raw) in read.cultures.iter().enumerate() {
            let key = format!("{}_culture", raw.name);
            let label = ctx.label(
                &[&key, &raw.name],
                raw.comment,
                &raw.name,
                &file.relative,
                &mut set.diagnostics,
            );
            let (color, origin) = settle_color(raw, base, position, ctx);
            found.push(Culture {
                name: raw.name.clone(),
                key,
                group: group.clone(),
                color,
                origin,
                gfx: raw.gfx.or(read.gfx).unwrap_or(DEFAULT_GFX).to_string(),
                label,
                source_file: file.file_name(),
            });
        }
    }

    // Group membership and duplicate culture keys go through the grouper.
    let mapping: GroupMapping = group_colors.keys().map(|g| (g.as_str(), [g.as_str()])).collect();
    let grouping = HierarchyGrouper::new().group(
        found
            .iter()
            .map(|c| Entity::new(&c.key, &c.group).with_color(c.color)),
        &mapping,
    );
    for err in &grouping.diagnostics {
        set.diagnostics.push(RunDiagnostic::new(DiagnosticKind::DuplicateKey, err.to_string()));
    }

    let mut by_key: IndexMap<String, Culture> = IndexMap::new();
    for culture in found {
        by_key.entry(culture.key.clone()).or_insert(culture);
    }

    for (group, members) in grouping.groups {
        let cultures: Vec<Culture> = members
            .iter()
            .filter_map(|m| by_key.get(&m.key).cloned())
            .collect();
        for culture in &cultures {
            set.localisation.add(&culture.key, &culture.label);
        }
        set.groups.push(CultureGroup {
            color: group_colors.get(&group).copied().flatten(),
            key: group,
            cultures,
        });
    }

    tracing::info!("Extracted {} cultures in {} groups", set.len(), set.groups.len());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use clausewitz::localisation::{LocalisationResolver, LocalisationTable, LookupPolicy, TextSource};
    use clausewitz::script::ScriptTree;
    use pretty_assertions::assert_eq;

    fn source(name: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(format!("/ir/common/cultures/{name}")),
            relative: PathBuf::from(format!("common/cultures/{name}")),
            text: text.to_string(),
            tree: ScriptTree::parse(text).unwrap(),
        }
    }

    fn resolver() -> LocalisationResolver {
        LocalisationResolver::new(LookupPolicy::Strict).with_table(
            LocalisationTable::parse(" roman: \"Roman\"\n etruscan_culture: \"Etruscan\"\n"),
            TextSource::Source,
        )
    }

    const LATIN: &str = "latin = {
    color = rgb { 200 40 40 }
    graphical_culture = roman_gfx
    culture = {
        roman = { color = rgb { 180 30 30 } }
        etruscan = { graphical_culture = etruscan_gfx }
        samnite = { }
    }
}
";

    #[test]
    fn test_group_key_for() {
        assert_eq!(group_key_for("00_latin_group"), "latin");
        assert_eq!(group_key_for("latin"), "latin");
        assert_eq!(group_key_for("hellenic_group"), "hellenic");
        assert_eq!(group_key_for("01_02_x"), "02_x");
    }

    #[test]
    fn test_colors_gfx_and_labels() {
        let settings = Settings::default();
        let resolver = resolver();
        let set = extract_cultures(&[source("00_latin.txt", LATIN)], &ExtractContext::new(&settings, &resolver));

        assert_eq!(set.groups.len(), 1);
        let group = &set.groups[0];
        assert_eq!(group.key, "latin");
        assert_eq!(group.color, Some(Color::Rgb8(200, 40, 40)));

        let roman = set.get("roman").unwrap();
        assert_eq!(roman.color, Color::Rgb8(180, 30, 30));
        assert_eq!(roman.origin, ColorOrigin::Explicit);
        assert_eq!(roman.gfx, "roman_gfx");
        assert_eq!(roman.label, "Roman");

        let etruscan = set.get("etruscan").unwrap();
        assert_eq!(etruscan.gfx, "etruscan_gfx");
        assert_eq!(etruscan.label, "Etruscan");
        let base = Color::Rgb8(180, 30, 30);
        assert_eq!(etruscan.color, hue_rotate(base, 1, 0.04));
        assert_eq!(etruscan.origin, ColorOrigin::HueShifted { base, index: 1 });

        let samnite = set.get("samnite").unwrap();
        assert_eq!(samnite.label, "MISSING");
        assert_eq!(set.diagnostics.len(), 1);
        assert_eq!(set.diagnostics[0].kind, DiagnosticKind::MissingLocalisation);
        assert_eq!(set.localisation.get("samnite_culture"), Some("MISSING"));
    }

    #[test]
    fn test_rotation_overrides_explicit_sibling_colors() {
        let settings = Settings::default();
        let resolver = resolver();
        let text = "latin = { culture = { roman = { color = rgb { 180 30 30 } } etruscan = { color = rgb { 10 200 10 } } } }";
        let set = extract_cultures(&[source("latin.txt", text)], &ExtractContext::new(&settings, &resolver));

        let roman = set.get("roman").unwrap();
        assert_eq!(roman.color, Color::Rgb8(180, 30, 30));
        assert_eq!(roman.origin, ColorOrigin::Explicit);
        let etruscan = set.get("etruscan").unwrap();
        assert_eq!(etruscan.color, Color::Rgb8(180, 66, 30));
        assert_eq!(
            etruscan.origin,
            ColorOrigin::HueShifted {
                base: Color::Rgb8(180, 30, 30),
                index: 1
            }
        );
    }

    #[test]
    fn test_rotation_base_falls_back_to_group_then_names() {
        let settings = Settings::default();
        let resolver = resolver();
        let ctx = ExtractContext::new(&settings, &resolver);

        let grouped = "latin = { color = rgb { 200 40 40 } culture = { roman = { } etruscan = { color = rgb { 10 200 10 } } } }";
        let set = extract_cultures(&[source("latin.txt", grouped)], &ctx);
        let base = Color::Rgb8(200, 40, 40);
        assert_eq!(set.get("roman").unwrap().color, base);
        assert_eq!(set.get("etruscan").unwrap().color, hue_rotate(base, 1, 0.04));

        let bare = "latin = { culture = { roman = { } etruscan = { } } }";
        let set = extract_cultures(&[source("latin.txt", bare)], &ctx);
        assert!(set.cultures().all(|c| c.origin == ColorOrigin::Derived));
    }

    #[test]
    fn test_rotate_missing_keeps_explicit() {
        let settings = Settings {
            color_policy: ColorPolicy::RotateMissing,
            ..Settings::default()
        };
        let resolver = resolver();
        let set = extract_cultures(&[source("latin.txt", LATIN)], &ExtractContext::new(&settings, &resolver));

        assert_eq!(set.get("roman").unwrap().origin, ColorOrigin::Explicit);
        let base = Color::Rgb8(200, 40, 40);
        let samnite = set.get("samnite").unwrap();
        assert_eq!(samnite.color, hue_rotate(base, 2, 0.04));
        assert_eq!(samnite.origin, ColorOrigin::HueShifted { base, index: 2 });

        let explicit = "latin = { culture = { roman = { color = rgb { 180 30 30 } } etruscan = { color = rgb { 10 200 10 } } } }";
        let set = extract_cultures(&[source("latin.txt", explicit)], &ExtractContext::new(&settings, &resolver));
        assert_eq!(set.get("etruscan").unwrap().color, Color::Rgb8(10, 200, 10));
    }

    #[test]
    fn test_keep_explicit_derives_the_rest() {
        let settings = Settings {
            color_policy: ColorPolicy::KeepExplicit,
            ..Settings::default()
        };
        let resolver = resolver();
        let set = extract_cultures(&[source("latin.txt", LATIN)], &ExtractContext::new(&settings, &resolver));
        let samnite = set.get("samnite").unwrap();
        assert_eq!(samnite.origin, ColorOrigin::Derived);
        let (r, g, b) = to_rgb8(derive_color_from_name("samnite"));
        assert_eq!(samnite.color, Color::Rgb8(r, g, b));
    }

    #[test]
    fn test_fallbacks() {
        let settings = Settings::default();
        let resolver = resolver();
        let ctx = ExtractContext::new(&settings, &resolver);

        let loose = extract_cultures(
            &[source("punic_group.txt", "carthaginian = { }\npunic_group = { }\n")],
            &ctx,
        );
        assert_eq!(loose.groups[0].key, "punic");
        assert_eq!(loose.cultures().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["carthaginian"]);

        let empty = extract_cultures(&[source("01_iberian.txt", "# nothing here\n")], &ctx);
        let only = empty.get("iberian").unwrap();
        assert_eq!(only.gfx, DEFAULT_GFX);
        assert_eq!(only.origin, ColorOrigin::Derived);
    }

    #[test]
    fn test_duplicate_culture_keeps_first() {
        let settings = Settings::default();
        let resolver = resolver();
        let set = extract_cultures(
            &[
                source("latin.txt", "latin = { culture = { roman = { } } }"),
                source("greek.txt", "greek = { culture = { roman = { } athenian = { } } }"),
            ],
            &ExtractContext::new(&settings, &resolver),
        );
        assert_eq!(set.get("roman").unwrap().group, "latin");
        assert_eq!(set.groups[1].cultures.len(), 1);
        assert_eq!(
            set.diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::DuplicateKey)
                .count(),
            1
        );
    }

    #[test]
    fn test_render() {
        let settings = Settings::default();
        let resolver = resolver();
        let set = extract_cultures(&[source("latin.txt", LATIN)], &ExtractContext::new(&settings, &resolver));
        let files = set.render(&ScriptWriter::default());

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].0, PathBuf::from("in_game/common/cultures/ir_latin.txt"));
        assert!(files[0].1.contains(
            "roman_culture = {\n\tcolor = rgb { 180 30 30 }\n\t# source_file = latin.txt\n\ttags = { roman_gfx }\n\tculture_groups = { latin_group }\n}\n"
        ));
        assert!(files[0].1.contains("# hue-shifted from rgb { 180 30 30 }"));
        assert_eq!(files[1].0, PathBuf::from("in_game/common/culture_groups/ir_culture_groups.txt"));
        assert!(files[1].1.contains("latin_group = { }"));
    }
}
