//! Map data: named locations and the region hierarchy

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::OnceLock;

use clausewitz::color::Color;
use clausewitz::grouping::{Entity, GroupMapping, Grouping, HierarchyGrouper};
use clausewitz::script::{ScriptBlock, ScriptWriter};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::config::MapHierarchy;
use crate::corpus::SourceFile;
use crate::summary::{DiagnosticKind, RunDiagnostic};

/// Input path of the province table, relative to the game root.
pub const DEFINITION_CSV: &str = "map_data/definition.csv";

/// A province from `definition.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: u32,
    pub key: String,
    pub color: Color,
}

/// Everything extracted from `map_data`.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub locations: Vec<Location>,
    /// Continent blocks nesting subcontinents, superregions, regions and areas.
    pub hierarchy: Vec<ScriptBlock>,
    pub diagnostics: Vec<RunDiagnostic>,
}

impl MapData {
    /// `key = rrggbb` lines, one per location.
    pub fn render_named_locations(&self) -> String {
        let mut out = String::new();
        for location in &self.locations {
            let _ = writeln!(out, "{} = {}", location.key, location.color.to_hex());
        }
        out
    }

    pub fn render(&self, writer: &ScriptWriter) -> Vec<(PathBuf, String)> {
        let mut files = Vec::new();
        if !self.locations.is_empty() {
            files.push((
                PathBuf::from("in_game/map_data/named_locations/00_default.txt"),
                self.render_named_locations(),
            ));
        }
        if !self.hierarchy.is_empty() {
            files.push((
                PathBuf::from("in_game/map_data/definitions.txt"),
                writer.render_blocks(&self.hierarchy),
            ));
        }
        files
    }
}

/// Lower-case `[a-z0-9_]` key for a display name: `New Carthage` →
/// `new_carthage`, `NeaPolis` → `nea_polis`, `ROMA` → `roma`.
pub fn clean_name(name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let separators = SEPARATORS.get_or_init(|| Regex::new(r"[ \-]+").expect("valid regex"));
    let invalid = INVALID.get_or_init(|| Regex::new(r"[^a-z0-9_]").expect("valid regex"));

    let name = separators.replace_all(name, "_");
    let all_upper = name.chars().any(char::is_uppercase) && !name.chars().any(char::is_lowercase);

    let mut split = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if !all_upper && c.is_uppercase() && prev.is_some_and(|p| p != '_') {
            split.push('_');
        }
        split.push(c);
        prev = Some(c);
    }
    invalid.replace_all(&split.to_lowercase(), "").into_owned()
}

/// Parse `definition.csv` (`id;r;g;b;name;...`, header row first).
/// Keys shared by several rows are all suffixed `_0`, `_1`, ...
pub fn parse_definitions(text: &str) -> (Vec<Location>, Vec<RunDiagnostic>) {
    let mut rows: Vec<Location> = Vec::new();
    let mut diagnostics = Vec::new();

    let text = text.trim_start_matches('\u{feff}');
    for (index, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_row(line) {
            Some(location) => rows.push(location),
            None => diagnostics.push(
                RunDiagnostic::new(DiagnosticKind::InvalidRow, format!("line {}: '{line}'", index + 1))
                    .in_file(DEFINITION_CSV),
            ),
        }
    }

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in &rows {
        *counts.entry(row.key.clone()).or_default() += 1;
    }
    let mut used: IndexMap<String, usize> = IndexMap::new();
    for row in &mut rows {
        if counts.get(&row.key).copied().unwrap_or(0) > 1 {
            let n = used.entry(row.key.clone()).or_default();
            row.key = format!("{}_{n}", row.key);
            *n += 1;
        }
    }
    (rows, diagnostics)
}

fn parse_row(line: &str) -> Option<Location> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() < 5 {
        return None;
    }
    let id = fields[0].trim().parse().ok()?;
    let channel = |i: usize| fields[i].trim().parse::<u8>().ok();
    Some(Location {
        id,
        key: clean_name(fields[4].trim()),
        color: Color::Rgb8(channel(1)?, channel(2)?, channel(3)?),
    })
}

/// Members listed under `list` in each top-level block, or the block's own
/// bare values when there is no such list.
fn members<'a>(file: &'a SourceFile, list: &str) -> IndexMap<&'a str, Vec<&'a str>> {
    file.tree
        .iter()
        .map(|block| {
            let values = block.child(list).map_or(&block.values, |c| &c.values);
            (block.name.as_str(), values.iter().map(String::as_str).collect())
        })
        .collect()
}

fn fold(names: impl IntoIterator<Item = String>, mapping: &GroupMapping) -> Grouping {
    HierarchyGrouper::new().group(names.into_iter().map(|n| Entity::new(n.clone(), n)), mapping)
}

/// Map inputs, all optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapSources<'a> {
    /// Text of `definition.csv`.
    pub definitions: Option<&'a str>,
    /// `map_data/areas.txt`.
    pub areas: Option<&'a SourceFile>,
    /// `map_data/regions.txt`.
    pub regions: Option<&'a SourceFile>,
}

/// Build named locations and the continent hierarchy.
pub fn extract_map(sources: MapSources<'_>, hierarchy: &MapHierarchy) -> MapData {
    let mut data = MapData::default();
    if let Some(text) = sources.definitions {
        let (locations, diagnostics) = parse_definitions(text);
        data.locations = locations;
        data.diagnostics.extend(diagnostics);
    }
    let id_to_key: IndexMap<u32, &str> = data.locations.iter().map(|l| (l.id, l.key.as_str())).collect();

    let (Some(areas_file), Some(regions_file)) = (sources.areas, sources.regions) else {
        tracing::info!("Extracted {} locations, no region hierarchy", data.locations.len());
        return data;
    };
    data.diagnostics.extend(RunDiagnostic::from_tree(areas_file));
    data.diagnostics.extend(RunDiagnostic::from_tree(regions_file));

    let mut areas: IndexMap<&str, Vec<String>> = IndexMap::new();
    let mut unresolved = Vec::new();
    for (area, ids) in members(areas_file, "provinces") {
        let mut keys = Vec::new();
        for id in ids {
            match id.parse::<u32>().ok().and_then(|id| id_to_key.get(&id)) {
                Some(key) => keys.push((*key).to_string()),
                None => unresolved.push(
                    RunDiagnostic::new(
                        DiagnosticKind::UnresolvedReference,
                        format!("unknown province id '{id}' in {area}"),
                    )
                    .in_file(&areas_file.relative),
                ),
            }
        }
        areas.insert(area, keys);
    }
    let regions = members(regions_file, "areas");
    for (region, region_areas) in &regions {
        for area in region_areas.iter().filter(|a| !areas.contains_key(*a)) {
            unresolved.push(
                RunDiagnostic::new(
                    DiagnosticKind::UnresolvedReference,
                    format!("unknown area '{area}' in {region}"),
                )
                .in_file(&regions_file.relative),
            );
        }
    }
    data.diagnostics.extend(unresolved);

    // region → superregion → subcontinent → continent
    let superregions = fold(regions.keys().map(|r| (*r).to_string()), &hierarchy.superregion_mapping());
    let subcontinents = fold(superregions.groups.keys().cloned(), &hierarchy.subcontinent_mapping());
    let continents = fold(subcontinents.groups.keys().cloned(), &hierarchy.continents);
    for grouping in [&superregions, &subcontinents, &continents] {
        data.diagnostics.extend(
            grouping
                .diagnostics
                .iter()
                .map(|e| RunDiagnostic::new(DiagnosticKind::DuplicateKey, e.to_string())),
        );
    }

    let region_block = |region: &str| {
        regions
            .get(region)
            .into_iter()
            .flatten()
            .filter_map(|area| areas.get(area).map(|locations| (*area, locations)))
            .fold(ScriptBlock::new(region), |block, (area, locations)| {
                block.with_child(locations.iter().fold(ScriptBlock::new(area), |b, l| b.with_value(l)))
            })
    };
    let nest = |grouping: &Grouping, group: &str, inner: &dyn Fn(&str) -> ScriptBlock| {
        grouping
            .get(group)
            .unwrap_or_default()
            .iter()
            .fold(ScriptBlock::new(group), |block, member| block.with_child(inner(&member.key)))
    };

    data.hierarchy = continents
        .groups
        .keys()
        .map(|continent| {
            nest(&continents, continent, &|subcontinent: &str| {
                nest(&subcontinents, subcontinent, &|superregion: &str| {
                    nest(&superregions, superregion, &region_block)
                })
            })
        })
        .collect();

    tracing::info!(
        "Extracted {} locations in {} areas and {} regions",
        data.locations.len(),
        areas.len(),
        regions.len()
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausewitz::script::ScriptTree;
    use pretty_assertions::assert_eq;

    fn source(relative: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/ir").join(relative),
            relative: PathBuf::from(relative),
            text: text.to_string(),
            tree: ScriptTree::parse(text).unwrap(),
        }
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("New Carthage"), "new_carthage");
        assert_eq!(clean_name("NeaPolis"), "nea_polis");
        assert_eq!(clean_name("ROMA"), "roma");
        assert_eq!(clean_name("Aqua-Sextiae"), "aqua_sextiae");
        assert_eq!(clean_name("Tyre (Sur)"), "tyre__sur");
        assert_eq!(clean_name("Île"), "le");
        assert_eq!(clean_name(""), "");
    }

    #[test]
    fn test_parse_definitions() {
        let csv = "\u{feff}province;red;green;blue;x;x\n\
                   1;255;0;16;Roma;x\n\
                   # sea zones\n\
                   2;0;0;255;Alexandria;x\n\
                   3;1;2;3;Alexandria;x\n\
                   4;bad;2;3;Nowhere;x\n\
                   5;1;2\n";
        let (rows, diagnostics) = parse_definitions(csv);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["roma", "alexandria_0", "alexandria_1"]);
        assert_eq!(rows[0].color.to_hex(), "ff0010");
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::InvalidRow));
    }

    #[test]
    fn test_hierarchy() {
        let csv = "header\n1;1;1;1;Roma\n2;2;2;2;Ostia\n3;3;3;3;Athenai\n";
        let areas = source(
            "map_data/areas.txt",
            "latium_area = { provinces = { 1 2 99 } }\nattica_area = { provinces = { 3 } }\n",
        );
        let regions = source(
            "map_data/regions.txt",
            "central_italy_region = { areas = { latium_area } }\ngreece_region = { areas = { attica_area } }\natlantis_region = { areas = { sunk_area } }\n",
        );
        let data = extract_map(
            MapSources {
                definitions: Some(csv),
                areas: Some(&areas),
                regions: Some(&regions),
            },
            &MapHierarchy::default(),
        );

        let written = ScriptWriter::default().render_blocks(&data.hierarchy);
        assert_eq!(
            written,
            "eurasia = {\n\
             \teurope = {\n\
             \t\titaly = {\n\
             \t\t\tcentral_italy_region = {\n\
             \t\t\t\tlatium_area = { roma ostia }\n\
             \t\t\t}\n\
             \t\t}\n\
             \t\tbalkans = {\n\
             \t\t\tgreece_region = {\n\
             \t\t\t\tattica_area = { athenai }\n\
             \t\t\t}\n\
             \t\t}\n\
             \t}\n\
             }\n\
             \n\
             ungrouped = {\n\
             \tungrouped = {\n\
             \t\tungrouped = {\n\
             \t\t\tatlantis_region = { }\n\
             \t\t}\n\
             \t}\n\
             }\n"
        );
        let messages: Vec<_> = data.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unknown province id '99' in latium_area", "unknown area 'sunk_area' in atlantis_region"]
        );
    }

    #[test]
    fn test_named_locations_output() {
        let data = extract_map(
            MapSources {
                definitions: Some("h\n1;255;0;16;Roma\n"),
                ..MapSources::default()
            },
            &MapHierarchy::default(),
        );
        let files = data.render(&ScriptWriter::default());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].1, "roma = ff0010\n");
    }
}
