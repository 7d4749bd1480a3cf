//! Religions

use std::path::PathBuf;
use std::sync::OnceLock;

use clausewitz::color::{derive_color_from_name, to_rgb8, Color};
use clausewitz::grouping::{Entity, HierarchyGrouper, UNGROUPED};
use clausewitz::localisation::{LocalisationAccumulator, MISSING};
use clausewitz::script::{ScriptBlock, ScriptWriter};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::Serialize;

use super::{ColorOrigin, ExtractContext};
use crate::corpus::SourceFile;
use crate::summary::{DiagnosticKind, RunDiagnostic};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Religion {
    pub name: String,
    /// Always [`Color::Rgb8`].
    pub color: Color,
    pub origin: ColorOrigin,
    pub label: String,
    /// Religion group from the settings, `None` when ungrouped.
    pub group: Option<String>,
    pub source_file: String,
}

/// Everything extracted from `common/religions`.
#[derive(Debug, Clone, Default)]
pub struct ReligionSet {
    pub religions: Vec<Religion>,
    pub localisation: LocalisationAccumulator,
    pub diagnostics: Vec<RunDiagnostic>,
}

impl ReligionSet {
    pub fn get(&self, name: &str) -> Option<&Religion> {
        self.religions.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.religions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.religions.is_empty()
    }

    pub fn render(&self, writer: &ScriptWriter) -> Vec<(PathBuf, String)> {
        if self.religions.is_empty() {
            return Vec::new();
        }
        let blocks: Vec<ScriptBlock> = self.religions.iter().map(religion_block).collect();
        let mut files = vec![(
            PathBuf::from("in_game/common/religions/ir_religions.txt"),
            writer.render_file(&["Imperator religions".to_string()], &blocks),
        )];

        let groups: IndexSet<&str> = self.religions.iter().filter_map(|r| r.group.as_deref()).collect();
        if !groups.is_empty() {
            let blocks: Vec<ScriptBlock> = groups.into_iter().map(ScriptBlock::new).collect();
            files.push((
                PathBuf::from("in_game/common/religion_groups/ir_religion_groups.txt"),
                writer.render_file(&["Imperator religion groups".to_string()], &blocks),
            ));
        }
        files
    }
}

fn religion_block(religion: &Religion) -> ScriptBlock {
    let mut block = ScriptBlock::new(&religion.name).with_color(religion.color);
    if let Some(group) = &religion.group {
        block = block.with_attribute("religion_group", group);
    }
    block = block.with_note(format!("source_file = {}", religion.source_file));
    if religion.origin == ColorOrigin::Derived {
        block = block.with_note("derived color");
    }
    block
}

/// Drop a trailing " Religion" or " Pantheon": `Roman Pantheon` → `Roman`.
pub fn tidy_label(label: &str) -> String {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    let suffix = SUFFIX.get_or_init(|| Regex::new(r"(?i)\s+(religion|pantheon)\s*$").expect("valid regex"));
    let tidy = suffix.replace(label, "");
    if tidy.trim().is_empty() {
        label.to_string()
    } else {
        tidy.into_owned()
    }
}

/// Extract every top-level religion block from the scanned `common/religions` files.
pub fn extract_religions(files: &[SourceFile], ctx: &ExtractContext<'_>) -> ReligionSet {
    let mut set = ReligionSet::default();
    let mut found: IndexMap<String, Religion> = IndexMap::new();
    let mut order: Vec<Entity> = Vec::new();

    for file in files {
        set.diagnostics.extend(RunDiagnostic::from_tree(file));
        for block in file.tree.iter() {
            let name = block.name.clone();
            let short = name.strip_suffix("_religion").unwrap_or(&name);
            let label = ctx.label(
                &[&name, short],
                block.comment.as_deref(),
                &name,
                &file.relative,
                &mut set.diagnostics,
            );
            let label = if label == MISSING { label } else { tidy_label(&label) };

            let (color, origin) = match block.color {
                Some(color) => (color, ColorOrigin::Explicit),
                None => (derive_color_from_name(&name), ColorOrigin::Derived),
            };
            let (r, g, b) = to_rgb8(color);

            order.push(Entity::new(&name, &name).with_label(&label));
            found.entry(name.clone()).or_insert(Religion {
                name,
                color: Color::Rgb8(r, g, b),
                origin,
                label,
                group: None,
                source_file: file.file_name(),
            });
        }
    }

    let grouping = HierarchyGrouper::new().group(order, &ctx.settings.religion_groups);
    for err in &grouping.diagnostics {
        set.diagnostics.push(RunDiagnostic::new(DiagnosticKind::DuplicateKey, err.to_string()));
    }

    for entity in grouping.entities() {
        if let Some(religion) = found.get(&entity.key) {
            let mut religion = religion.clone();
            religion.group = (entity.group_key != UNGROUPED).then(|| entity.group_key.clone());
            set.localisation.add(&religion.name, &religion.label);
            set.religions.push(religion);
        }
    }

    tracing::info!("Extracted {} religions", set.len());
    set
}
