//! Hierarchy grouping
//!
//! Folds entities into caller-supplied groups keyed by their source tag.
//! Order is significant everywhere: the first matching group wins, groups come
//! out in order of their first member, and the first entity claiming an output
//! key keeps it.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::GroupError;

/// Group for entities no mapping entry claims.
pub const UNGROUPED: &str = "ungrouped";

/// An entity waiting to be grouped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Output identifier; must be unique across the grouping.
    pub key: String,
    pub display_label: Option<String>,
    pub color: Option<Color>,
    /// Tag matched against the mapping's tag sets.
    pub source_tag: String,
}

impl Entity {
    #[must_use]
    pub fn new(key: impl Into<String>, source_tag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_label: None,
            color: None,
            source_tag: source_tag.into(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// An entity with its group assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedEntity {
    pub key: String,
    pub display_label: Option<String>,
    pub color: Option<Color>,
    pub group_key: String,
    pub source_tag: String,
}

/// Ordered group key → set of source tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupMapping {
    groups: IndexMap<String, IndexSet<String>>,
}

impl GroupMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add tags to `group`, creating it at the end if new.
    pub fn insert<I, S>(&mut self, group: impl Into<String>, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .entry(group.into())
            .or_default()
            .extend(tags.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn with_group<I, S>(mut self, group: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(group, tags);
        self
    }

    /// The first group, in insertion order, whose tag set contains `tag`.
    #[must_use]
    pub fn group_for(&self, tag: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, tags)| tags.contains(tag))
            .map(|(group, _)| group.as_str())
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<G, I, S> FromIterator<(G, I)> for GroupMapping
where
    G: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (G, I)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (group, tags) in iter {
            mapping.insert(group, tags);
        }
        mapping
    }
}

/// Result of a grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grouping {
    pub groups: IndexMap<String, Vec<GroupedEntity>>,
    #[serde(skip)]
    pub diagnostics: Vec<GroupError>,
}

impl Grouping {
    #[must_use]
    pub fn get(&self, group: &str) -> Option<&[GroupedEntity]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Group of the entity with output key `key`.
    #[must_use]
    pub fn group_of(&self, key: &str) -> Option<&str> {
        self.entities()
            .find(|e| e.key == key)
            .map(|e| e.group_key.as_str())
    }

    /// Every grouped entity, group by group.
    pub fn entities(&self) -> impl Iterator<Item = &GroupedEntity> {
        self.groups.values().flatten()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Groups entities with a [`GroupMapping`].
#[derive(Debug, Clone)]
pub struct HierarchyGrouper {
    fallback: String,
}

impl Default for HierarchyGrouper {
    fn default() -> Self {
        Self {
            fallback: UNGROUPED.to_string(),
        }
    }
}

impl HierarchyGrouper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fallback` instead of [`UNGROUPED`] for unmatched entities.
    #[must_use]
    pub fn with_fallback(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// Assign every entity to its group.
    pub fn group<I>(&self, entities: I, mapping: &GroupMapping) -> Grouping
    where
        I: IntoIterator<Item = Entity>,
    {
        let mut grouping = Grouping::default();
        let mut seen: IndexMap<String, String> = IndexMap::new();

        for entity in entities {
            if let Some(kept_from) = seen.get(&entity.key) {
                let err = GroupError::DuplicateKey {
                    key: entity.key.clone(),
                    source_tag: entity.source_tag.clone(),
                    kept_from: kept_from.clone(),
                };
                tracing::warn!("{err}");
                grouping.diagnostics.push(err);
                continue;
            }
            seen.insert(entity.key.clone(), entity.source_tag.clone());

            let group_key = mapping
                .group_for(&entity.source_tag)
                .unwrap_or(self.fallback.as_str())
                .to_string();
            grouping
                .groups
                .entry(group_key.clone())
                .or_default()
                .push(GroupedEntity {
                    key: entity.key,
                    display_label: entity.display_label,
                    color: entity.color,
                    group_key,
                    source_tag: entity.source_tag,
                });
        }

        tracing::debug!(
            "Grouped {} entities into {} groups ({} duplicates)",
            grouping.entity_count(),
            grouping.len(),
            grouping.diagnostics.len()
        );
        grouping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping() -> GroupMapping {
        GroupMapping::new()
            .with_group("hellenic", ["ATH", "SPA"])
            .with_group("italic", ["ROM", "SAM"])
            .with_group("greek_again", ["ATH"])
    }

    fn keys(grouping: &Grouping, group: &str) -> Vec<String> {
        grouping.get(group).unwrap().iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn test_first_matching_group_wins() {
        let grouping = HierarchyGrouper::new().group([Entity::new("ATH", "ATH")], &mapping());
        assert_eq!(grouping.group_of("ATH"), Some("hellenic"));
        assert!(grouping.get("greek_again").is_none());
    }

    #[test]
    fn test_unmatched_goes_to_ungrouped() {
        let grouping = HierarchyGrouper::new().group([Entity::new("CAR", "CAR")], &mapping());
        assert_eq!(grouping.group_of("CAR"), Some(UNGROUPED));
    }

    #[test]
    fn test_group_order_follows_first_member() {
        let entities = [
            Entity::new("ROM", "ROM"),
            Entity::new("CAR", "CAR"),
            Entity::new("ATH", "ATH"),
            Entity::new("SAM", "SAM"),
        ];
        let grouping = HierarchyGrouper::new().group(entities, &mapping());
        let order: Vec<&str> = grouping.groups.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["italic", UNGROUPED, "hellenic"]);
        assert_eq!(keys(&grouping, "italic"), vec!["ROM", "SAM"]);
    }

    #[test]
    fn test_duplicate_key_first_wins() {
        let entities = [
            Entity::new("ATH", "ATH").with_label("Athens"),
            Entity::new("ATH", "SPA").with_label("Impostor"),
        ];
        let grouping = HierarchyGrouper::new().group(entities, &mapping());
        assert_eq!(grouping.entity_count(), 1);
        assert_eq!(
            grouping.get("hellenic").unwrap()[0].display_label.as_deref(),
            Some("Athens")
        );
        assert_eq!(
            grouping.diagnostics,
            vec![GroupError::DuplicateKey {
                key: "ATH".to_string(),
                source_tag: "SPA".to_string(),
                kept_from: "ATH".to_string(),
            }]
        );
    }

    #[test]
    fn test_custom_fallback() {
        let grouping =
            HierarchyGrouper::with_fallback("misc").group([Entity::new("X", "X")], &GroupMapping::new());
        assert_eq!(grouping.group_of("X"), Some("misc"));
    }

    #[test]
    fn test_mapping_from_iter() {
        let mapping: GroupMapping = [("a", vec!["x", "y"]), ("b", vec!["z"])].into_iter().collect();
        assert_eq!(mapping.group_for("z"), Some("b"));
        assert_eq!(mapping.len(), 2);
    }
}
