//! Structured view over scanned blocks
//!
//! [`ScriptTree`] turns [`RawBlock`]s into [`ScriptBlock`]s with their color
//! interpreted. Color problems never abort a file: they are collected as
//! [`Diagnostic`]s and the block is kept without a color.

use serde::Serialize;

use super::scanner::{line_of, BlockScanner, RawBlock, Span};
use crate::color::{parse_color_value, render, Color};
use crate::error::{ParseError, ScanError};

/// A block with its color resolved, ready to be rewritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptBlock {
    pub name: String,
    pub name_offset: usize,
    pub attributes: Vec<(String, String)>,
    pub values: Vec<String>,
    pub children: Vec<ScriptBlock>,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Free-form notes rendered as comments inside the block.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// A recoverable problem found while building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Dotted path of the block, e.g. `latin.culture.roman`.
    pub path: String,
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {}): {}", self.path, self.line, self.message)
    }
}

impl ScriptBlock {
    /// An empty block, for building output trees.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ScriptBlock) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Set the color and write it as the block's `color` attribute.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self.normalize_color();
        self
    }

    /// First attribute value for `key`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First attribute value for `key` with surrounding quotes removed.
    #[must_use]
    pub fn attribute_unquoted(&self, key: &str) -> Option<&str> {
        self.attribute(key).map(unquote)
    }

    /// First child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ScriptBlock> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children named `name`, in source order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ScriptBlock> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Search this block and its descendants, depth first, for an attribute.
    #[must_use]
    pub fn find_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key)
            .or_else(|| self.children.iter().find_map(|c| c.find_attribute(key)))
    }

    /// Replace whatever color syntax the block had with `color = rgb { ... }`
    /// (or `hsv { ... }`) as its first attribute.
    pub fn normalize_color(&mut self) {
        let Some(color) = self.color else {
            return;
        };
        self.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case("color"));
        self.children.retain(|c| !c.name.eq_ignore_ascii_case("color"));
        self.attributes.insert(0, ("color".to_string(), render(color)));
    }

    fn from_raw(raw: RawBlock, text: &str, parent: &str, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let path = if parent.is_empty() {
            raw.name.clone()
        } else {
            format!("{parent}.{}", raw.name)
        };

        let color = match raw_color(&raw, text) {
            Ok(color) => Some(color),
            Err(ParseError::NotFound) => None,
            Err(err) => {
                tracing::warn!("{path}: {err}");
                diagnostics.push(Diagnostic {
                    path: path.clone(),
                    line: line_of(text, raw.name_offset),
                    message: err.to_string(),
                });
                None
            }
        };

        let children = raw
            .children
            .into_iter()
            .map(|child| Self::from_raw(child, text, &path, diagnostics))
            .collect();

        Self {
            name: raw.name,
            name_offset: raw.name_offset,
            attributes: raw.attributes,
            values: raw.values,
            children,
            span: raw.span,
            comment: raw.comment,
            color,
            notes: Vec::new(),
        }
    }
}

/// The block's own color: a `color = ...` attribute, or a `color = { ... }` child.
fn raw_color(raw: &RawBlock, text: &str) -> Result<Color, ParseError> {
    if let Some((_, value)) = raw
        .attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("color"))
    {
        return parse_color_value(value);
    }
    match raw.children.iter().find(|c| c.name.eq_ignore_ascii_case("color")) {
        Some(child) => parse_color_value(child.span.slice(text)),
        None => Err(ParseError::NotFound),
    }
}

/// Strip one pair of surrounding double quotes.
#[must_use]
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Every top-level block of one file plus the problems found in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptTree {
    pub blocks: Vec<ScriptBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScriptTree {
    /// Scan `text` with the standard identifier syntax.
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        Self::parse_with(&BlockScanner::default(), text)
    }

    /// Scan `text` with a specific scanner.
    pub fn parse_with(scanner: &BlockScanner, text: &str) -> Result<Self, ScanError> {
        let raw = scanner.scan_all(text)?;
        Ok(Self::from_raw(raw, text))
    }

    /// Interpret the whole text as a single unnamed root block.
    ///
    /// Flat files (`color = rgb { ... }` at top level, `TAG = "path"` tables)
    /// keep their top-level attributes this way; the root's color is the
    /// file's top-level `color`.
    pub fn parse_document(scanner: &BlockScanner, text: &str) -> Result<Self, ScanError> {
        let root = scanner.scan_document(text)?;
        let mut diagnostics = Vec::new();
        let root = ScriptBlock::from_raw(root, text, "", &mut diagnostics);
        Ok(Self {
            blocks: vec![root],
            diagnostics,
        })
    }

    /// Interpret already scanned blocks. `text` must be the text they came from.
    #[must_use]
    pub fn from_raw(raw: Vec<RawBlock>, text: &str) -> Self {
        let mut diagnostics = Vec::new();
        let blocks = raw
            .into_iter()
            .map(|block| ScriptBlock::from_raw(block, text, "", &mut diagnostics))
            .collect();
        Self {
            blocks,
            diagnostics,
        }
    }

    /// First top-level block named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScriptBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// All top-level blocks named `name`.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ScriptBlock> {
        self.blocks.iter().filter(move |b| b.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptBlock> {
        self.blocks.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Pretty JSON dump of the tree.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a ScriptTree {
    type Item = &'a ScriptBlock;
    type IntoIter = std::slice::Iter<'a, ScriptBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
