//! Script text output
//!
//! The inverse of the scanner: renders [`ScriptBlock`]s as brace script.
//! Attributes come first, then notes, then bare values, then child blocks.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tree::ScriptBlock;
use crate::error::Result;

/// Indentation unit for nested lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    fn unit(self) -> String {
        match self {
            Self::Tab => "\t".to_string(),
            Self::Spaces(n) => " ".repeat(n),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptWriter {
    unit: String,
}

impl Default for ScriptWriter {
    fn default() -> Self {
        Self::new(Indent::Tab)
    }
}

impl ScriptWriter {
    #[must_use]
    pub fn new(indent: Indent) -> Self {
        Self { unit: indent.unit() }
    }

    /// Render one block, ending with a newline.
    #[must_use]
    pub fn render_block(&self, block: &ScriptBlock) -> String {
        let mut out = String::new();
        self.write_block(&mut out, block, 0);
        out
    }

    /// Render top-level blocks separated by a blank line.
    #[must_use]
    pub fn render_blocks(&self, blocks: &[ScriptBlock]) -> String {
        blocks
            .iter()
            .map(|b| self.render_block(b))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render `header` comment lines followed by `blocks`.
    #[must_use]
    pub fn render_file(&self, header: &[String], blocks: &[ScriptBlock]) -> String {
        let mut out = String::new();
        for line in header {
            let _ = writeln!(out, "# {line}");
        }
        if !header.is_empty() && !blocks.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.render_blocks(blocks));
        out
    }

    /// Write `blocks` to `path` as UTF-8 without a BOM, creating parent directories.
    pub fn write_file(&self, path: impl AsRef<Path>, blocks: &[ScriptBlock]) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render_blocks(blocks))?;
        tracing::debug!("Wrote {} blocks to {}", blocks.len(), path.display());
        Ok(())
    }

    fn write_block(&self, out: &mut String, block: &ScriptBlock, depth: usize) {
        let pad = self.unit.repeat(depth);
        if let Some(comment) = &block.comment {
            for line in comment.lines() {
                let _ = writeln!(out, "{pad}# {line}");
            }
        }

        let inline = block.attributes.is_empty() && block.children.is_empty() && block.notes.is_empty();
        if inline {
            if block.values.is_empty() {
                let _ = writeln!(out, "{pad}{} = {{ }}", block.name);
            } else {
                let _ = writeln!(out, "{pad}{} = {{ {} }}", block.name, block.values.join(" "));
            }
            return;
        }

        let inner = self.unit.repeat(depth + 1);
        let _ = writeln!(out, "{pad}{} = {{", block.name);
        for (key, value) in &block.attributes {
            let _ = writeln!(out, "{inner}{key} = {value}");
        }
        for note in &block.notes {
            let _ = writeln!(out, "{inner}# {note}");
        }
        if !block.values.is_empty() {
            let _ = writeln!(out, "{inner}{}", block.values.join(" "));
        }
        for child in &block.children {
            self.write_block(out, child, depth + 1);
        }
        let _ = writeln!(out, "{pad}}}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_nested() {
        let block = ScriptBlock::new("roman_culture")
            .with_color(Color::Rgb8(1, 2, 3))
            .with_child(ScriptBlock::new("tags").with_value("roman_gfx"))
            .with_note("source_file = 00_latin.txt");
        let out = ScriptWriter::new(Indent::Tab).render_block(&block);
        assert_eq!(
            out,
            "roman_culture = {\n\tcolor = rgb { 1 2 3 }\n\t# source_file = 00_latin.txt\n\ttags = { roman_gfx }\n}\n"
        );
    }

    #[test]
    fn test_render_empty_and_spaces() {
        let block = ScriptBlock::new("a").with_child(ScriptBlock::new("b"));
        let out = ScriptWriter::new(Indent::Spaces(2)).render_block(&block);
        assert_eq!(out, "a = {\n  b = { }\n}\n");
    }

    #[test]
    fn test_blank_line_between_top_level_blocks() {
        let blocks = vec![ScriptBlock::new("a"), ScriptBlock::new("b")];
        let out = ScriptWriter::default().render_blocks(&blocks);
        assert_eq!(out, "a = { }\n\nb = { }\n");
    }

    #[test]
    fn test_comment_above_block() {
        let block = ScriptBlock::new("ROM").with_comment("ROM -> countries/rome.txt");
        let out = ScriptWriter::new(Indent::Tab).render_block(&block);
        assert_eq!(out, "# ROM -> countries/rome.txt\nROM = { }\n");
    }

    #[test]
    fn test_render_file_header() {
        let out = ScriptWriter::new(Indent::Tab)
            .render_file(&["Converted religions".to_string()], &[ScriptBlock::new("a")]);
        assert_eq!(out, "# Converted religions\n\na = { }\n");
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        ScriptWriter::new(Indent::Tab)
            .write_file(&path, &[ScriptBlock::new("a").with_attribute("k", "v")])
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a = {\n\tk = v\n}\n");
    }
}
