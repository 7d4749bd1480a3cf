//! CLI command to dump the block tree of one script file

use std::path::Path;

use anyhow::Context;
use clausewitz::script::{BlockScanner, IdentifierSyntax, ScriptBlock, ScriptTree};

use crate::bom::strip_bom;
use crate::cli::progress::WARNING;
use crate::corpus::ScanMode;

/// Scan `path` and print its tree, as text or JSON
pub fn execute(
    path: &Path,
    mode: ScanMode,
    permissive: bool,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(strip_bom(&bytes).unwrap_or(&bytes));

    let syntax = if permissive {
        IdentifierSyntax::permissive()
    } else {
        IdentifierSyntax::standard()
    };
    let scanner = BlockScanner::new(syntax);
    let tree = match mode {
        ScanMode::Blocks => ScriptTree::parse_with(&scanner, &text),
        ScanMode::Document => ScriptTree::parse_document(&scanner, &text),
    }
    .with_context(|| format!("Failed to scan {}", path.display()))?;

    if json {
        println!("{}", tree.to_json()?);
        return Ok(());
    }

    if !quiet {
        println!("{}: {} top-level block(s)", path.display(), tree.len());
        println!();
    }
    for block in &tree {
        print_block(block, 0);
    }

    if !tree.diagnostics.is_empty() {
        println!();
        for diagnostic in &tree.diagnostics {
            println!("{WARNING}{diagnostic}");
        }
    }

    Ok(())
}

fn print_block(block: &ScriptBlock, depth: usize) {
    let pad = "  ".repeat(depth);
    if let Some(comment) = &block.comment {
        for line in comment.lines() {
            println!("{pad}# {line}");
        }
    }

    let name = if block.name.is_empty() { "<root>" } else { &block.name };
    let mut line = format!("{pad}{name}");
    if let Some(color) = block.color {
        line.push_str(&format!("  color {color}"));
    }
    if !block.attributes.is_empty() {
        line.push_str(&format!("  ({} attributes)", block.attributes.len()));
    }
    if !block.values.is_empty() {
        line.push_str(&format!("  [{}]", block.values.join(" ")));
    }
    println!("{line}");

    for child in &block.children {
        print_block(child, depth + 1);
    }
}
