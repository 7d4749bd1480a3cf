//! # Clausewitz
//!
//! Reading, interpreting and writing the brace-delimited script dialect used
//! by Paradox strategy games.
//!
//! ## Components
//!
//! - **Scanner** - lazy, comment-aware `identifier = { ... }` block scanning
//! - **Colors** - `rgb`, `hsv` and bare float triplets, hue rotation, name-derived colors
//! - **Script trees** - blocks with colors interpreted and per-file diagnostics
//! - **Grouping** - ordered, first-match folding of entities into groups
//! - **Localisation** - `*.yml` tables, lookup policies, adjectives, output
//!
//! ## Quick Start
//!
//! ```
//! use clausewitz::prelude::*;
//!
//! let tree = ScriptTree::parse("culture = { ruman = { color = rgb { 10 20 30 } } }")?;
//! let ruman = &tree.get("culture").unwrap().children[0];
//! assert_eq!(ruman.color, Some(Color::Rgb8(10, 20, 30)));
//!
//! let out = ScriptWriter::new(Indent::Tab).render_blocks(&tree.blocks);
//! assert!(out.starts_with("culture = {"));
//! # Ok::<(), clausewitz::Error>(())
//! ```

pub mod color;
pub mod error;
pub mod grouping;
pub mod localisation;
pub mod script;

pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{
        BraceFault, Error, GroupError, LocalisationError, ParseError, Result, ScanError,
    };

    pub use crate::color::{
        derive_color_from_name, hue_rotate, parse_color, parse_color_value, render, rotate_hsv,
        to_rgb8, Color, RawFloatTriplet,
    };

    pub use crate::script::{
        leading_comment, BlockScanner, Diagnostic, IdentifierSyntax, Indent, RawBlock,
        ScriptBlock, ScriptTree, ScriptWriter, Span,
    };

    pub use crate::grouping::{
        Entity, GroupMapping, GroupedEntity, Grouping, HierarchyGrouper, UNGROUPED,
    };

    pub use crate::localisation::{
        AdjectiveStrategy, LocalisationAccumulator, LocalisationResolver, LocalisationTable,
        LookupPolicy, SuffixHeuristic, TextSource, WithOverrides,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
