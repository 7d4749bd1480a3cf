//! Brace script reading and writing
//!
//! - [`scanner`] finds `identifier = { ... }` blocks and their byte spans
//! - [`comment`] associates the `#` comment run above a block
//! - [`tree`] interprets blocks (colors, diagnostics)
//! - [`writer`] renders blocks back to text

pub mod comment;
pub mod scanner;
pub mod tree;
pub mod writer;

pub use comment::leading_comment;
pub use scanner::{BlockScanner, Blocks, IdentifierSyntax, RawBlock, Span};
pub use tree::{unquote, Diagnostic, ScriptBlock, ScriptTree};
pub use writer::{Indent, ScriptWriter};
