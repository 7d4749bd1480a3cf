//! Block scanner for brace-delimited script text
//!
//! The scanner walks a small token stream (words, quoted strings, `=`, `{`, `}`)
//! with `#` comments and BOMs stripped out. Top-level `identifier = { ... }`
//! blocks are yielded one at a time; everything inside a block is parsed
//! recursively into attributes, bare values and child blocks.

use serde::Serialize;

use super::comment::leading_comment;
use crate::error::{BraceFault, ScanError};

/// Byte range covering one balanced `{ ... }` pair, both braces included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Offset of the opening brace.
    pub start: usize,
    /// Offset one past the closing brace.
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The spanned text, or `""` when the span does not fit `text`.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }

    /// Whether `other` lies strictly inside this span.
    #[must_use]
    pub fn contains(&self, other: &Span) -> bool {
        self.start < other.start && other.end < self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// A block as found in the text, before colors are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    pub name: String,
    /// Byte offset of the first character of `name`.
    pub name_offset: usize,
    /// `key = value` pairs in source order. Values are kept verbatim
    /// (quotes and `word { ... }` groups included).
    pub attributes: Vec<(String, String)>,
    /// Bare tokens and nameless `{ ... }` groups.
    pub values: Vec<String>,
    pub children: Vec<RawBlock>,
    pub span: Span,
    pub comment: Option<String>,
}

impl RawBlock {
    /// First attribute value for `key`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&RawBlock> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Which words count as block names.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierSyntax {
    accepts_char: fn(char) -> bool,
}

impl IdentifierSyntax {
    /// `[A-Za-z0-9_]+`
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            accepts_char: standard_char,
        }
    }

    /// Standard characters plus `.`, `:`, `@`, `-` and `'`.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            accepts_char: permissive_char,
        }
    }

    /// Caller-supplied character predicate.
    #[must_use]
    pub const fn custom(accepts_char: fn(char) -> bool) -> Self {
        Self { accepts_char }
    }

    #[must_use]
    pub fn accepts(&self, word: &str) -> bool {
        !word.is_empty() && word.chars().all(self.accepts_char)
    }
}

fn standard_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn permissive_char(c: char) -> bool {
    standard_char(c) || matches!(c, '.' | ':' | '@' | '-' | '\'')
}

impl Default for IdentifierSyntax {
    fn default() -> Self {
        Self::standard()
    }
}

/// Stateless scanner, cheap to copy and safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockScanner {
    syntax: IdentifierSyntax,
}

impl BlockScanner {
    #[must_use]
    pub const fn new(syntax: IdentifierSyntax) -> Self {
        Self { syntax }
    }

    #[must_use]
    pub const fn syntax(&self) -> IdentifierSyntax {
        self.syntax
    }

    /// Lazily scan the top-level blocks of `text`.
    ///
    /// The iterator stops after the first error. A clone continues
    /// independently from the same position; call `scan_blocks` again to
    /// start over.
    #[must_use]
    pub fn scan_blocks<'a>(&self, text: &'a str) -> Blocks<'a> {
        Blocks {
            parser: Parser {
                text,
                syntax: self.syntax,
            },
            lexer: Lexer::new(text),
            finished: false,
        }
    }

    /// Scan every top-level block, failing on the first structural error.
    pub fn scan_all(&self, text: &str) -> Result<Vec<RawBlock>, ScanError> {
        self.scan_blocks(text).collect()
    }

    /// Scan the whole text as the body of an unnamed root block.
    ///
    /// Unlike [`scan_blocks`](Self::scan_blocks) this keeps top-level
    /// attributes and values, which list-style files such as
    /// `TAG = "path"` tables need.
    pub fn scan_document(&self, text: &str) -> Result<RawBlock, ScanError> {
        let parser = Parser {
            text,
            syntax: self.syntax,
        };
        let mut lexer = Lexer::new(text);
        let body = parser.parse_body(&mut lexer, None)?;
        Ok(RawBlock {
            name: String::new(),
            name_offset: 0,
            attributes: body.attributes,
            values: body.values,
            children: body.children,
            span: Span::new(0, text.len()),
            comment: None,
        })
    }
}

/// Iterator over top-level blocks, see [`BlockScanner::scan_blocks`].
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    parser: Parser<'a>,
    lexer: Lexer<'a>,
    finished: bool,
}

impl Iterator for Blocks<'_> {
    type Item = Result<RawBlock, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_block();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

impl Blocks<'_> {
    fn next_block(&mut self) -> Option<Result<RawBlock, ScanError>> {
        loop {
            let token = self.lexer.next_token()?;
            if token.kind == TokenKind::Close {
                return Some(Err(self.parser.unbalanced(token.start, BraceFault::Unopened)));
            }
            let mut scratch = Body::default();
            if let Err(err) = self.parser.parse_item(token, &mut self.lexer, &mut scratch) {
                return Some(Err(err));
            }
            if let Some(block) = scratch.children.pop() {
                return Some(Ok(block));
            }
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, Default)]
struct Body {
    attributes: Vec<(String, String)>,
    values: Vec<String>,
    children: Vec<RawBlock>,
    end: usize,
}

#[derive(Debug, Clone, Copy)]
struct Parser<'a> {
    text: &'a str,
    syntax: IdentifierSyntax,
}

impl<'a> Parser<'a> {
    fn slice(&self, token: Token) -> &'a str {
        &self.text[token.start..token.end]
    }

    fn unbalanced(&self, offset: usize, fault: BraceFault) -> ScanError {
        ScanError::UnbalancedBraces {
            offset,
            line: line_of(self.text, offset),
            fault,
        }
    }

    /// Parse up to the brace closing `open`, or to end of text when `open` is `None`.
    fn parse_body(&self, lexer: &mut Lexer<'a>, open: Option<usize>) -> Result<Body, ScanError> {
        let mut body = Body::default();
        loop {
            let Some(token) = lexer.next_token() else {
                return match open {
                    Some(offset) => Err(self.unbalanced(offset, BraceFault::Unclosed)),
                    None => {
                        body.end = self.text.len();
                        Ok(body)
                    }
                };
            };
            if token.kind == TokenKind::Close {
                return match open {
                    Some(_) => {
                        body.end = token.end;
                        Ok(body)
                    }
                    None => Err(self.unbalanced(token.start, BraceFault::Unopened)),
                };
            }
            self.parse_item(token, lexer, &mut body)?;
        }
    }

    /// Parse one body item starting at `token` (never a closing brace).
    fn parse_item(
        &self,
        token: Token,
        lexer: &mut Lexer<'a>,
        body: &mut Body,
    ) -> Result<(), ScanError> {
        match token.kind {
            TokenKind::Open => {
                let group = self.parse_body(lexer, Some(token.start))?;
                body.values.push(self.text[token.start..group.end].to_string());
            }
            TokenKind::Word | TokenKind::Quoted => {
                if lexer.next_if(TokenKind::Equals).is_some() {
                    self.parse_assignment(token, lexer, body)?;
                } else {
                    body.values.push(self.slice(token).to_string());
                }
            }
            // stray '='
            TokenKind::Equals | TokenKind::Close => {}
        }
        Ok(())
    }

    fn parse_assignment(
        &self,
        key: Token,
        lexer: &mut Lexer<'a>,
        body: &mut Body,
    ) -> Result<(), ScanError> {
        let key_text = self.slice(key);
        let Some(next) = lexer.peek() else {
            body.attributes.push((key_text.to_string(), String::new()));
            return Ok(());
        };

        match next.kind {
            TokenKind::Open => {
                lexer.next_token();
                if key.kind == TokenKind::Word && self.syntax.accepts(key_text) {
                    let block = self.parse_block(key, next, lexer)?;
                    body.children.push(block);
                } else {
                    let group = self.parse_body(lexer, Some(next.start))?;
                    body.attributes
                        .push((key_text.to_string(), self.text[next.start..group.end].to_string()));
                }
            }
            TokenKind::Word | TokenKind::Quoted => {
                lexer.next_token();
                // `rgb { ... }`, `hsv { ... }` and similar tagged groups
                let tagged_group = if next.kind == TokenKind::Word {
                    lexer.next_if(TokenKind::Open)
                } else {
                    None
                };
                let end = match tagged_group {
                    Some(open) => self.parse_body(lexer, Some(open.start))?.end,
                    None => next.end,
                };
                body.attributes
                    .push((key_text.to_string(), self.text[next.start..end].to_string()));
            }
            // `key =` followed by `=` or `}`: keep the key, leave the token
            TokenKind::Equals | TokenKind::Close => {
                body.attributes.push((key_text.to_string(), String::new()));
            }
        }
        Ok(())
    }

    fn parse_block(
        &self,
        name: Token,
        open: Token,
        lexer: &mut Lexer<'a>,
    ) -> Result<RawBlock, ScanError> {
        let body = self.parse_body(lexer, Some(open.start))?;
        Ok(RawBlock {
            name: self.slice(name).to_string(),
            name_offset: name.start,
            attributes: body.attributes,
            values: body.values,
            children: body.children,
            span: Span::new(open.start, body.end),
            comment: leading_comment(self.text, name.start),
        })
    }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

// ============================================================================
// Lexing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Quoted,
    Equals,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.clone().next_token()
    }

    /// Consume the next token only if it is of `kind`.
    fn next_if(&mut self, kind: TokenKind) -> Option<Token> {
        let token = self.peek().filter(|t| t.kind == kind)?;
        self.pos = token.end;
        Some(token)
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        let start = self.pos;
        let rest = &self.text[start..];
        let kind = match rest.chars().next()? {
            '{' => TokenKind::Open,
            '}' => TokenKind::Close,
            '=' => TokenKind::Equals,
            '"' => TokenKind::Quoted,
            _ => TokenKind::Word,
        };
        let len = match kind {
            TokenKind::Quoted => quoted_len(rest),
            TokenKind::Word => word_len(rest),
            _ => 1,
        };
        self.pos = start + len;
        Some(Token {
            kind,
            start,
            end: self.pos,
        })
    }

    /// Skip whitespace, BOMs and `#` comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = &self.text[self.pos..];
            match rest.chars().next() {
                Some(c) if is_blank(c) => self.pos += c.len_utf8(),
                Some('#') => {
                    let pos = self.pos;
                    self.pos = rest.find('\n').map_or(self.text.len(), |n| pos + n + 1);
                }
                _ => return,
            }
        }
    }
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn quoted_len(rest: &str) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    rest.len()
}

/// Words run until whitespace or punctuation. `=` ends a word unless it
/// completes a comparison operator such as `>=` or `!=`.
fn word_len(rest: &str) -> usize {
    let mut prev = None;
    for (i, c) in rest.char_indices() {
        let ends = is_blank(c)
            || matches!(c, '{' | '}' | '#' | '"')
            || (c == '=' && !matches!(prev, Some('<' | '>' | '!' | '?')));
        if ends {
            return i;
        }
        prev = Some(c);
    }
    rest.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<RawBlock> {
        BlockScanner::default().scan_all(text).unwrap()
    }

    #[test]
    fn test_nested_block() {
        let text = "culture = { ruman = { color = rgb { 10 20 30 } } }";
        let blocks = scan(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "culture");
        assert_eq!(blocks[0].children.len(), 1);

        let ruman = &blocks[0].children[0];
        assert_eq!(ruman.name, "ruman");
        assert_eq!(ruman.attribute("color"), Some("rgb { 10 20 30 }"));
        assert!(blocks[0].span.contains(&ruman.span));
    }

    #[test]
    fn test_span_covers_braces() {
        let text = "a = { b = c }\nd = { }";
        let blocks = scan(text);
        assert_eq!(blocks[0].span.slice(text), "{ b = c }");
        assert_eq!(blocks[1].span.slice(text), "{ }");
        assert_eq!(blocks[1].name_offset, 14);
    }

    #[test]
    fn test_empty_block() {
        let blocks = scan("empty = { }");
        assert_eq!(blocks[0].name, "empty");
        assert!(blocks[0].attributes.is_empty());
        assert!(blocks[0].children.is_empty());
        assert!(blocks[0].values.is_empty());
    }

    #[test]
    fn test_nameless_list_values() {
        let blocks = scan("x = { tags = { a b \"c d\" } }");
        let tags = blocks[0].child("tags").unwrap();
        assert_eq!(tags.values, vec!["a", "b", "\"c d\""]);
    }

    #[test]
    fn test_braces_in_comments_and_strings_are_ignored() {
        let text = "a = {\n  # { not a brace\n  name = \"}\"\n}\nb = { }";
        let blocks = scan(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].attribute("name"), Some("\"}\""));
    }

    #[test]
    fn test_bom_is_whitespace() {
        let blocks = scan("\u{feff}roman = { a = b }");
        assert_eq!(blocks[0].name, "roman");
    }

    #[test]
    fn test_unclosed_brace() {
        let text = "a = { b = { }";
        let err = BlockScanner::default().scan_all(text).unwrap_err();
        assert_eq!(
            err,
            ScanError::UnbalancedBraces {
                offset: 4,
                line: 1,
                fault: BraceFault::Unclosed,
            }
        );
    }

    #[test]
    fn test_stray_closing_brace() {
        let text = "a = { }\n}\n";
        let mut blocks = BlockScanner::default().scan_blocks(text);
        assert!(blocks.next().unwrap().is_ok());
        let err = blocks.next().unwrap().unwrap_err();
        assert_eq!(
            err,
            ScanError::UnbalancedBraces {
                offset: 8,
                line: 2,
                fault: BraceFault::Unopened,
            }
        );
        assert!(blocks.next().is_none());
    }

    #[test]
    fn test_iterator_is_lazy_and_clonable() {
        let text = "a = { } b = { } c = { }";
        let mut blocks = BlockScanner::default().scan_blocks(text);
        assert_eq!(blocks.next().unwrap().unwrap().name, "a");
        let names: Vec<String> = blocks.clone().map(|b| b.unwrap().name).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(blocks.next().unwrap().unwrap().name, "b");
    }

    #[test]
    fn test_non_identifier_key_becomes_attribute() {
        let text = "x = { some.key = { 1 2 } }";
        let blocks = scan(text);
        assert!(blocks[0].children.is_empty());
        assert_eq!(blocks[0].attribute("some.key"), Some("{ 1 2 }"));

        let permissive = BlockScanner::new(IdentifierSyntax::permissive())
            .scan_all(text)
            .unwrap();
        assert_eq!(permissive[0].children[0].name, "some.key");
    }

    #[test]
    fn test_top_level_assignments_are_skipped() {
        let blocks = scan("ROM = \"countries/rome.txt\"\nfoo = { }\nbar = rgb { 1 2 3 }");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "foo");
    }

    #[test]
    fn test_scan_document_keeps_top_level_attributes() {
        let doc = BlockScanner::default()
            .scan_document("ROM = \"countries/rome.txt\"\nfoo = { }")
            .unwrap();
        assert_eq!(doc.attribute("ROM"), Some("\"countries/rome.txt\""));
        assert_eq!(doc.children[0].name, "foo");
    }

    #[test]
    fn test_comparison_operators() {
        let blocks = scan("t = { age >= 16 }");
        assert_eq!(blocks[0].values, vec!["age", ">=", "16"]);
    }

    #[test]
    fn test_leading_comment_attached() {
        let text = "# Roman culture\nroman = { }";
        assert_eq!(scan(text)[0].comment.as_deref(), Some("Roman culture"));
    }

    #[test]
    fn test_same_line_sibling_has_no_comment() {
        let blocks = scan("# Roman culture\nroman = { } etruscan = { }");
        assert_eq!(blocks[0].comment.as_deref(), Some("Roman culture"));
        assert_eq!(blocks[1].name, "etruscan");
        assert_eq!(blocks[1].comment, None);
    }

    #[test]
    fn test_line_of() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
