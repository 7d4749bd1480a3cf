//! Leading comment association

/// How many lines above a block are inspected for its comment.
pub const MAX_LOOKBACK_LINES: usize = 8;

/// Collect the `#` comment run directly above the line holding `block_start`.
///
/// A block that does not start its line has no leading comment, so in
/// `a = { } b = { }` only `a` can be labelled.
///
/// Blank lines are skipped but still count towards [`MAX_LOOKBACK_LINES`];
/// the first non-comment line ends the run. Fragments are joined with a single
/// space in source order. Runs longer than the window keep only their last
/// lines.
#[must_use]
pub fn leading_comment(text: &str, block_start: usize) -> Option<String> {
    let before = text.get(..block_start)?;
    let line_start = before.rfind('\n')?;
    if !is_blank(&before[line_start + 1..]) {
        return None;
    }
    let above = &before[..line_start];

    let mut fragments: Vec<&str> = Vec::new();
    for line in above.rsplit('\n').take(MAX_LOOKBACK_LINES) {
        let line = line.trim_matches(is_padding);
        if line.is_empty() {
            continue;
        }
        let Some(comment) = line.strip_prefix('#') else {
            break;
        };
        let fragment = comment.trim_start_matches('#').trim();
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }

    if fragments.is_empty() {
        return None;
    }
    fragments.reverse();
    Some(fragments.join(" "))
}

fn is_padding(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn is_blank(text: &str) -> bool {
    text.chars().all(is_padding)
}
