//! Reading and writing color expressions

use super::{Color, RawFloatTriplet};
use crate::error::ParseError;

/// Find the first `color = ...` assignment in `text` and parse its value.
///
/// The key must be a whole word (`map_color` does not count) and assignments
/// inside `#` comments or quoted strings are ignored. Assignments whose value
/// is not one of the three known forms (for example a named color) are
/// skipped and the search continues.
///
/// # Errors
/// [`ParseError::NotFound`] when there is no usable assignment,
/// [`ParseError::Malformed`] when one is present but a token is bad.
pub fn parse_color(text: &str) -> Result<Color, ParseError> {
    let mut from = 0;
    while let Some(value_start) = find_color_assignment(text, from) {
        match parse_color_value(&text[value_start..]) {
            Err(ParseError::NotFound) => from = value_start,
            other => return other,
        }
    }
    Err(ParseError::NotFound)
}

/// Parse a color value: `rgb { r g b }`, `hsv { h s v }` or a bare `{ a b c }`.
///
/// Only the leading expression is read, trailing text is ignored.
///
/// # Errors
/// [`ParseError::NotFound`] when the text does not start with a color form,
/// [`ParseError::Malformed`] naming the offending token otherwise.
pub fn parse_color_value(value: &str) -> Result<Color, ParseError> {
    let value = value.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let (tag, rest) = split_tag(value);
    let rest = rest.trim_start();

    let Some(body) = rest.strip_prefix('{') else {
        return Err(ParseError::NotFound);
    };
    let Some(close) = body.find('}') else {
        return Err(ParseError::malformed(format!("{tag}{{")));
    };
    let tokens: Vec<&str> = body[..close].split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(ParseError::malformed(body[..close].trim()));
    }

    match tag.to_ascii_lowercase().as_str() {
        "rgb" => {
            let r = parse_byte(tokens[0])?;
            let g = parse_byte(tokens[1])?;
            let b = parse_byte(tokens[2])?;
            Ok(Color::Rgb8(r, g, b))
        }
        "hsv" => {
            let h = parse_unsigned_float(tokens[0])?;
            let s = parse_unit(tokens[1])?;
            let v = parse_unit(tokens[2])?;
            Ok(Color::Hsv(h, s, v))
        }
        "" => {
            let a = parse_unsigned_float(tokens[0])?;
            let b = parse_unsigned_float(tokens[1])?;
            let c = parse_unsigned_float(tokens[2])?;
            RawFloatTriplet(a, b, c).classify()
        }
        _ => Err(ParseError::NotFound),
    }
}

/// Render a color back to script text.
#[must_use]
pub fn render(color: Color) -> String {
    match color {
        Color::Rgb8(r, g, b) => format!("rgb {{ {r} {g} {b} }}"),
        Color::Hsv(h, s, v) => format!("hsv {{ {h} {s} {v} }}"),
    }
}

/// Split an optional leading word (`rgb`, `hsv`, ...) off a value.
fn split_tag(value: &str) -> (&str, &str) {
    let end = value
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(value.len());
    value.split_at(end)
}

fn parse_byte(token: &str) -> Result<u8, ParseError> {
    token
        .parse::<u8>()
        .map_err(|_| ParseError::malformed(token))
}

fn parse_unsigned_float(token: &str) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 => Ok(x),
        _ => Err(ParseError::malformed(token)),
    }
}

fn parse_unit(token: &str) -> Result<f64, ParseError> {
    let x = parse_unsigned_float(token)?;
    if x > 1.0 {
        return Err(ParseError::malformed(token));
    }
    Ok(x)
}

/// Byte offset just past the `=` of the next `color =` at or after `from`.
fn find_color_assignment(text: &str, from: usize) -> Option<usize> {
    const KEY: &str = "color";
    let bytes = text.as_bytes();
    let mut i = from;
    let mut in_comment = false;
    let mut in_string = false;

    while i < bytes.len() {
        let c = bytes[i];
        if in_comment {
            if c == b'\n' {
                in_comment = false;
            }
            i += 1;
            continue;
        }
        if in_string {
            if c == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            b'#' => in_comment = true,
            b'"' => in_string = true,
            _ => {
                let at_word_start = i == 0 || !is_word_byte(bytes[i - 1]);
                if at_word_start
                    && bytes.len() >= i + KEY.len()
                    && bytes[i..i + KEY.len()].eq_ignore_ascii_case(KEY.as_bytes())
                    && bytes.get(i + KEY.len()).is_none_or(|b| !is_word_byte(*b))
                {
                    let mut j = i + KEY.len();
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if bytes.get(j) == Some(&b'=') {
                        return Some(j + 1);
                    }
                }
            }
        }
        i += 1;
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
