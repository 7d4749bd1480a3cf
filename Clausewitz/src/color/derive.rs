//! Color space conversion and color derivation

use super::{Color, DERIVED_SATURATION, DERIVED_VALUE};

/// Convert any color to 8-bit RGB.
///
/// HSV hue above `1.0` is taken as degrees, anything else as a unit fraction:
/// `0.5` and `180` are both 180°, `1.5` is 1.5°. Channels are rounded half
/// to even at the final multiply by 255.
#[must_use]
pub fn to_rgb8(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb8(r, g, b) => (r, g, b),
        Color::Hsv(h, s, v) => {
            let (r, g, b) = hsv_to_rgb(normalize_hue(h), s.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
            (to_channel(r), to_channel(g), to_channel(b))
        }
    }
}

/// HSV components of a color, hue as a unit fraction.
#[must_use]
pub fn to_hsv(color: Color) -> (f64, f64, f64) {
    match color {
        Color::Rgb8(r, g, b) => rgb_to_hsv(r, g, b),
        Color::Hsv(h, s, v) => (normalize_hue(h), s, v),
    }
}

/// Convert 8-bit RGB to HSV (all components in `0..=1`, hue in `0..1`).
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, v);
    }

    let range = max - min;
    let s = range / max;
    let rc = (max - r) / range;
    let gc = (max - g) / range;
    let bc = (max - b) / range;

    let h = if r >= max {
        bc - gc
    } else if g >= max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    ((h / 6.0).rem_euclid(1.0), s, v)
}

/// Shift the hue of `base` by `index * factor` turns without quantizing.
///
/// Saturation and value are kept. The returned hue is in `0..1`.
#[must_use]
pub fn rotate_hsv(base: Color, index: u32, factor: f64) -> (f64, f64, f64) {
    let (h, s, v) = to_hsv(base);
    let h = (h + f64::from(index) * factor).rem_euclid(1.0);
    (h, s, v)
}

/// Hue-rotated sibling of `base`, as RGB.
///
/// Deterministic in `(base, index, factor)`. Index 0 gives back the base color.
#[must_use]
pub fn hue_rotate(base: Color, index: u32, factor: f64) -> Color {
    let (h, s, v) = rotate_hsv(base, index, factor);
    let (r, g, b) = to_rgb8(Color::Hsv(h, s, v));
    Color::Rgb8(r, g, b)
}

/// Stable color for an entity that has none of its own.
///
/// Hue is the sum of the name's character codes modulo 360, saturation and
/// value are fixed.
#[must_use]
pub fn derive_color_from_name(name: &str) -> Color {
    let sum: u64 = name.chars().map(|c| u64::from(u32::from(c))).sum();
    let hue = (sum % 360) as f64 / 360.0;
    Color::Hsv(hue, DERIVED_SATURATION, DERIVED_VALUE)
}

fn normalize_hue(h: f64) -> f64 {
    if h > 1.0 { h / 360.0 } else { h }
}

fn to_channel(x: f64) -> u8 {
    (x * 255.0).round_ties_even().clamp(0.0, 255.0) as u8
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s <= 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
