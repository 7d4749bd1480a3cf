//! Color model for script files
//!
//! Three encodings show up on disk:
//!
//! - `rgb { 10 20 30 }` - integer channels in `0..=255`
//! - `hsv { 0.5 0.4 0.8 }` - hue as a unit fraction or in degrees, saturation/value in `0..=1`
//! - `{ 0.4 0.6 0.8 }` - a bare float triplet whose scale has to be guessed
//!
//! The bare triplet is never stored as a [`Color`]. It is read into a
//! [`RawFloatTriplet`] and classified on the spot, so every `Color` in the
//! program is either [`Color::Rgb8`] or [`Color::Hsv`].

mod codec;
mod derive;

pub use codec::{parse_color, parse_color_value, render};
pub use derive::{derive_color_from_name, hue_rotate, rgb_to_hsv, rotate_hsv, to_hsv, to_rgb8};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Saturation used for colors derived from a name.
pub const DERIVED_SATURATION: f64 = 0.55;

/// Value (brightness) used for colors derived from a name.
pub const DERIVED_VALUE: f64 = 0.72;

/// A classified color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Color {
    /// 8-bit RGB channels.
    Rgb8(u8, u8, u8),
    /// Hue, saturation, value. Hue above `1.0` is read as degrees.
    Hsv(f64, f64, f64),
}

impl Color {
    /// RGB channels of this color.
    #[must_use]
    pub fn rgb8(self) -> (u8, u8, u8) {
        to_rgb8(self)
    }

    /// Lowercase `rrggbb` hex string, as used by named location files.
    #[must_use]
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.rgb8();
        format!("{r:02x}{g:02x}{b:02x}")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render(*self))
    }
}

/// A bare `{ a b c }` float triplet before its scale is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFloatTriplet(pub f64, pub f64, pub f64);

impl RawFloatTriplet {
    /// Decide the scale and produce an RGB color.
    ///
    /// If every channel is `<= 1.0` the triplet is normalized RGB and gets
    /// multiplied by 255, otherwise it is already on the 0-255 scale. Both
    /// paths round half up.
    pub fn classify(self) -> Result<Color, ParseError> {
        let Self(a, b, c) = self;
        let normalized = a.max(b).max(c) <= 1.0;
        let scale = if normalized { 255.0 } else { 1.0 };

        let channel = |x: f64| -> Result<u8, ParseError> {
            if !x.is_finite() || x < 0.0 {
                return Err(ParseError::malformed(x.to_string()));
            }
            let scaled = (x * scale).round();
            if scaled > 255.0 {
                return Err(ParseError::malformed(x.to_string()));
            }
            Ok(scaled as u8)
        };

        Ok(Color::Rgb8(channel(a)?, channel(b)?, channel(c)?))
    }
}
