//! CLI commands for color expressions

use anyhow::Context;
use clausewitz::color::{
    derive_color_from_name, hue_rotate, parse_color, parse_color_value, render, to_hsv, Color,
};

use crate::cli::progress::PALETTE;

fn read_color(expr: &str) -> anyhow::Result<Color> {
    let parsed = if expr.contains('=') {
        parse_color(expr)
    } else {
        parse_color_value(expr)
    };
    parsed.with_context(|| format!("Could not read a color from '{expr}'"))
}

fn print_color(color: Color) {
    let (r, g, b) = color.rgb8();
    let (h, s, v) = to_hsv(color);
    println!("{PALETTE}{}", render(color));
    println!("  rgb {{ {r} {g} {b} }}");
    println!("  hsv {{ {h:.3} {s:.3} {v:.3} }}");
    println!("  hex {}", color.to_hex());
}

/// Parse and normalize a color expression
pub fn parse(expr: &str) -> anyhow::Result<()> {
    print_color(read_color(expr)?);
    Ok(())
}

/// Print the color derived from a name
pub fn derive(name: &str) {
    print_color(derive_color_from_name(name));
}

/// Print one rotated sibling, or `count` siblings from index 0
pub fn rotate(expr: &str, index: u32, factor: f64, count: Option<u32>) -> anyhow::Result<()> {
    let base = read_color(expr)?;
    match count {
        Some(count) => {
            for i in 0..count {
                let color = hue_rotate(base, i, factor);
                println!("{i:>3}: {}  #{}", render(color), color.to_hex());
            }
        }
        None => print_color(hue_rotate(base, index, factor)),
    }
    Ok(())
}
