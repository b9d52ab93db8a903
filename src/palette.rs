// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::charset::RAMP_LEN;
use crate::runtime::{ColorMode, ColorScheme};

#[derive(Clone, Debug)]
pub struct Palette {
    pub colors: Vec<Color>,
    pub bg: Option<Color>,
}

/// Everything the presenter needs to turn a quantized pixel level into a
/// cell: glyph ramp, color ramp and the color mode gate.
#[derive(Clone, Debug)]
pub struct RenderStyle {
    pub ramp: [char; RAMP_LEN],
    pub palette: Palette,
    pub color_mode: ColorMode,
}

impl RenderStyle {
    pub fn fg_for_level(&self, level: usize) -> Option<Color> {
        if self.color_mode == ColorMode::Mono {
            return None;
        }
        self.palette.colors.get(level).copied()
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// Endpoints of each scheme's brightness ramp, dark to bright. Index 0 of
/// the built ramp is never drawn (level 0 is a blank cell) but keeps the
/// ramp aligned with the glyph ramp.
fn scheme_endpoints(scheme: ColorScheme) -> ((u8, u8, u8), (u8, u8, u8)) {
    match scheme {
        ColorScheme::Rain => ((24, 32, 44), (180, 200, 215)),
        ColorScheme::Storm => ((16, 22, 36), (140, 160, 190)),
        ColorScheme::Green => ((0, 48, 0), (150, 255, 150)),
        ColorScheme::Amber => ((60, 38, 0), (255, 200, 90)),
        ColorScheme::Gray => ((40, 40, 40), (235, 235, 235)),
    }
}

fn gradient(from: (u8, u8, u8), to: (u8, u8, u8), n: usize) -> Vec<(u8, u8, u8)> {
    let steps = n.max(2);
    (0..steps)
        .map(|i| {
            let t = i as f32 / (steps - 1) as f32;
            (
                lerp_u8(from.0, to.0, t),
                lerp_u8(from.1, to.1, t),
                lerp_u8(from.2, to.2, t),
            )
        })
        .collect()
}

fn colors_from_rgb(mode: ColorMode, list: &[(u8, u8, u8)]) -> Vec<Color> {
    match mode {
        ColorMode::Mono => vec![Color::White; list.len()],
        ColorMode::TrueColor => list
            .iter()
            .map(|&(r, g, b)| Color::Rgb { r, g, b })
            .collect(),
        ColorMode::Color256 => list
            .iter()
            .map(|&(r, g, b)| Color::AnsiValue(rgb_to_ansi256(r, g, b)))
            .collect(),
    }
}

pub fn build_palette(scheme: ColorScheme, mode: ColorMode, default_background: bool) -> Palette {
    let (from, to) = scheme_endpoints(scheme);
    let colors = colors_from_rgb(mode, &gradient(from, to, RAMP_LEN));
    let bg = if default_background {
        None
    } else {
        Some(Color::Black)
    };
    Palette { colors, bg }
}

pub fn print_list_colors() {
    println!("COLORS:");
    println!("  rain   cool blue-gray (default)");
    println!("  storm  deep slate blue");
    println!("  green  phosphor green");
    println!("  amber  warm monochrome");
    println!("  gray   neutral gray");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_matches_ramp_length() {
        for mode in [ColorMode::Mono, ColorMode::Color256, ColorMode::TrueColor] {
            let p = build_palette(ColorScheme::Rain, mode, false);
            assert_eq!(p.colors.len(), RAMP_LEN);
        }
    }

    #[test]
    fn mono_style_suppresses_foreground() {
        let style = RenderStyle {
            ramp: crate::charset::build_ramp(crate::runtime::GlyphSet::Ascii),
            palette: build_palette(ColorScheme::Rain, ColorMode::Mono, true),
            color_mode: ColorMode::Mono,
        };
        assert_eq!(style.fg_for_level(RAMP_LEN - 1), None);
    }

    #[test]
    fn ansi256_maps_extremes_into_gray_ramp() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }
}
