// Copyright (c) 2026 rezky_nightky

use crate::runtime::GlyphSet;

/// Number of brightness levels in a glyph ramp. Palettes are built to the
/// same length so a quantized pixel indexes both in lockstep.
pub const RAMP_LEN: usize = 6;

const BLOCKS: [char; RAMP_LEN] = [' ', '\u{00b7}', '\u{2591}', '\u{2592}', '\u{2593}', '\u{2588}'];
const ASCII: [char; RAMP_LEN] = [' ', '.', ':', '+', '#', '@'];

pub fn build_ramp(set: GlyphSet) -> [char; RAMP_LEN] {
    match set {
        GlyphSet::Blocks => BLOCKS,
        GlyphSet::Ascii => ASCII,
    }
}

/// `auto` follows the locale: non-UTF LANG gets the ASCII ramp.
pub fn glyph_set_from_str(s: &str, default_ascii: bool) -> Result<GlyphSet, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if default_ascii {
            GlyphSet::Ascii
        } else {
            GlyphSet::Blocks
        }),
        "blocks" | "unicode" => Ok(GlyphSet::Blocks),
        "ascii" => Ok(GlyphSet::Ascii),
        other => Err(format!(
            "invalid charset: {} (allowed: auto, blocks, ascii)",
            other
        )),
    }
}

pub fn print_list_charsets() {
    println!("CHARSETS:");
    println!("  auto    locale-dependent (blocks on UTF terminals, else ascii)");
    println!("  blocks  {}", BLOCKS.iter().collect::<String>().trim());
    println!("  ascii   {}", ASCII.iter().collect::<String>().trim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_start_blank_and_share_length() {
        assert_eq!(build_ramp(GlyphSet::Blocks)[0], ' ');
        assert_eq!(build_ramp(GlyphSet::Ascii)[0], ' ');
        assert_eq!(build_ramp(GlyphSet::Blocks).len(), RAMP_LEN);
    }

    #[test]
    fn auto_respects_ascii_default() {
        assert_eq!(glyph_set_from_str("auto", true).unwrap(), GlyphSet::Ascii);
        assert_eq!(glyph_set_from_str("auto", false).unwrap(), GlyphSet::Blocks);
        assert!(glyph_set_from_str("nope", false).is_err());
    }
}
