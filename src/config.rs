// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  rainstrix --color rain --color-bg black --charset auto --fps 60 --density 1 --windmax 0.35 --windms 1500,3200 --ripplepct 3.5";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Clone, Copy, Debug)]
pub struct U16Range {
    pub low: u16,
    pub high: u16,
}

impl FromStr for U16Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: NUM1,NUM2".to_string())?;
        let low: u16 = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let high: u16 = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if low == 0 || high == 0 || low > high {
            return Err("range must be >0 and low <= high".to_string());
        }
        Ok(Self { low, high })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rainstrix", version)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        default_value = "rain",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,8,24). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Glyph ramp (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "sprite",
        help_heading = "APPEARANCE",
        help = "Optional droplet image; falls back to pixel streaks when missing"
    )]
    pub sprite: Option<PathBuf>,

    #[arg(
        short = 'd',
        long = "density",
        default_value_t = 1.0,
        help_heading = "PERFORMANCE",
        help = "Droplet density multiplier (min 0.01 max 5.0)"
    )]
    pub density: f32,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        short = 'w',
        long = "windmax",
        default_value_t = 0.35,
        help_heading = "SIMULATION",
        help = "Wind target magnitude (min 0 max 1)"
    )]
    pub windmax: f32,

    #[arg(
        long = "windms",
        default_value = "1500,3200",
        help_heading = "SIMULATION",
        help = "Wind retarget interval range in ms: LOW,HIGH (min 1 max 60000)"
    )]
    pub windms: U16Range,

    #[arg(
        short = 'r',
        long = "ripplepct",
        default_value_t = 3.5,
        help_heading = "SIMULATION",
        help = "Ripple chance per impact in percent (min 0 max 100)"
    )]
    pub ripplepct: f32,

    #[arg(
        long = "seed",
        help_heading = "SIMULATION",
        help = "Seed the simulation for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "reduced-motion",
        help_heading = "GENERAL",
        help = "Reduced motion: disable the effect entirely"
    )]
    pub reduced_motion: bool,

    #[arg(
        long = "alt-scene",
        help_heading = "GENERAL",
        help = "Host flag: an alternate backdrop is active, keep the rain off"
    )]
    pub alt_scene: bool,

    #[arg(long = "list-colors", help_heading = "HELP", help = "List color themes")]
    pub list_colors: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List glyph ramps"
    )]
    pub list_charsets: bool,

    #[arg(long = "info", help_heading = "HELP", help = "Print build information")]
    pub info: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_range_parses_and_validates() {
        let r: U16Range = "1500,3200".parse().unwrap();
        assert_eq!((r.low, r.high), (1500, 3200));

        assert!("3200,1500".parse::<U16Range>().is_err());
        assert!("0,10".parse::<U16Range>().is_err());
        assert!("nope".parse::<U16Range>().is_err());
    }

    #[test]
    fn defaults_leave_the_effect_enabled() {
        let args = Args::parse_from(["rainstrix"]);
        assert!(!args.reduced_motion);
        assert!(!args.alt_scene);
        assert_eq!(args.color, "rain");
        assert_eq!(args.charset, "auto");
    }
}
