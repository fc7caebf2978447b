// Copyright (c) 2026 rezky_nightky

use std::env;

use crossterm::style::Color;

use crate::canvas::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn from_flag(v: u16) -> Option<Self> {
        match v {
            0 => Some(ColorMode::Mono),
            16 => Some(ColorMode::Color16),
            8 | 256 => Some(ColorMode::Color256),
            24 | 32 => Some(ColorMode::TrueColor),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let d = |i: usize| a[i] as i32 - b[i] as i32;
    d(0) * d(0) + d(1) * d(1) + d(2) * d(2)
}

pub fn rgb_to_ansi256(c: Rgb) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let q = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (q(c[0]), q(c[1]), q(c[2]));
    let cube = [
        LEVELS[r6 as usize],
        LEVELS[g6 as usize],
        LEVELS[b6 as usize],
    ];
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((c[0] as u16 + c[1] as u16 + c[2] as u16) / 3) as u8;
    let (grey_idx, grey) = match avg {
        0..=7 => (16, [0, 0, 0]),
        239..=255 => (231, [255, 255, 255]),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, [v, v, v])
        }
    };

    if dist2(c, grey) < dist2(c, cube) {
        grey_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, [0, 0, 0]),
        (Color::DarkGrey, [128, 128, 128]),
        (Color::Grey, [192, 192, 192]),
        (Color::White, [255, 255, 255]),
        (Color::DarkRed, [128, 0, 0]),
        (Color::Red, [255, 0, 0]),
        (Color::DarkGreen, [0, 128, 0]),
        (Color::Green, [0, 255, 0]),
        (Color::DarkBlue, [0, 0, 128]),
        (Color::Blue, [0, 0, 255]),
        (Color::DarkCyan, [0, 128, 128]),
        (Color::Cyan, [0, 255, 255]),
        (Color::DarkMagenta, [128, 0, 128]),
        (Color::Magenta, [255, 0, 255]),
        (Color::DarkYellow, [128, 128, 0]),
        (Color::Yellow, [255, 255, 0]),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

pub fn to_term_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::Color16 => Some(rgb_to_color16(c)),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c[0],
            g: c[1],
            b: c[2],
        }),
    }
}

const MONO_RAMP: [char; 5] = [' ', '.', ':', '+', '*'];

pub fn mono_glyph(top: Rgb, bottom: Rgb) -> char {
    let luma = |c: Rgb| (c[0] as u32 * 299 + c[1] as u32 * 587 + c[2] as u32 * 114) / 1000;
    let l = luma(top).max(luma(bottom)) as usize;
    // the night gradient stays blank
    if l < 48 {
        return MONO_RAMP[0];
    }
    let i = 1 + (l - 48) * (MONO_RAMP.len() - 1) / (256 - 48);
    MONO_RAMP[i.min(MONO_RAMP.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colormode_flag_values() {
        assert_eq!(ColorMode::from_flag(0), Some(ColorMode::Mono));
        assert_eq!(ColorMode::from_flag(16), Some(ColorMode::Color16));
        assert_eq!(ColorMode::from_flag(8), Some(ColorMode::Color256));
        assert_eq!(ColorMode::from_flag(256), Some(ColorMode::Color256));
        assert_eq!(ColorMode::from_flag(24), Some(ColorMode::TrueColor));
        assert_eq!(ColorMode::from_flag(32), Some(ColorMode::TrueColor));
        assert_eq!(ColorMode::from_flag(7), None);
    }

    #[test]
    fn ansi256_picks_cube_and_grey() {
        assert_eq!(rgb_to_ansi256([0, 0, 0]), 16);
        assert_eq!(rgb_to_ansi256([255, 255, 255]), 231);
        assert_eq!(rgb_to_ansi256([255, 0, 0]), 196);
        assert_eq!(rgb_to_ansi256([128, 128, 128]), 244);
        // deep blue of the sky gradient lands in the cube
        assert_eq!(rgb_to_ansi256([20, 30, 140]), 25);
    }

    #[test]
    fn color16_nearest() {
        assert_eq!(rgb_to_color16([250, 250, 250]), Color::White);
        assert_eq!(rgb_to_color16([220, 45, 60]), Color::Red);
        assert_eq!(rgb_to_color16([5, 5, 20]), Color::Black);
    }

    #[test]
    fn term_color_per_mode() {
        let c = [20, 30, 140];
        assert_eq!(to_term_color(c, ColorMode::Mono), None);
        assert_eq!(
            to_term_color(c, ColorMode::TrueColor),
            Some(Color::Rgb {
                r: 20,
                g: 30,
                b: 140
            })
        );
        assert_eq!(
            to_term_color(c, ColorMode::Color256),
            Some(Color::AnsiValue(25))
        );
    }

    #[test]
    fn mono_ramp_tracks_brightness() {
        assert_eq!(mono_glyph([0, 0, 0], [20, 30, 140]), ' ');
        assert_eq!(mono_glyph([255, 255, 255], [0, 0, 0]), '*');
        assert_eq!(mono_glyph([0, 0, 0], [60, 60, 60]), '.');
    }
}
