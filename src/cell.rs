// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

// Upper half block: `fg` paints the top dot, `bg` the bottom one.
pub const HALF_BLOCK: char = '▀';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
    };

    pub fn half_block(top: Color, bottom: Color) -> Self {
        Self {
            ch: HALF_BLOCK,
            fg: Some(top),
            bg: Some(bottom),
        }
    }
}
