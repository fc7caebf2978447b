// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::palette::{mono_glyph, to_term_color, ColorMode};

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    // Copies a canvas into the frame starting at column `col`, two dot rows
    // per cell row. Dots past the frame edge are dropped.
    pub fn blit(&mut self, canvas: &Canvas, col: u16, mode: ColorMode) {
        let cols = canvas.dots_w().min(self.width.saturating_sub(col) as usize);
        let rows = canvas.dots_h().div_ceil(2).min(self.height as usize);
        for cy in 0..rows {
            for cx in 0..cols {
                let top = canvas.pixel(cx, cy * 2).unwrap_or([0, 0, 0]);
                let bottom = canvas.pixel(cx, cy * 2 + 1).unwrap_or([0, 0, 0]);
                let cell = match (to_term_color(top, mode), to_term_color(bottom, mode)) {
                    (Some(t), Some(b)) => Cell::half_block(t, b),
                    _ => Cell {
                        ch: mono_glyph(top, bottom),
                        ..Cell::BLANK
                    },
                };
                self.set(col + cx as u16, cy as u16, cell);
            }
        }
    }
}
