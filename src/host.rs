// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::surface::{SurfaceError, SurfaceHost};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pane {
    pub col: u16,
    pub cols: u16,
    pub rows: u16,
}

#[derive(Clone, Debug)]
pub struct TerminalHost {
    ids: Vec<String>,
    cols: u16,
    rows: u16,
    dot_size: f64,
}

impl TerminalHost {
    pub fn new(ids: Vec<String>, cols: u16, rows: u16, dot_size: f64) -> Self {
        Self {
            ids,
            cols,
            rows,
            dot_size,
        }
    }

    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn pane(&self, id: &str) -> Option<Pane> {
        let i = self.ids.iter().position(|s| s == id)?;
        let n = self.ids.len() as u16;
        let each = self.cols / n.max(1);
        let col = each.saturating_mul(i as u16);
        let cols = if i + 1 == self.ids.len() {
            self.cols.saturating_sub(col)
        } else {
            each
        };
        Some(Pane {
            col,
            cols,
            rows: self.rows,
        })
    }
}

impl SurfaceHost for TerminalHost {
    type Surface = Canvas;

    fn discover(&self) -> Vec<String> {
        self.ids.clone()
    }

    fn acquire(&mut self, id: &str) -> Result<Canvas, SurfaceError> {
        let pane = self
            .pane(id)
            .ok_or_else(|| SurfaceError::NotFound(id.to_string()))?;
        if pane.cols == 0 || pane.rows == 0 {
            return Err(SurfaceError::Unavailable {
                id: id.to_string(),
                reason: format!("pane is {}x{} cells", pane.cols, pane.rows),
            });
        }
        Ok(Canvas::new(
            pane.cols as usize,
            pane.rows as usize * 2,
            self.dot_size,
        ))
    }
}
