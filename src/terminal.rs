// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

struct Screen {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    screen: Option<Screen>,
    run_buf: String,
    rows: Vec<Vec<usize>>,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            screen: None,
            run_buf: String::with_capacity(64),
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    // Writes the frame's changes. Everything is redrawn when the size
    // changed, the frame is fully dirty, or a third of it changed.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = self
            .screen
            .as_ref()
            .map(|s| s.width != frame.width || s.height != frame.height)
            .unwrap_or(true);
        let total = frame.width as usize * frame.height as usize;
        let large = total > 0 && frame.dirty_indices().len() >= total / 3;

        if resized {
            self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
            self.screen = Some(Screen {
                width: frame.width,
                height: frame.height,
                cells: vec![Cell::BLANK; total],
            });
        }

        if resized || large || frame.is_dirty_all() {
            self.redraw_all(frame)?;
        } else {
            self.redraw_runs(frame)?;
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn redraw_all(&mut self, frame: &Frame) -> Result<()> {
        let Some(screen) = self.screen.as_mut() else {
            return Ok(());
        };
        let mut pen = Pen::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                screen.cells[idx] = cell;
            }
        }
        Ok(())
    }

    fn redraw_runs(&mut self, frame: &Frame) -> Result<()> {
        let Some(screen) = self.screen.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;
        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.rows.get_mut(idx / width) {
                row.push(idx);
            }
        }

        let mut pen = Pen::default();
        let mut cursor_at: Option<usize> = None;
        for row in self.rows.iter_mut() {
            row.sort_unstable();
            let mut i = 0;
            while i < row.len() {
                let start = row[i];
                let cell = frame.cell_at_index(start);
                i += 1;
                if screen.cells[start] == cell {
                    continue;
                }
                screen.cells[start] = cell;

                self.run_buf.clear();
                self.run_buf.push(cell.ch);
                let mut end = start;
                while i < row.len() && row[i] == end + 1 {
                    let next = frame.cell_at_index(row[i]);
                    if screen.cells[row[i]] == next || next.fg != cell.fg || next.bg != cell.bg {
                        break;
                    }
                    screen.cells[row[i]] = next;
                    self.run_buf.push(next.ch);
                    end = row[i];
                    i += 1;
                }

                if cursor_at != Some(start) {
                    let x = (start % width) as u16;
                    let y = (start / width) as u16;
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                cursor_at = if (end + 1) % width == 0 {
                    None
                } else {
                    Some(end + 1)
                };
            }
            row.clear();
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}
