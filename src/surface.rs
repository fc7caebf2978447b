// Copyright (c) 2026 rezky_nightky

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub from: Point,
    pub to: Point,
    stops: Vec<(f64, Rgba)>,
}

impl LinearGradient {
    pub fn new(from: Point, to: Point) -> Self {
        Self {
            from,
            to,
            stops: Vec::new(),
        }
    }

    pub fn with_stop(mut self, offset: f64, color: Rgba) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(at, (offset, color));
        self
    }

    #[cfg(test)]
    pub fn stops(&self) -> &[(f64, Rgba)] {
        &self.stops
    }

    pub fn progress(&self, p: Point) -> f64 {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        let len2 = dx * dx + dy * dy;
        if len2 <= f64::EPSILON {
            return 0.0;
        }
        (((p.x - self.from.x) * dx + (p.y - self.from.y) * dy) / len2).clamp(0.0, 1.0)
    }

    pub fn color_at(&self, t: f64) -> Rgba {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba::rgb(0, 0, 0).with_alpha(0.0);
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = o1 - o0;
                let k = if span <= f64::EPSILON { 1.0 } else { (t - o0) / span };
                return Rgba {
                    r: lerp_u8(c0.r, c1.r, k),
                    g: lerp_u8(c0.g, c1.g, k),
                    b: lerp_u8(c0.b, c1.b, k),
                    a: c0.a + (c1.a - c0.a) * k,
                };
            }
        }
        last.1
    }

    pub fn sample(&self, p: Point) -> Rgba {
        self.color_at(self.progress(p))
    }
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let a = a as f64;
    let b = b as f64;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear(LinearGradient),
}

impl Paint {
    pub fn color_at(&self, p: Point) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear(g) => g.sample(p),
        }
    }
}

pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba);
    fn fill_rect(&mut self, rect: Rect, paint: &Paint);
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("no drawing surface with id `{0}`")]
    NotFound(String),
    #[error("drawing surface `{id}` is unavailable: {reason}")]
    Unavailable { id: String, reason: String },
}

pub trait SurfaceHost {
    type Surface: Surface;

    fn discover(&self) -> Vec<String>;
    fn acquire(&mut self, id: &str) -> Result<Self::Surface, SurfaceError>;
}
