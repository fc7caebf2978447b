// Copyright (c) 2026 rezky_nightky

use crate::surface::{Paint, Point, Rect, Rgba, Surface};

pub type Rgb = [u8; 3];

#[derive(Clone, Debug)]
pub struct Canvas {
    dots_w: usize,
    dots_h: usize,
    dot_size: f64,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(dots_w: usize, dots_h: usize, dot_size: f64) -> Self {
        let dot_size = if dot_size.is_finite() && dot_size > 0.0 {
            dot_size
        } else {
            1.0
        };
        Self {
            dots_w,
            dots_h,
            dot_size,
            pixels: vec![[0, 0, 0]; dots_w * dots_h],
        }
    }

    pub fn dots_w(&self) -> usize {
        self.dots_w
    }

    pub fn dots_h(&self) -> usize {
        self.dots_h
    }

    #[cfg(test)]
    pub fn dot_size(&self) -> f64 {
        self.dot_size
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.dots_w || y >= self.dots_h {
            return None;
        }
        Some(self.pixels[y * self.dots_w + x])
    }

    fn center_of(&self, x: usize, y: usize) -> Point {
        Point::new(
            (x as f64 + 0.5) * self.dot_size,
            (y as f64 + 0.5) * self.dot_size,
        )
    }

    fn to_dots(&self, p: Point) -> (f64, f64) {
        (p.x / self.dot_size, p.y / self.dot_size)
    }

    fn dot_span(&self, lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
        let a = (lo / self.dot_size).floor();
        let b = (hi / self.dot_size).floor();
        if !a.is_finite() || !b.is_finite() || b < 0.0 || a >= len as f64 || len == 0 {
            return None;
        }
        let a = a.max(0.0) as usize;
        let b = (b as usize).min(len - 1);
        Some((a, b))
    }

    fn blend_dot(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.dots_w || y as usize >= self.dots_h {
            return;
        }
        let i = y as usize * self.dots_w + x as usize;
        self.pixels[i] = blend(self.pixels[i], color);
    }

    fn plot(&mut self, p: Point, color: Rgba) {
        let (x, y) = self.to_dots(p);
        if x.is_finite() && y.is_finite() {
            self.blend_dot(x.floor() as i64, y.floor() as i64, color);
        }
    }
}

pub fn blend(dst: Rgb, src: Rgba) -> Rgb {
    let a = if src.a.is_finite() {
        src.a.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mix = |d: u8, s: u8| -> u8 {
        (s as f64 * a + d as f64 * (1.0 - a))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    [mix(dst[0], src.r), mix(dst[1], src.g), mix(dst[2], src.b)]
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    let t = if len2 <= f64::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    let cx = a.x + dx * t;
    let cy = a.y + dy * t;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

impl Surface for Canvas {
    fn width(&self) -> f64 {
        self.dots_w as f64 * self.dot_size
    }

    fn height(&self) -> f64 {
        self.dots_h as f64 * self.dot_size
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        if radius * 2.0 < self.dot_size {
            self.plot(center, color);
            return;
        }
        let Some((x0, x1)) = self.dot_span(center.x - radius, center.x + radius, self.dots_w)
        else {
            return;
        };
        let Some((y0, y1)) = self.dot_span(center.y - radius, center.y + radius, self.dots_h)
        else {
            return;
        };
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let c = self.center_of(x, y);
                if (c.x - center.x).powi(2) + (c.y - center.y).powi(2) <= r2 {
                    self.blend_dot(x as i64, y as i64, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        if width < self.dot_size {
            let (ax, ay) = self.to_dots(from);
            let (bx, by) = self.to_dots(to);
            let steps = (bx.floor() - ax.floor())
                .abs()
                .max((by.floor() - ay.floor()).abs());
            if !steps.is_finite() {
                return;
            }
            // `to` is left for the next segment of a polyline
            let steps = steps as i64;
            if steps == 0 {
                self.plot(from, color);
                return;
            }
            for i in 0..steps {
                let t = i as f64 / steps as f64;
                self.blend_dot(
                    (ax + (bx - ax) * t).floor() as i64,
                    (ay + (by - ay) * t).floor() as i64,
                    color,
                );
            }
            return;
        }

        let half = width / 2.0;
        let Some((x0, x1)) =
            self.dot_span(from.x.min(to.x) - half, from.x.max(to.x) + half, self.dots_w)
        else {
            return;
        };
        let Some((y0, y1)) =
            self.dot_span(from.y.min(to.y) - half, from.y.max(to.y) + half, self.dots_h)
        else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if distance_to_segment(self.center_of(x, y), from, to) <= half {
                    self.blend_dot(x as i64, y as i64, color);
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let right = rect.x + rect.width;
        let bottom = rect.y + rect.height;
        let Some((x0, x1)) = self.dot_span(rect.x, right, self.dots_w) else {
            return;
        };
        let Some((y0, y1)) = self.dot_span(rect.y, bottom, self.dots_h) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let c = self.center_of(x, y);
                if c.x < rect.x || c.x >= right || c.y < rect.y || c.y >= bottom {
                    continue;
                }
                let color = paint.color_at(c);
                self.blend_dot(x as i64, y as i64, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LinearGradient;

    const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    fn lit(c: &Canvas) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..c.dots_h() {
            for x in 0..c.dots_w() {
                if c.pixel(x, y) != Some([0, 0, 0]) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn logical_size_scales_with_dot_size() {
        let c = Canvas::new(80, 48, 8.0);
        assert_eq!((c.width(), c.height()), (640.0, 384.0));
        assert_eq!(c.pixel(80, 0), None);
        assert_eq!(Canvas::new(2, 2, -1.0).dot_size(), 1.0);
    }

    #[test]
    fn blend_is_source_over() {
        assert_eq!(blend([0, 0, 0], WHITE), [255, 255, 255]);
        assert_eq!(blend([100, 100, 100], WHITE.with_alpha(0.0)), [100, 100, 100]);
        assert_eq!(blend([0, 0, 0], Rgba::rgb(200, 100, 0).with_alpha(0.5)), [100, 50, 0]);
        assert_eq!(blend([10, 10, 10], WHITE.with_alpha(f64::NAN)), [10, 10, 10]);
    }

    #[test]
    fn small_circle_lights_one_dot_at_its_alpha() {
        let mut c = Canvas::new(10, 10, 8.0);
        c.fill_circle(Point::new(20.0, 33.0), 1.8, WHITE.with_alpha(0.5));
        assert_eq!(lit(&c), vec![(2, 4)]);
        assert_eq!(c.pixel(2, 4), Some([128, 128, 128]));
    }

    #[test]
    fn large_circle_covers_dots_by_center_distance() {
        let mut c = Canvas::new(10, 10, 1.0);
        c.fill_circle(Point::new(5.0, 5.0), 1.0, WHITE);
        assert_eq!(lit(&c), vec![(4, 4), (5, 4), (4, 5), (5, 5)]);
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(4, 4, 8.0);
        c.fill_circle(Point::new(-3.0, 10.0), 1.0, WHITE);
        c.fill_circle(Point::new(100.0, 10.0), 20.0, WHITE);
        c.stroke_line(Point::new(-50.0, -50.0), Point::new(-10.0, -10.0), 1.0, WHITE);
        assert!(lit(&c).is_empty());
    }

    #[test]
    fn thin_line_walks_dots_without_endpoint() {
        let mut c = Canvas::new(10, 4, 1.0);
        c.stroke_line(Point::new(0.5, 1.5), Point::new(4.5, 1.5), 0.5, WHITE);
        assert_eq!(lit(&c), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);

        let mut c = Canvas::new(10, 4, 8.0);
        c.stroke_line(Point::new(1.0, 1.0), Point::new(3.0, 2.0), 1.5, WHITE);
        assert_eq!(lit(&c), vec![(0, 0)]);
    }

    #[test]
    fn wide_line_covers_its_band() {
        let mut c = Canvas::new(6, 5, 1.0);
        c.stroke_line(Point::new(0.0, 2.5), Point::new(6.0, 2.5), 1.0, WHITE);
        let rows: Vec<usize> = lit(&c).into_iter().map(|(_, y)| y).collect();
        assert_eq!(rows, vec![2; 6]);
    }

    #[test]
    fn gradient_rect_fills_every_dot() {
        let mut c = Canvas::new(2, 4, 10.0);
        let g = LinearGradient::new(Point::new(0.0, 0.0), Point::new(0.0, 40.0))
            .with_stop(0.0, Rgba::rgb(0, 0, 0))
            .with_stop(1.0, Rgba::rgb(0, 0, 200));
        c.fill_rect(Rect::new(0.0, 0.0, 20.0, 40.0), &Paint::Linear(g));

        let blues: Vec<u8> = (0..4).filter_map(|y| c.pixel(1, y)).map(|p| p[2]).collect();
        assert_eq!(blues, vec![25, 75, 125, 175]);
        assert_eq!(c.pixel(0, 2), c.pixel(1, 2));
    }

    #[test]
    fn solid_rect_respects_bounds() {
        let mut c = Canvas::new(4, 4, 1.0);
        c.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), &Paint::Solid(WHITE));
        assert_eq!(lit(&c), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }
}
