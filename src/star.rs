// Copyright (c) 2026 rezky_nightky

use serde::{Deserialize, Serialize};

use crate::surface::{Point, Rgba, Surface};

const WHITE: Rgba = Rgba::rgb(255, 255, 255);
const RED: Rgba = Rgba::rgb(220, 45, 60);

pub fn lightness_at(phase: f64) -> f64 {
    (phase * 2.0 - 1.0).abs().sqrt()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Point,
    pub radius: f64,
    pub shining_speed: f64,
    pub tick_rate: f64,
    pub phase: f64,
    pub red_tinted: bool,
    lightness: f64,
}

impl Star {
    pub fn new(
        pos: Point,
        radius: f64,
        shining_speed: f64,
        shining_offset: f64,
        red_tinted: bool,
        tick_rate: f64,
    ) -> Self {
        let mut star = Self {
            pos,
            radius,
            shining_speed,
            tick_rate,
            phase: shining_offset,
            red_tinted,
            lightness: 0.0,
        };
        star.shine();
        star
    }

    pub fn lightness(&self) -> f64 {
        self.lightness
    }

    pub fn update(&mut self) {
        self.shine();
    }

    fn shine(&mut self) {
        let step = if self.tick_rate > 0.0 {
            self.shining_speed / self.tick_rate
        } else {
            0.0
        };
        self.phase = (self.phase + step).rem_euclid(1.0);
        self.lightness = lightness_at(self.phase);
    }

    pub fn color(&self) -> Rgba {
        let base = if self.red_tinted { RED } else { WHITE };
        base.with_alpha(self.lightness())
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_circle(self.pos, self.radius, self.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{DrawOp, Recorder};

    fn star(speed: f64, offset: f64) -> Star {
        Star::new(Point::new(10.0, 20.0), 1.2, speed, offset, false, 50.0)
    }

    #[test]
    fn lightness_curve_endpoints() {
        assert_eq!(lightness_at(0.0), 1.0);
        assert_eq!(lightness_at(0.5), 0.0);
        assert!((lightness_at(1.0 - 1e-12) - 1.0).abs() < 1e-6);
        for i in 0..1000 {
            let l = lightness_at(i as f64 / 1000.0);
            assert!((0.0..=1.0).contains(&l));
        }
    }

    #[test]
    fn construction_runs_one_tick() {
        let s = star(0.5, 0.25);
        assert!((s.phase - 0.26).abs() < 1e-12);
        assert!((s.lightness() - lightness_at(0.26)).abs() < 1e-12);
    }

    #[test]
    fn phase_follows_closed_form_across_wraps() {
        // 0.5 / 50 = 0.01 per tick; 0.3 start plus construction tick.
        let mut s = star(0.5, 0.3);
        let start = s.phase;
        for n in 1..=330u32 {
            s.update();
            if matches!(n, 70 | 71 | 170 | 171 | 270 | 271 | 330) {
                let expected = (start + n as f64 * 0.01).rem_euclid(1.0);
                let diff = (s.phase - expected).abs();
                assert!(diff < 1e-9 || (1.0 - diff) < 1e-9, "n={n} {} vs {expected}", s.phase);
            }
            assert!((0.0..1.0).contains(&s.phase));
            assert!((s.lightness() - lightness_at(s.phase)).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_tick_rate_freezes_phase() {
        let mut s = Star::new(Point::default(), 1.0, 0.4, 0.7, false, 0.0);
        s.update();
        assert_eq!(s.phase, 0.7);
    }

    #[test]
    fn paint_uses_tint_and_lightness() {
        let mut rec = Recorder::new(100.0, 100.0);
        let white = star(0.2, 0.0);
        let mut red = white.clone();
        red.red_tinted = true;

        white.paint(&mut rec);
        red.paint(&mut rec);

        let colors: Vec<Rgba> = rec
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Circle { color, radius, .. } => {
                    assert_eq!(*radius, 1.2);
                    *color
                }
                other => panic!("unexpected op {other:?}"),
            })
            .collect();
        assert_eq!((colors[0].r, colors[0].g, colors[0].b), (255, 255, 255));
        assert_eq!((colors[1].r, colors[1].g, colors[1].b), (220, 45, 60));
        assert_eq!(colors[0].a, white.lightness());
    }

    #[test]
    fn serde_round_trip_replays_identically() {
        let mut original = star(0.37, 0.81);
        for _ in 0..13 {
            original.update();
        }
        let json = serde_json::to_string(&original).unwrap();
        let mut copy: Star = serde_json::from_str(&json).unwrap();
        assert_eq!(copy, original);

        for _ in 0..200 {
            original.update();
            copy.update();
        }
        assert_eq!(copy.phase, original.phase);
        assert_eq!(copy.lightness(), original.lightness());
    }
}
