// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::surface::{Point, Rgba, Surface};

const STREAK: Rgba = Rgba::rgb(255, 255, 255);

pub fn tail_fade(capacity: usize) -> f64 {
    0.1_f64.powf(1.0 / capacity.max(1) as f64)
}

fn saturating_turn(angle: f64, delta: f64, max: f64) -> f64 {
    let next = angle + delta;
    if next > max {
        max
    } else {
        next
    }
}

// trail[0] is the head
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShootingStar {
    pub trail: VecDeque<Point>,
    pub width: f64,
    pub speed: f64,
    pub angle: f64,
    pub angular_delta: f64,
    pub max_angle: f64,
    pub tail_capacity: usize,
    pub tail_fade: f64,
    pub screen_width: f64,
    pub screen_height: f64,
    pub finished: bool,
}

impl ShootingStar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        head: Point,
        width: f64,
        speed: f64,
        angle: f64,
        angular_delta: f64,
        max_angle: f64,
        tail_capacity: usize,
        screen_width: f64,
        screen_height: f64,
    ) -> Self {
        let tail_capacity = tail_capacity.max(1);
        let mut trail = VecDeque::with_capacity(tail_capacity + 1);
        trail.push_back(head);
        Self {
            trail,
            width,
            speed,
            angle,
            angular_delta,
            max_angle,
            tail_capacity,
            tail_fade: tail_fade(tail_capacity),
            screen_width,
            screen_height,
            finished: false,
        }
    }

    pub fn head(&self) -> Option<Point> {
        self.trail.front().copied()
    }

    pub fn update(&mut self) {
        if let Some(head) = self.head() {
            self.trail.push_front(Point::new(
                head.x + self.speed * self.angle.cos(),
                head.y + self.speed * self.angle.sin(),
            ));
        }

        if self.trail.len() > self.tail_capacity {
            if let Some(last) = self.trail.pop_back() {
                // Only the trailing point and only the right/bottom edges.
                if last.x > self.screen_width || last.y > self.screen_height {
                    self.finished = true;
                }
            }
        }

        self.angle = saturating_turn(self.angle, self.angular_delta, self.max_angle);
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        let mut alpha = 1.0;
        for (a, b) in self.trail.iter().zip(self.trail.iter().skip(1)) {
            surface.stroke_line(*a, *b, self.width, STREAK.with_alpha(alpha));
            alpha *= self.tail_fade;
        }
    }
}
