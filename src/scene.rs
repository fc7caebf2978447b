// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use tracing::{debug, info};

use crate::config::SkyConfig;
use crate::rng::SkyRng;
use crate::scheduler::{period_for, SceneKey, Scheduler, Tick, TickKind, TimerHandle};
use crate::shooting_star::ShootingStar;
use crate::star::Star;
use crate::surface::{LinearGradient, Paint, Point, Rect, Rgba, Surface};

const NIGHT: Rgba = Rgba::rgb(0, 0, 0);
const DEEP_BLUE: Rgba = Rgba::rgb(20, 30, 140);

pub fn star_count(width: f64, height: f64, density: f64, base_area: f64) -> usize {
    if width <= 0.0 || height <= 0.0 || base_area <= 0.0 {
        return 0;
    }
    (density * width * height / base_area).floor().max(0.0) as usize
}

#[derive(Clone, Copy, Debug)]
struct Timers {
    key: SceneKey,
    paint: TimerHandle,
    update: TimerHandle,
}

pub struct Scene<S> {
    surface: S,
    width: f64,
    height: f64,
    config: SkyConfig,
    rng: SkyRng,
    stars: Vec<Star>,
    shooting_stars: Vec<ShootingStar>,
    timers: Option<Timers>,
    ticks: u64,
    frames: u64,
}

impl<S: Surface> Scene<S> {
    pub fn new(surface: S, config: &SkyConfig, mut rng: SkyRng) -> Self {
        let width = surface.width();
        let height = surface.height();
        let count = star_count(width, height, config.star_density, config.base_area);

        let stars = (0..count)
            .map(|_| {
                let (x, y) = spawn_point(&mut rng, width, height, config.border);
                Star::new(
                    Point::new(x, y),
                    config.star_size.sample(&mut rng),
                    config.shine_speed.sample(&mut rng),
                    rng.unit(),
                    rng.chance(config.red_rate),
                    config.ups,
                )
            })
            .collect();

        info!(width, height, stars = count, "sky created");

        Self {
            surface,
            width,
            height,
            config: config.clone(),
            rng,
            stars,
            shooting_stars: Vec::new(),
            timers: None,
            ticks: 0,
            frames: 0,
        }
    }

    pub fn update(&mut self) {
        for star in &mut self.stars {
            star.update();
        }
        for star in &mut self.shooting_stars {
            star.update();
        }

        let before = self.shooting_stars.len();
        self.shooting_stars.retain(|s| !s.finished);
        if self.shooting_stars.len() != before {
            debug!(
                evicted = before - self.shooting_stars.len(),
                "shooting stars finished"
            );
        }

        if self.rng.chance(self.config.shooting_rate) {
            self.spawn_shooting_star();
        }
        self.ticks += 1;
    }

    fn spawn_shooting_star(&mut self) {
        let cfg = &self.config;
        let rng = &mut self.rng;
        let (x, y) = spawn_point(rng, self.width, self.height, cfg.border);
        let star = ShootingStar::new(
            Point::new(x, y),
            cfg.star_size.sample(rng),
            cfg.shooting_speed.sample(rng),
            cfg.start_angle.sample(rng),
            cfg.angular_delta.sample(rng),
            cfg.max_angle,
            cfg.tail,
            self.width,
            self.height,
        );
        debug!(x, y, angle = star.angle, speed = star.speed, "shooting star spawned");
        self.shooting_stars.push(star);
    }

    pub fn paint(&mut self) {
        self.paint_background();
        for star in &self.stars {
            star.paint(&mut self.surface);
        }
        for star in &self.shooting_stars {
            star.paint(&mut self.surface);
        }
        self.frames += 1;
    }

    fn paint_background(&mut self) {
        let (w, h) = (self.width, self.height);
        let gradient = LinearGradient::new(
            Point::new(w / 3.0, -h * 0.2),
            Point::new(w / 3.0 * 2.0, h * 1.3),
        )
        .with_stop(0.3, NIGHT)
        .with_stop(1.0, DEEP_BLUE);
        self.surface
            .fill_rect(Rect::new(0.0, 0.0, w, h), &Paint::Linear(gradient));
    }

    pub fn start(&mut self, key: SceneKey, scheduler: &mut Scheduler, now: Instant) {
        if self.is_running() {
            return;
        }
        let paint = scheduler.set_interval(
            period_for(self.config.fps),
            Tick {
                scene: key,
                kind: TickKind::Paint,
            },
            now,
        );
        let update = scheduler.set_interval(
            period_for(self.config.ups),
            Tick {
                scene: key,
                kind: TickKind::Update,
            },
            now,
        );
        debug!(key = key.0, fps = self.config.fps, ups = self.config.ups, "sky started");
        self.timers = Some(Timers { key, paint, update });
    }

    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(t) = self.timers.take() {
            scheduler.clear_interval(t.paint);
            scheduler.clear_interval(t.update);
            debug!(key = t.key.0, "sky stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timers.is_some()
    }

    pub fn key(&self) -> Option<SceneKey> {
        self.timers.map(|t| t.key)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting_stars
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn spawn_point(rng: &mut SkyRng, width: f64, height: f64, border: f64) -> (f64, f64) {
    let border = border as i64;
    let x = rng.int_between(border, width as i64 - border);
    let y = rng.int_between(border, height as i64 - border);
    (x as f64, y as f64)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::surface::testing::{DrawOp, Recorder};

    fn scene(w: f64, h: f64, cfg: &SkyConfig) -> Scene<Recorder> {
        Scene::new(Recorder::new(w, h), cfg, SkyRng::seeded(99))
    }

    #[test]
    fn star_count_formula() {
        assert_eq!(star_count(500.0, 500.0, 25.0, 250_000.0), 25);
        assert_eq!(star_count(640.0, 384.0, 25.0, 250_000.0), 24);
        assert_eq!(star_count(0.0, 500.0, 25.0, 250_000.0), 0);
        assert_eq!(star_count(-3.0, 500.0, 25.0, 250_000.0), 0);
    }

    #[test]
    fn stars_are_placed_inside_border() {
        let cfg = SkyConfig::default();
        let s = scene(500.0, 500.0, &cfg);
        assert_eq!(s.star_count(), 25);
        for star in s.stars() {
            assert!(star.pos.x >= 5.0 && star.pos.x < 495.0);
            assert!(star.pos.y >= 5.0 && star.pos.y < 495.0);
            assert!(star.radius >= 0.8 && star.radius < 1.8);
            assert!(star.shining_speed >= 0.15 && star.shining_speed < 0.5);
            assert_eq!(star.tick_rate, 50.0);
        }
        assert!(s.shooting_stars().is_empty());
    }

    #[test]
    fn red_rate_extremes() {
        let cfg = SkyConfig {
            red_rate: 1.0,
            ..SkyConfig::default()
        };
        assert!(scene(500.0, 500.0, &cfg).stars().iter().all(|s| s.red_tinted));
        let cfg = SkyConfig {
            red_rate: 0.0,
            ..SkyConfig::default()
        };
        assert!(scene(500.0, 500.0, &cfg).stars().iter().all(|s| !s.red_tinted));
    }

    #[test]
    fn update_spawns_with_certain_rate() {
        let cfg = SkyConfig {
            shooting_rate: 1.0,
            ..SkyConfig::default()
        };
        let mut s = scene(500.0, 500.0, &cfg);
        s.update();
        assert_eq!(s.shooting_stars().len(), 1);
        let ss = &s.shooting_stars()[0];
        assert_eq!(ss.tail_capacity, 30);
        assert_eq!((ss.screen_width, ss.screen_height), (500.0, 500.0));
        assert!(ss.angle >= cfg.start_angle.min && ss.angle <= cfg.max_angle);
        assert_eq!(s.ticks(), 1);
    }

    #[test]
    fn update_never_spawns_with_zero_rate() {
        let cfg = SkyConfig {
            shooting_rate: 0.0,
            ..SkyConfig::default()
        };
        let mut s = scene(500.0, 500.0, &cfg);
        for _ in 0..500 {
            s.update();
        }
        assert!(s.shooting_stars().is_empty());
    }

    #[test]
    fn finished_shooting_stars_are_evicted() {
        let cfg = SkyConfig {
            shooting_rate: 1.0,
            tail: 2,
            ..SkyConfig::default()
        };
        let mut s = scene(60.0, 60.0, &cfg);
        for _ in 0..200 {
            s.update();
            assert!(s.shooting_stars().iter().all(|ss| !ss.finished));
        }
        // at speed >= 4.5 on a 60px sky every streak leaves within ~30 ticks
        assert!(s.shooting_stars().len() < 60);
    }

    #[test]
    fn paint_order_is_background_stars_streaks() {
        let cfg = SkyConfig {
            shooting_rate: 1.0,
            ..SkyConfig::default()
        };
        let mut s = scene(500.0, 500.0, &cfg);
        for _ in 0..3 {
            s.update();
        }
        s.paint();
        assert_eq!(s.frames(), 1);

        let ops = &s.surface().ops;
        match &ops[0] {
            DrawOp::Rect {
                rect,
                paint: Paint::Linear(g),
            } => {
                assert_eq!(*rect, Rect::new(0.0, 0.0, 500.0, 500.0));
                assert_eq!(g.from, Point::new(500.0 / 3.0, -100.0));
                assert_eq!(g.to, Point::new(500.0 / 3.0 * 2.0, 650.0));
                assert_eq!(g.stops(), &[(0.3, NIGHT), (1.0, DEEP_BLUE)]);
            }
            other => panic!("expected gradient background, got {other:?}"),
        }

        assert!(ops[1..=25]
            .iter()
            .all(|op| matches!(op, DrawOp::Circle { .. })));
        assert!(ops.len() > 26);
        assert!(ops[26..].iter().all(|op| matches!(op, DrawOp::Line { .. })));
    }

    #[test]
    fn stop_right_after_start_prevents_ticks() {
        let cfg = SkyConfig::default();
        let mut s = scene(500.0, 500.0, &cfg);
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        s.start(SceneKey(1), &mut sched, t0);
        assert!(s.is_running());
        assert_eq!(sched.len(), 2);
        s.stop(&mut sched);
        s.stop(&mut sched);
        assert!(!s.is_running());
        assert!(sched.is_empty());

        for ms in (0..2000).step_by(5) {
            while let Some(tick) = sched.pop_due(t0 + Duration::from_millis(ms)) {
                match tick.kind {
                    TickKind::Update => s.update(),
                    TickKind::Paint => s.paint(),
                }
            }
        }
        assert_eq!(s.ticks(), 0);
        assert_eq!(s.frames(), 0);
    }

    #[test]
    fn start_twice_registers_once() {
        let cfg = SkyConfig::default();
        let mut s = scene(100.0, 100.0, &cfg);
        let mut sched = Scheduler::new();
        let now = Instant::now();
        s.start(SceneKey(4), &mut sched, now);
        s.start(SceneKey(5), &mut sched, now);
        assert_eq!(sched.len(), 2);
        assert_eq!(s.key(), Some(SceneKey(4)));
    }

    #[test]
    fn same_seed_same_sky() {
        let cfg = SkyConfig::default();
        let a = scene(300.0, 200.0, &cfg);
        let b = scene(300.0, 200.0, &cfg);
        assert_eq!(a.stars(), b.stars());
    }
}
