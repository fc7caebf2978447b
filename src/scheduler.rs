// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneKey(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    Update,
    Paint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub scene: SceneKey,
    pub kind: TickKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Interval {
    handle: TimerHandle,
    period: Duration,
    next_due: Instant,
    tick: Tick,
}

// Upper bound for a period so deadlines never overflow `Instant`.
const LONGEST_PERIOD: Duration = Duration::from_secs(86_400 * 365);

#[derive(Debug, Default)]
pub struct Scheduler {
    intervals: Vec<Interval>,
    next_handle: u64,
}

pub fn period_for(rate: f64) -> Duration {
    if rate.is_finite() && rate > 0.0 {
        Duration::from_secs_f64(1.0 / rate)
    } else {
        Duration::MAX
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interval(&mut self, period: Duration, tick: Tick, now: Instant) -> TimerHandle {
        let period = period.clamp(Duration::from_micros(1), LONGEST_PERIOD);
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = TimerHandle(self.next_handle);
        self.intervals.push(Interval {
            handle,
            period,
            next_due: now + period,
            tick,
        });
        handle
    }

    pub fn clear_interval(&mut self, handle: TimerHandle) -> bool {
        let before = self.intervals.len();
        self.intervals.retain(|i| i.handle != handle);
        self.intervals.len() != before
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.intervals.iter().map(|i| i.next_due).min()
    }

    // Earliest due tick, if any. Its timer moves one period ahead, or to
    // `now + period` when it has fallen behind by more than a period.
    pub fn pop_due(&mut self, now: Instant) -> Option<Tick> {
        let mut best: Option<usize> = None;
        for (i, iv) in self.intervals.iter().enumerate() {
            if iv.next_due > now {
                continue;
            }
            match best {
                Some(b) if self.intervals[b].next_due <= iv.next_due => {}
                _ => best = Some(i),
            }
        }

        let iv = &mut self.intervals[best?];
        let next = iv.next_due + iv.period;
        iv.next_due = if next <= now { now + iv.period } else { next };
        Some(iv.tick)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(kind: TickKind) -> Tick {
        Tick {
            scene: SceneKey(1),
            kind,
        }
    }

    fn drain(s: &mut Scheduler, now: Instant) -> Vec<Tick> {
        std::iter::from_fn(|| s.pop_due(now)).collect()
    }

    #[test]
    fn nothing_fires_before_first_period() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_interval(Duration::from_millis(20), tick(TickKind::Update), t0);
        assert_eq!(s.pop_due(t0 + Duration::from_millis(19)), None);
        assert_eq!(s.next_due(), Some(t0 + Duration::from_millis(20)));
        assert_eq!(
            s.pop_due(t0 + Duration::from_millis(20)),
            Some(tick(TickKind::Update))
        );
    }

    #[test]
    fn independent_periods() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_interval(Duration::from_millis(10), tick(TickKind::Update), t0);
        s.set_interval(Duration::from_millis(25), tick(TickKind::Paint), t0);

        let mut updates = 0;
        let mut paints = 0;
        for ms in 1..=100 {
            for t in drain(&mut s, t0 + Duration::from_millis(ms)) {
                match t.kind {
                    TickKind::Update => updates += 1,
                    TickKind::Paint => paints += 1,
                }
            }
        }
        assert_eq!(updates, 10);
        assert_eq!(paints, 4);
    }

    #[test]
    fn stall_does_not_replay_backlog() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_interval(Duration::from_millis(20), tick(TickKind::Update), t0);
        let late = t0 + Duration::from_secs(1);
        assert_eq!(drain(&mut s, late).len(), 1);
        assert_eq!(s.next_due(), Some(late + Duration::from_millis(20)));
    }

    #[test]
    fn cleared_timer_never_fires() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let h = s.set_interval(Duration::from_millis(5), tick(TickKind::Paint), t0);
        assert!(s.clear_interval(h));
        assert!(!s.clear_interval(h));
        assert!(s.is_empty());
        assert_eq!(s.pop_due(t0 + Duration::from_secs(5)), None);
        assert_eq!(s.next_due(), None);
    }

    #[test]
    fn clearing_mid_drain_drops_pending_tick() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.set_interval(Duration::from_millis(10), tick(TickKind::Update), t0);
        let paint = s.set_interval(Duration::from_millis(10), tick(TickKind::Paint), t0);
        let now = t0 + Duration::from_millis(10);

        assert_eq!(s.pop_due(now).map(|t| t.kind), Some(TickKind::Update));
        s.clear_interval(paint);
        assert_eq!(s.pop_due(now), None);
    }

    #[test]
    fn period_for_rates() {
        assert_eq!(period_for(50.0), Duration::from_millis(20));
        assert_eq!(period_for(0.0), Duration::MAX);
        assert_eq!(period_for(f64::NAN), Duration::MAX);
    }
}
