// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng, SeedableRng};

// Samples scale one [0, 1) draw; a degenerate range returns its min.
#[derive(Clone, Debug)]
pub struct SkyRng {
    inner: StdRng,
}

impl SkyRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    pub fn fork(&mut self) -> Self {
        Self::seeded(self.inner.random::<u64>())
    }

    pub fn unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    #[cfg(test)]
    pub fn float_below(&mut self, max: f64) -> f64 {
        self.float_between(0.0, max)
    }

    pub fn float_between(&mut self, min: f64, max: f64) -> f64 {
        min + self.unit() * (max - min)
    }

    #[cfg(test)]
    pub fn int_below(&mut self, max: i64) -> i64 {
        self.int_between(0, max)
    }

    pub fn int_between(&mut self, min: i64, max: i64) -> i64 {
        let span = max.saturating_sub(min) as f64;
        min.saturating_add((self.unit() * span).floor() as i64)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}
