// Copyright (c) 2026 rezky_nightky

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::config::SkyConfig;
use crate::rng::SkyRng;
use crate::scene::Scene;
use crate::scheduler::{SceneKey, Scheduler, TickKind};
use crate::surface::{Surface, SurfaceError, SurfaceHost};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no sky registered for `{0}`")]
    UnknownSky(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug)]
pub struct SkyFailure {
    pub id: String,
    pub error: SurfaceError,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DueReport {
    pub updates: u32,
    pub paints: u32,
    pub dropped: u32,
}

type StartHook = Box<dyn FnOnce()>;

pub struct Controller<S> {
    config: SkyConfig,
    scheduler: Scheduler,
    rng: SkyRng,
    skies: BTreeMap<String, Scene<S>>,
    keys: HashMap<SceneKey, String>,
    next_key: u64,
    on_start: Option<StartHook>,
}

impl<S: Surface> Controller<S> {
    pub fn new(config: SkyConfig, rng: SkyRng) -> Self {
        Self {
            config,
            scheduler: Scheduler::new(),
            rng,
            skies: BTreeMap::new(),
            keys: HashMap::new(),
            next_key: 0,
            on_start: None,
        }
    }

    pub fn on_start(&mut self, hook: impl FnOnce() + 'static) {
        self.on_start = Some(Box::new(hook));
    }

    pub fn start_all<H>(&mut self, host: &mut H, now: Instant) -> Vec<SkyFailure>
    where
        H: SurfaceHost<Surface = S>,
    {
        let mut failures = Vec::new();
        for id in host.discover() {
            if let Err(error) = self.start(&id, host, now) {
                warn!(id = %id, %error, "sky not started");
                failures.push(SkyFailure { id, error });
            }
        }
        info!(running = self.skies.len(), failed = failures.len(), "skies started");

        if let Some(hook) = self.on_start.take() {
            hook();
        }
        failures
    }

    pub fn start<H>(&mut self, id: &str, host: &mut H, now: Instant) -> Result<bool, SurfaceError>
    where
        H: SurfaceHost<Surface = S>,
    {
        if self.skies.contains_key(id) {
            debug!(id, "sky already running");
            return Ok(false);
        }
        self.launch(id, host, now)?;
        Ok(true)
    }

    pub fn resize<H>(&mut self, id: &str, host: &mut H, now: Instant) -> Result<(), ControllerError>
    where
        H: SurfaceHost<Surface = S>,
    {
        if !self.remove(id) {
            return Err(ControllerError::UnknownSky(id.to_string()));
        }
        self.launch(id, host, now)?;
        info!(id, "sky resized");
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(mut scene) = self.skies.remove(id) else {
            return false;
        };
        if let Some(key) = scene.key() {
            self.keys.remove(&key);
        }
        scene.stop(&mut self.scheduler);
        true
    }

    pub fn stop_all(&mut self) {
        for scene in self.skies.values_mut() {
            scene.stop(&mut self.scheduler);
        }
        self.keys.clear();
    }

    fn launch<H>(&mut self, id: &str, host: &mut H, now: Instant) -> Result<(), SurfaceError>
    where
        H: SurfaceHost<Surface = S>,
    {
        // one sky per id: never leave an old one's timers behind
        self.remove(id);
        let surface = host.acquire(id)?;
        let mut scene = Scene::new(surface, &self.config, self.rng.fork());

        self.next_key += 1;
        let key = SceneKey(self.next_key);
        scene.start(key, &mut self.scheduler, now);

        self.keys.insert(key, id.to_string());
        self.skies.insert(id.to_string(), scene);
        Ok(())
    }

    pub fn run_due(&mut self, now: Instant) -> DueReport {
        let mut report = DueReport::default();
        while let Some(tick) = self.scheduler.pop_due(now) {
            let scene = self
                .keys
                .get(&tick.scene)
                .and_then(|id| self.skies.get_mut(id));
            let Some(scene) = scene else {
                trace!(key = tick.scene.0, "dropping tick for a replaced sky");
                report.dropped += 1;
                continue;
            };
            match tick.kind {
                TickKind::Update => {
                    scene.update();
                    report.updates += 1;
                }
                TickKind::Paint => {
                    scene.paint();
                    report.paints += 1;
                }
            }
        }
        report
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    pub fn get(&self, id: &str) -> Option<&Scene<S>> {
        self.skies.get(id)
    }

    pub fn skies(&self) -> impl Iterator<Item = (&str, &Scene<S>)> {
        self.skies.iter().map(|(id, s)| (id.as_str(), s))
    }

    pub fn config(&self) -> &SkyConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.skies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skies.is_empty()
    }

    pub fn timers(&self) -> usize {
        self.scheduler.len()
    }
}
