// Copyright (c) 2026 rezky_nightky

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

pub fn init_logging(log_file: Option<&Path>, level: &str) -> io::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    let res = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime());
            registry.with(layer).try_init()
        }
        None => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_timer(fmt::time::uptime());
            registry.with(layer).try_init()
        }
    };
    res.map_err(io::Error::other)
}
