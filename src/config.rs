// Copyright (c) 2026 rezky_nightky

use std::f64::consts::PI;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::SkyRng;

pub const DEFAULT_SKY_ID: &str = "claire-starry";

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  claire --sky claire-starry --fps 50 --ups 50 --density 25 --base-area 250000 --border 5 --star-size 0.8,1.8 --shine-speed 0.15,0.5 --red-rate 0.02 --shooting-rate 0.003 --shooting-speed 4.5,6.5 --start-angle 0.12,0.38 --max-angle 0.44 --max-delta 0.001 --tail 30 --dot-size 8";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        let (heading, rest) = DEFAULT_PARAMS_USAGE
            .split_once('\n')
            .unwrap_or((DEFAULT_PARAMS_USAGE, ""));
        format!("\x1b[1;36m{heading}\x1b[0m\n\x1b[33m{rest}\x1b[0m")
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("failed to apply {name} {low},{high} (low must not exceed high)")]
    InvertedRange {
        name: &'static str,
        low: f64,
        high: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.min * k, self.max * k)
    }

    pub fn sample(&self, rng: &mut SkyRng) -> f64 {
        rng.float_between(self.min, self.max)
    }
}

impl FromStr for Span {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: LOW,HIGH".to_string())?;
        let min: f64 = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let max: f64 = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if !min.is_finite() || !max.is_finite() {
            return Err("range bounds must be finite".to_string());
        }
        Ok(Self { min, max })
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    #[value(name = "default")]
    Default,
    #[value(name = "classic")]
    Classic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkyConfig {
    pub fps: f64,
    pub ups: f64,
    pub star_density: f64,
    pub base_area: f64,
    pub border: f64,
    pub star_size: Span,
    pub shine_speed: Span,
    pub red_rate: f64,
    pub shooting_rate: f64,
    pub shooting_speed: Span,
    pub start_angle: Span,
    pub max_angle: f64,
    pub angular_delta: Span,
    pub tail: usize,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            fps: 50.0,
            ups: 50.0,
            star_density: 25.0,
            base_area: 250_000.0,
            border: 5.0,
            star_size: Span::new(0.8, 1.8),
            shine_speed: Span::new(0.15, 0.5),
            red_rate: 0.02,
            shooting_rate: 0.003,
            shooting_speed: Span::new(4.5, 6.5),
            start_angle: Span::new(0.12, 0.38).scaled(PI),
            max_angle: 0.44 * PI,
            angular_delta: Span::new(0.0, 0.001).scaled(PI),
            tail: 30,
        }
    }
}

fn require_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !v.is_finite() || v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(())
}

fn require_span(name: &'static str, s: Span, min: f64, max: f64) -> Result<(), ConfigError> {
    require_range(name, s.min, min, max)?;
    require_range(name, s.max, min, max)?;
    if s.min > s.max {
        return Err(ConfigError::InvertedRange {
            name,
            low: s.min,
            high: s.max,
        });
    }
    Ok(())
}

impl SkyConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default(),
            Preset::Classic => Self {
                tail: 25,
                ..Self::default()
            },
        }
    }

    // Lays a JSON object over `self`; keys missing from the JSON keep their
    // current values.
    pub fn overlay_json(&self, json: &str) -> Result<Self, ConfigError> {
        let patch: serde_json::Value = serde_json::from_str(json)?;
        match patch {
            serde_json::Value::Object(fields) => {
                let mut merged = serde_json::to_value(self)?;
                if let serde_json::Value::Object(base) = &mut merged {
                    base.extend(fields);
                }
                Ok(serde_json::from_value(merged)?)
            }
            other => Ok(serde_json::from_value(other)?),
        }
    }

    pub fn overlay_file(&self, path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.overlay_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_range("fps", self.fps, 1.0, 240.0)?;
        require_range("ups", self.ups, 1.0, 1000.0)?;
        require_range("star_density", self.star_density, 0.0, 10_000.0)?;
        require_range("base_area", self.base_area, 1.0, f64::MAX)?;
        require_range("border", self.border, 0.0, 10_000.0)?;
        require_span("star_size", self.star_size, 0.0, 100.0)?;
        require_span("shine_speed", self.shine_speed, 0.0, 100.0)?;
        require_range("red_rate", self.red_rate, 0.0, 1.0)?;
        require_range("shooting_rate", self.shooting_rate, 0.0, 1.0)?;
        require_span("shooting_speed", self.shooting_speed, 0.0, 1000.0)?;
        require_span("start_angle", self.start_angle, -2.0 * PI, 2.0 * PI)?;
        require_range("max_angle", self.max_angle, -2.0 * PI, 2.0 * PI)?;
        // streaks start at or below the cap
        if self.start_angle.max > self.max_angle {
            return Err(ConfigError::InvertedRange {
                name: "start_angle/max_angle",
                low: self.start_angle.max,
                high: self.max_angle,
            });
        }
        require_span("angular_delta", self.angular_delta, 0.0, PI)?;
        require_range("tail", self.tail as f64, 1.0, 1000.0)?;
        Ok(())
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut cfg = Self::preset(args.preset);
        if let Some(path) = &args.config {
            cfg = cfg.overlay_file(path)?;
        }

        if let Some(v) = args.fps {
            cfg.fps = v;
        }
        if let Some(v) = args.ups {
            cfg.ups = v;
        }
        if let Some(v) = args.density {
            cfg.star_density = v;
        }
        if let Some(v) = args.base_area {
            cfg.base_area = v;
        }
        if let Some(v) = args.border {
            cfg.border = v;
        }
        if let Some(v) = args.star_size {
            cfg.star_size = v;
        }
        if let Some(v) = args.shine_speed {
            cfg.shine_speed = v;
        }
        if let Some(v) = args.red_rate {
            cfg.red_rate = v;
        }
        if let Some(v) = args.shooting_rate {
            cfg.shooting_rate = v;
        }
        if let Some(v) = args.shooting_speed {
            cfg.shooting_speed = v;
        }
        if let Some(v) = args.start_angle {
            cfg.start_angle = v.scaled(PI);
        }
        if let Some(v) = args.max_angle {
            cfg.max_angle = v * PI;
        }
        if let Some(v) = args.max_delta {
            cfg.angular_delta = Span::new(0.0, v * PI);
        }
        if let Some(v) = args.tail {
            cfg.tail = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "claire", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "sky",
        value_name = "ID",
        default_value = DEFAULT_SKY_ID,
        help_heading = "GENERAL",
        help = "Sky id; repeat to split the terminal into side by side skies"
    )]
    pub sky: Vec<String>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for a reproducible sky"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "preset",
        default_value_t = Preset::Default,
        value_enum,
        help_heading = "GENERAL",
        help = "Base tunables (default, classic)"
    )]
    pub preset: Preset,

    #[arg(
        long = "config",
        value_name = "FILE",
        help_heading = "GENERAL",
        help = "JSON file with sky tunables; flags override it"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "print-config",
        help_heading = "GENERAL",
        help = "Print the effective sky tunables as JSON and exit"
    )]
    pub print_config: bool,

    #[arg(
        short = 'f',
        long = "fps",
        help_heading = "TIMING",
        help = "Paint frames per second (min 1 max 240) [default: 50]"
    )]
    pub fps: Option<f64>,

    #[arg(
        short = 'u',
        long = "ups",
        help_heading = "TIMING",
        help = "Update ticks per second (min 1 max 1000) [default: 50]"
    )]
    pub ups: Option<f64>,

    #[arg(
        long = "perf-stats",
        help_heading = "TIMING",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        short = 'd',
        long = "density",
        help_heading = "STARS",
        help = "Stars per base area [default: 25]"
    )]
    pub density: Option<f64>,

    #[arg(
        long = "base-area",
        help_heading = "STARS",
        help = "Reference area in square pixels [default: 250000]"
    )]
    pub base_area: Option<f64>,

    #[arg(
        long = "border",
        help_heading = "STARS",
        help = "Margin in pixels kept free of new stars [default: 5]"
    )]
    pub border: Option<f64>,

    #[arg(
        long = "star-size",
        value_name = "LOW,HIGH",
        help_heading = "STARS",
        help = "Star radius range in pixels [default: 0.8,1.8]"
    )]
    pub star_size: Option<Span>,

    #[arg(
        long = "shine-speed",
        value_name = "LOW,HIGH",
        help_heading = "STARS",
        help = "Twinkle cycles per second [default: 0.15,0.5]"
    )]
    pub shine_speed: Option<Span>,

    #[arg(
        long = "red-rate",
        help_heading = "STARS",
        help = "Probability of a red star (min 0 max 1) [default: 0.02]"
    )]
    pub red_rate: Option<f64>,

    #[arg(
        long = "shooting-rate",
        help_heading = "SHOOTING STARS",
        help = "Spawn probability per tick (min 0 max 1) [default: 0.003]"
    )]
    pub shooting_rate: Option<f64>,

    #[arg(
        long = "shooting-speed",
        value_name = "LOW,HIGH",
        help_heading = "SHOOTING STARS",
        help = "Pixels per tick [default: 4.5,6.5]"
    )]
    pub shooting_speed: Option<Span>,

    #[arg(
        long = "start-angle",
        value_name = "LOW,HIGH",
        help_heading = "SHOOTING STARS",
        help = "Start angle range in multiples of pi [default: 0.12,0.38]"
    )]
    pub start_angle: Option<Span>,

    #[arg(
        long = "max-angle",
        help_heading = "SHOOTING STARS",
        help = "Steepest angle in multiples of pi [default: 0.44]"
    )]
    pub max_angle: Option<f64>,

    #[arg(
        long = "max-delta",
        help_heading = "SHOOTING STARS",
        help = "Largest turn per tick in multiples of pi [default: 0.001]"
    )]
    pub max_delta: Option<f64>,

    #[arg(
        long = "tail",
        help_heading = "SHOOTING STARS",
        help = "Tail length in segments (min 1 max 1000) [default: 30]"
    )]
    pub tail: Option<usize>,

    #[arg(
        long = "dot-size",
        default_value_t = 8.0,
        help_heading = "DISPLAY",
        help = "Sky pixels per half terminal cell (min 1 max 64)"
    )]
    pub dot_size: f64,

    #[arg(
        long = "colormode",
        help_heading = "DISPLAY",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "log-file",
        value_name = "FILE",
        help_heading = "LOGGING",
        help = "Write logs to FILE instead of stderr"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        default_value = "warn",
        help_heading = "LOGGING",
        help = "Log filter when RUST_LOG is unset (e.g. info, claire=debug)"
    )]
    pub log_level: String,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}
