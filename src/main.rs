// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod config;
mod controller;
mod frame;
mod host;
mod logging;
mod palette;
mod rng;
mod scene;
mod scheduler;
mod shooting_star;
mod star;
mod surface;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::Canvas;
use crate::config::{color_enabled_stdout, default_params_usage_for_help, Args, SkyConfig};
use crate::controller::{Controller, ControllerError, SkyFailure};
use crate::frame::Frame;
use crate::host::TerminalHost;
use crate::palette::{detect_color_mode_auto, ColorMode};
use crate::rng::SkyRng;
use crate::surface::SurfaceHost;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

// Wake-up interval when no sky has a timer running.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn build_info() -> &'static str {
    env!("CLAIRE_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        Some(m) => ColorMode::from_flag(m).unwrap_or_else(|| {
            eprintln!("invalid --colormode: {} (allowed: 0,16,8,256,24,32)", m);
            std::process::exit(1);
        }),
        None => detect_color_mode_auto(),
    }
}

fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

#[derive(Default)]
struct PerfStats {
    wakeups: u64,
    updates: u64,
    paints: u64,
    drawn_frames: u64,
    stale_ticks: u64,
    work_sum_s: f64,
    work_max_s: f64,
}

impl PerfStats {
    fn print(&self, elapsed: Duration, controller: &Controller<Canvas>) {
        let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
        let wakeups = self.wakeups.max(1);
        let config = controller.config();
        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", config.fps);
        println!("  target_ups: {:.3}", config.ups);
        println!("  avg_fps: {:.3}", self.paints as f64 / elapsed_s);
        println!("  avg_ups: {:.3}", self.updates as f64 / elapsed_s);
        println!("  drawn_frames: {}", self.drawn_frames);
        println!("  stale_ticks: {}", self.stale_ticks);
        println!(
            "  avg_work_ms: {:.3}",
            self.work_sum_s / wakeups as f64 * 1000.0
        );
        println!("  max_work_ms: {:.3}", self.work_max_s * 1000.0);
        println!("  skies: {}", controller.len());
        println!("  timers: {}", controller.timers());
        for (id, scene) in controller.skies() {
            let red = scene.stars().iter().filter(|s| s.red_tinted).count();
            println!(
                "    {}: {}x{} px, {} stars ({} red), {} streaks, {} ticks, {} frames",
                id,
                scene.width(),
                scene.height(),
                scene.star_count(),
                red,
                scene.shooting_stars().len(),
                scene.ticks(),
                scene.frames()
            );
        }
    }
}

fn report_failures(failures: &[SkyFailure]) {
    for f in failures {
        eprintln!("sky `{}` not shown: {}", f.id, f.error);
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let config = SkyConfig::from_args(&args).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    if args.print_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let dot_size = require_f64_range("--dot-size", args.dot_size, 1.0, 64.0);
    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });
    let color_mode = detect_color_mode(&args);

    if let Err(e) = logging::init_logging(args.log_file.as_deref(), &args.log_level) {
        eprintln!("failed to set up logging: {}", e);
        std::process::exit(1);
    }

    let rng = match args.seed {
        Some(seed) => SkyRng::seeded(seed),
        None => SkyRng::from_os(),
    };
    let ids = unique_ids(&args.sky);

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h);
    info!(cols = w, rows = h, color_mode = color_mode.label(), "terminal ready");
    let mut host = TerminalHost::new(ids, w, h, dot_size);

    let start_time = Instant::now();
    let mut controller = Controller::new(config, rng);
    controller.on_start(move || {
        info!(
            startup_ms = start_time.elapsed().as_secs_f64() * 1000.0,
            "all skies running"
        );
    });
    let mut failures = controller.start_all(&mut host, start_time);
    if controller.is_empty() {
        warn!("no sky running until the terminal is resized");
    }

    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let mut stats = PerfStats::default();
    let mut running = true;

    while running {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            break;
        }

        let mut deadline = controller.next_due().unwrap_or(now + IDLE_POLL);
        if let Some(end) = end_time {
            deadline = deadline.min(end);
        }

        let mut pending_resize: Option<(u16, u16)> = None;
        if Terminal::poll_event(deadline.saturating_duration_since(now))? {
            while Terminal::poll_event(Duration::ZERO)? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => match (k.code, k.modifiers) {
                        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                            running = false
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }
        }
        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            info!(cols = nw, rows = nh, "terminal resized");
            host.set_size(nw, nh);
            frame = Frame::new(nw, nh);
            let now = Instant::now();
            for id in host.discover() {
                let result = if controller.get(&id).is_some() {
                    controller.resize(&id, &mut host, now)
                } else {
                    controller
                        .start(&id, &mut host, now)
                        .map(|_| ())
                        .map_err(ControllerError::from)
                };
                failures.retain(|f| f.id != id);
                if let Err(error) = result {
                    warn!(id = %id, %error, "sky lost on resize");
                    if let ControllerError::Surface(error) = error {
                        failures.push(SkyFailure { id, error });
                    }
                }
            }
        }

        let work_start = Instant::now();
        let report = controller.run_due(work_start);
        if report.paints > 0 {
            for (id, scene) in controller.skies() {
                if let Some(pane) = host.pane(id) {
                    frame.blit(scene.surface(), pane.col, color_mode);
                }
            }
            if frame.has_changes() {
                term.draw(&mut frame)?;
                stats.drawn_frames += 1;
            }
        }

        if args.perf_stats {
            let work_s = work_start.elapsed().as_secs_f64();
            stats.wakeups += 1;
            stats.updates += report.updates as u64;
            stats.paints += report.paints as u64;
            stats.stale_ticks += report.dropped as u64;
            stats.work_sum_s += work_s;
            stats.work_max_s = stats.work_max_s.max(work_s);
        }
    }

    drop(term);
    report_failures(&failures);

    if args.perf_stats {
        stats.print(start_time.elapsed(), &controller);
    }
    controller.stop_all();

    Ok(())
}
