//! Inklaunch replay tool
//!
//! Replays a JSON script of pointer and key events through the launcher
//! input core and prints one JSON line per resolved outcome.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use inklaunch::replay::{self, Script};
use inklaunch::LauncherConfig;

#[derive(Parser, Debug)]
#[command(name = "inklaunch")]
#[command(about = "Replay input scripts through the inklaunch input core", long_about = None)]
struct Args {
    /// Config file (defaults to $XDG_CONFIG_HOME/inklaunch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Event script (JSON)
    script: PathBuf,
}

/// `$XDG_STATE_HOME/inklaunch`, falling back to `~/.local/state` and `/tmp`
fn state_dir() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join("inklaunch")
}

/// Append panics to `crash.log` as well as stderr
fn record_panics(dir: &Path) {
    let crash_log = dir.join("crash.log");
    std::panic::set_hook(Box::new(move |panic_info| {
        eprintln!("PANIC: {}", panic_info);
        let file = OpenOptions::new().create(true).append(true).open(&crash_log);
        if let Ok(mut f) = file {
            let _ = writeln!(f, "[{}] PANIC: {}", chrono::Local::now(), panic_info);
        }
    }));
}

/// stderr plus a daily `replay.log`. `RUST_LOG` overrides the level.
fn init_logging(dir: &Path, debug: bool) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, "replay.log"));

    let level = if debug { "debug,inklaunch=debug" } else { "warn,inklaunch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    guard
}

fn main() -> Result<()> {
    let dir = state_dir();
    fs::create_dir_all(&dir).ok();
    record_panics(&dir);

    let args = Args::parse();
    let _guard = init_logging(&dir, args.debug);
    info!(log_path = %dir.display(), "inklaunch replay starting");

    let config = match &args.config {
        Some(path) => LauncherConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LauncherConfig::load(),
    };

    let script = Script::load(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;

    let (lines, collaborators) = replay::run(&script, &config);

    let mut out = std::io::stdout().lock();
    for line in &lines {
        writeln!(out, "{}", serde_json::to_string(line)?)?;
    }

    info!(
        events = script.events.len(),
        outcomes = lines.len(),
        requests = collaborators.requests.len(),
        "replay done"
    );
    Ok(())
}
