// src/main.rs

//! `rpmsg-bind-chardev` entry point.
//!
//! 1. Parse arguments (usage and exit 1 on `-h`, `-?` or bad input)
//! 2. Load configuration & set up logging
//! 3. Bind or unbind every requested device, continuing past failures
//! 4. Exit 0 only when every device succeeded

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use fern::Dispatch;
use log::{Level, LevelFilter};
use std::{
    path::{Path, PathBuf},
    process,
};

use rpmsg_bind::cli::{usage, Cli};
use rpmsg_bind::config::{self, model::level_from_str, LoggingConfig};
use rpmsg_bind::{run_batch, rpmsg_log, Binder};

// ───── helpers ──────────────────────────────────────────────────────────────

/// Print `msg` and the usage text, then return the failure status.
fn usage_failure(msg: &str) -> i32 {
    if !msg.is_empty() {
        eprintln!("{msg}");
    }
    println!("{}", usage());
    1
}

/// Directory that contains the running executable, if it can be resolved.
fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Configure global logging: info and below on stdout, warnings and errors
/// on stderr, plus an optional log file.
fn setup_logging(
    cfg: &LoggingConfig,
    level_override: Option<&str>,
    exe_dir: Option<&Path>,
) -> Result<(), fern::InitError> {
    let level = level_override.map_or_else(|| cfg.level_filter(), level_from_str);

    let log_path = cfg.enable.then(|| {
        let file = cfg.file.as_deref().unwrap_or("rpmsg-bind.log");
        exe_dir.map_or_else(|| PathBuf::from(file), |d| d.join(file))
    });

    let stdout = Dispatch::new()
        .filter(|meta| meta.level() > Level::Warn)
        .chain(std::io::stdout());
    let stderr = Dispatch::new()
        .level(LevelFilter::Warn)
        .chain(std::io::stderr());

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                msg
            ))
        })
        .level(level)
        .chain(stdout)
        .chain(stderr);

    if let Some(path) = log_path {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

// ───── main logic ───────────────────────────────────────────────────────────

fn run() -> Result<i32> {
    // 1 ─ Arguments
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return Ok(usage_failure(&e.to_string())),
    };
    if cli.help {
        return Ok(usage_failure(""));
    }
    if cli.prefix.is_none() {
        return Ok(usage_failure("device prefix (-p) is required"));
    }

    // 2 ─ Configuration & logging
    let exe_dir = exe_dir();
    let cfg = config::locate(cli.config.as_deref(), exe_dir.as_deref())
        .context("loading configuration")?;
    setup_logging(&cfg.logging, cli.log_level.as_deref(), exe_dir.as_deref())
        .context("setting up logging")?;

    if let Some(ep) = cli.start_endpoint {
        rpmsg_log!(Level::Warn, "main", "start endpoint {} is reserved and ignored", ep);
    }

    let mut options = cfg.bind.to_options().context("reading [bind] settings")?;
    if let Some(timeout) = cli.probe_timeout {
        options.probe_timeout = timeout;
    }
    options.unbind_on_failure |= cli.unbind_on_failure;

    // 3 ─ Batch
    let request = cli.to_request();
    let binder = Binder::new(cfg.bus.to_layout(), options);
    let report = match run_batch(&binder, &request) {
        Ok(report) => report,
        Err(e) => return Ok(usage_failure(&e.to_string())),
    };

    // 4 ─ Outcome (failures were already logged per device)
    println!(
        "{}: {}/{} device(s) succeeded",
        report.mode.verb(),
        report.succeeded(),
        report.total()
    );
    Ok(if report.is_success() { 0 } else { 1 })
}

fn main() {
    let code = run().unwrap_or_else(|e| {
        eprintln!("[{}][ERROR][main] {:#}", Local::now().to_rfc3339(), e);
        1
    });
    process::exit(code);
}
