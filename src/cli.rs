// src/cli.rs

//! Command-line surface of `rpmsg-bind-chardev`.
//!
//! `-h` and `-?` print usage and exit with status 1, so clap's own help flag
//! is disabled and handled in `main.rs`.

use crate::batch::{BatchRequest, Mode};
use crate::config::model::parse_duration;
use clap::{ArgAction, CommandFactory, Parser};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[command(
    name = "rpmsg-bind-chardev",
    about = "Bind RPMsg devices to rpmsg_chrdev and create their endpoints",
    disable_help_flag = true
)]
pub struct Cli {
    /// Device prefix; devices are <prefix><offset+i>
    #[arg(short = 'p', long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Unbind devices instead of binding them
    #[arg(short = 'u', long)]
    pub unbind: bool,

    /// Number of devices
    #[arg(short = 'n', long, default_value = "1", value_parser = parse_int, allow_negative_numbers = true)]
    pub count: i64,

    /// Local address of the first endpoint (required to bind)
    #[arg(short = 's', long, value_parser = parse_int, allow_negative_numbers = true)]
    pub start_address: Option<i64>,

    /// Start endpoint (reserved, currently ignored)
    #[arg(short = 'e', long, value_parser = parse_int, allow_negative_numbers = true)]
    pub start_endpoint: Option<i64>,

    /// Numeric suffix of the first device [default: start address if given, else 0]
    #[arg(short = 'o', long, value_parser = parse_int, allow_negative_numbers = true)]
    pub offset: Option<i64>,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How long to wait for the control node after binding, e.g. 500ms
    #[arg(short = 't', long, value_parser = parse_timeout)]
    pub probe_timeout: Option<Duration>,

    /// Unbind a device again if endpoint setup fails after the bind
    #[arg(long)]
    pub unbind_on_failure: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print usage
    #[arg(short = 'h', long, short_alias = '?', action = ArgAction::SetTrue)]
    pub help: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.unbind {
            Mode::Unbind
        } else {
            Mode::Bind { start_address: self.start_address.unwrap_or(-1) }
        }
    }

    /// Batch parameters, unvalidated.
    pub fn to_request(&self) -> BatchRequest {
        let mode = self.mode();
        // bind and unbind with the same -s/-n must name the same devices
        let offset = self
            .offset
            .or(self.start_address.filter(|s| *s >= 0))
            .unwrap_or(0);
        BatchRequest {
            prefix: self.prefix.clone().unwrap_or_default(),
            offset,
            count: self.count,
            mode,
        }
    }
}

/// Rendered usage text.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Parse a whole string the way `strtol(s, &end, 0)` does, requiring
/// `end` to reach the end: `16`, `0x10`, `020` and `-1` are all accepted.
pub fn parse_int(s: &str) -> Result<i64, String> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None if body.len() > 1 && body.starts_with('0') => (8, &body[1..]),
        None => (10, body),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(format!("'{s}' is not a number"));
    }
    let value = i64::from_str_radix(digits, radix).map_err(|e| format!("'{s}': {e}"))?;
    Ok(if negative { -value } else { value })
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}
