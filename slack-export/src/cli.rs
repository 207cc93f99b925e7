use std::{fmt, path::PathBuf};

use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Slack API token
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory receiving one timestamped folder per run
    #[arg(long, env = "SLACK_EXPORT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Milliseconds to wait between two pages of the same listing
    #[arg(long, value_name = "MS", global = true)]
    pub delay_ms: Option<u64>,

    /// Channel types to list, comma separated (e.g. "public_channel,private_channel")
    #[arg(long, global = true)]
    pub channel_types: Option<String>,

    /// Log verbosity
    #[arg(short, long, value_name = "LEVEL", default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Dump channels, users, messages and thread replies (default)
    Export(ExportArgs),

    /// Print the ID of the channel with the given name
    ChannelId { name: String },

    /// Print the real name of a user
    UserName { user_id: String },

    /// Post a message to a channel
    Post {
        channel_id: String,
        text: String,

        /// Reply in the thread with this timestamp
        #[arg(long)]
        thread_ts: Option<String>,

        /// User ID to mention, can be repeated
        #[arg(long = "mention", value_name = "USER_ID")]
        mentions: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Only messages after this time (Slack ts, RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_time_bound)]
    pub oldest: Option<String>,

    /// Only messages before this time (Slack ts, RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_time_bound)]
    pub latest: Option<String>,

    /// Do not draw the channel progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Turns a user supplied bound into a Slack timestamp string.
pub fn parse_time_bound(value: &str) -> Result<String, String> {
    let value = value.trim();

    let is_slack_ts = match value.split_once('.') {
        Some((secs, fraction)) => is_digits(secs) && is_digits(fraction),
        None => is_digits(value),
    };
    if is_slack_ts {
        return Ok(value.to_string());
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(format!(
            "{}.{:06}",
            datetime.timestamp(),
            datetime.timestamp_subsec_micros()
        ));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(format!("{}.000000", midnight.and_utc().timestamp()));
    }

    Err(format!(
        "invalid time '{}', expected a Slack timestamp, RFC 3339 or YYYY-MM-DD",
        value
    ))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn is_verbose(self) -> bool {
        matches!(self, LogLevel::Trace | LogLevel::Debug)
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}
