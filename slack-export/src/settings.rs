use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::anyhow;
use config::{Config, File};
use log::debug;
use serde::Deserialize;

use crate::api::slack::DEFAULT_API_URL;
use crate::cli::Args;
use crate::fetch::DEFAULT_CHANNEL_TYPES;
use crate::paginate::DEFAULT_DELAY;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub slack_token: Option<String>,
    pub api_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub rate_limit_delay_ms: Option<u64>,
    pub channel_types: Option<String>,
}

/// Everything a command needs once CLI, config file and defaults are merged.
#[derive(Clone)]
pub struct RunConfig {
    pub token: String,
    pub api_url: String,
    pub output_dir: PathBuf,
    pub delay: Duration,
    pub channel_types: String,
}

// Never print the token
impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("token", &"***")
            .field("api_url", &self.api_url)
            .field("output_dir", &self.output_dir)
            .field("delay", &self.delay)
            .field("channel_types", &self.channel_types)
            .finish()
    }
}

const CONFIG_FILE_NAME: &str = env!("CARGO_PKG_NAME");
const DEFAULT_OUTPUT_DIR: &str = "./work";

// Function to get the XDG_CONFIG_HOME path
fn get_xdg_config_path() -> Option<PathBuf> {
    // First check XDG_CONFIG_HOME environment variable
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config));
    }

    // If XDG_CONFIG_HOME is not set, fall back to $HOME/.config
    if let Ok(home) = env::var("HOME") {
        return Some(PathBuf::from(home).join(".config"));
    }

    None
}

pub fn default_config_path() -> Option<PathBuf> {
    get_xdg_config_path().map(|dir| dir.join(CONFIG_FILE_NAME).join("config.toml"))
}

pub fn load_settings_from(config_path: &Path) -> anyhow::Result<Settings> {
    if !config_path.exists() {
        return Ok(Settings::default());
    }

    Config::builder()
        .add_source(File::from(config_path).required(false))
        .build()?
        .try_deserialize()
        .map_err(|e| {
            anyhow!(
                "Failed to deserialize config file {}: {}",
                config_path.display(),
                e
            )
        })
}

/// CLI values win over the config file, which wins over the defaults.
pub fn resolve(args: &Args, settings: Settings) -> anyhow::Result<RunConfig> {
    let token = args
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or(settings.slack_token.filter(|t| !t.is_empty()))
        .ok_or_else(|| anyhow!("Slack token is required, pass --token or set SLACK_TOKEN"))?;

    let config = RunConfig {
        token,
        api_url: args
            .api_url
            .clone()
            .or(settings.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        output_dir: args
            .output_dir
            .clone()
            .or(settings.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        delay: args
            .delay_ms
            .or(settings.rate_limit_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DELAY),
        channel_types: args
            .channel_types
            .clone()
            .or(settings.channel_types)
            .unwrap_or_else(|| DEFAULT_CHANNEL_TYPES.to_string()),
    };

    debug!("merged config: {:?}", config);

    Ok(config)
}

pub fn merge_settings_with_args(args: &Args) -> anyhow::Result<RunConfig> {
    let settings = match default_config_path() {
        Some(path) => load_settings_from(&path)?,
        None => Settings::default(),
    };
    resolve(args, settings)
}
