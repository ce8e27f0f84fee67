use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
pub const DEFAULT_VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Runtime configuration, built once at startup and handed to whatever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub search_url: String,
    pub videos_url: String,
    pub upstream_timeout: Duration,
    pub bind_addr: String,
    pub static_dir: String,
    pub default_max_results: u32,
    pub max_aggregate_results: u32,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Config> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = get_required(&lookup, "YOUTUBE_API_KEY")?;
        let timeout_secs: u64 = get_parsed(&lookup, "UPSTREAM_TIMEOUT_SECS", 10)?;
        let default_max_results: u32 = get_parsed(&lookup, "DEFAULT_MAX_RESULTS", 12)?;
        let max_aggregate_results: u32 = get_parsed(&lookup, "MAX_AGGREGATE_RESULTS", 200)?;

        if max_aggregate_results == 0 {
            bail!("MAX_AGGREGATE_RESULTS must be at least 1");
        }

        Ok(Config {
            api_key,
            search_url: get_or_default(&lookup, "YOUTUBE_SEARCH_URL", DEFAULT_SEARCH_URL),
            videos_url: get_or_default(&lookup, "YOUTUBE_VIDEOS_URL", DEFAULT_VIDEOS_URL),
            upstream_timeout: Duration::from_secs(timeout_secs),
            bind_addr: get_or_default(&lookup, "BIND_ADDR", "127.0.0.1:5000"),
            static_dir: get_or_default(&lookup, "STATIC_DIR", "frontend"),
            default_max_results: default_max_results.clamp(1, max_aggregate_results),
            max_aggregate_results,
        })
    }
}

fn get_required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("Missing required environment variable: {key}"),
    }
}

fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
