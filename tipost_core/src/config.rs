use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::DEFAULT_BASE_URL;
use crate::notice::DEFAULT_NOTICE_LIFETIME;

pub const DEFAULT_FETCH_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct TiPostConfig {
    pub api_base_url: String,
    pub fetch_limit: usize,
    pub notice_lifetime: Duration,
    pub paths: TiPostPaths,
}

impl TiPostConfig {
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("TIPOST_API_BASE_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let fetch_limit = env::var("TIPOST_FETCH_LIMIT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_FETCH_LIMIT);
        let notice_lifetime = env::var("TIPOST_NOTICE_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NOTICE_LIFETIME);
        let paths = match env::var("TIPOST_DATA_DIR") {
            Ok(raw) if !raw.trim().is_empty() => TiPostPaths::from_base_dir(raw),
            _ => TiPostPaths::discover()?,
        };
        Ok(Self {
            api_base_url,
            fetch_limit,
            notice_lifetime,
            paths,
        })
    }

    pub fn new(api_base_url: impl Into<String>, paths: TiPostPaths) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            notice_lifetime: DEFAULT_NOTICE_LIFETIME,
            paths,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TiPostPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
}

impl TiPostPaths {
    /// `~/.tipost`, or `./.tipost` when no home directory is known.
    pub fn discover() -> Result<Self> {
        let base = match dirs::home_dir() {
            Some(home) => home.join(".tipost"),
            None => env::current_dir()
                .context("failed to resolve current directory")?
                .join(".tipost"),
        };
        Ok(Self::from_base_dir(base))
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        Self { base, data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_lives_under_base() {
        let paths = TiPostPaths::from_base_dir("/tmp/tipost-test");
        assert_eq!(paths.data_dir, PathBuf::from("/tmp/tipost-test/data"));
    }

    #[test]
    fn explicit_config_uses_defaults() {
        let config = TiPostConfig::new("http://localhost:1", TiPostPaths::default());
        assert_eq!(config.fetch_limit, 10);
        assert_eq!(config.notice_lifetime, Duration::from_secs(3));
    }
}
