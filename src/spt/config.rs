use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::SptError;
use crate::spt::paths::{default_cache_dir, default_config_path, env_or_default_path};

pub const DEFAULT_BASE_URL: &str = "https://cvb.wikidata.dbis.rwth-aachen.de";
pub const DEFAULT_BASE_PATH: &str = "ceur-ws";

/// Runtime configuration threaded into the snapshot cache and registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SptConfig {
    /// Root of the on-disk proceedings mirror (`{root}/Vol-<n>/`).
    pub base_path: PathBuf,
    /// Remote metadata endpoint serving `{base_url}/{collection}.json`.
    pub base_url: String,
    /// Directory holding one `{collection}.json` per snapshot.
    pub cache_dir: PathBuf,
}

impl SptConfig {
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
            cache_dir: cache_dir.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSptConfig {
    base_path: Option<PathBuf>,
    base_url: Option<String>,
    cache_dir: Option<PathBuf>,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

pub fn validate(cfg: &SptConfig) -> Result<(), SptError> {
    let url = cfg.base_url.trim();
    if url.is_empty() {
        return Err(SptError::InvalidConfig("base url cannot be empty".into()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SptError::InvalidConfig(format!(
            "base url must use http or https: {url}"
        )));
    }
    if cfg.base_path.as_os_str().is_empty() {
        return Err(SptError::InvalidConfig("base path cannot be empty".into()));
    }
    if cfg.cache_dir.as_os_str().is_empty() {
        return Err(SptError::InvalidConfig("cache dir cannot be empty".into()));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("CEURSPT_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    default_config_path()
}

fn merge_file_config(base: &mut SptConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialSptConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse ceurspt config {}: {err}", path.display()))?;
    if let Some(base_path) = parsed.base_path {
        base.base_path = base_path;
    }
    if let Some(base_url) = parsed.base_url {
        base.base_url = base_url;
    }
    if let Some(cache_dir) = parsed.cache_dir {
        base.cache_dir = cache_dir;
    }
    Ok(())
}

fn apply_overrides(cfg: &mut SptConfig, overrides: &ConfigOverrides) {
    if let Some(base_path) = &overrides.base_path {
        cfg.base_path = base_path.clone();
    }
    if let Some(base_url) = &overrides.base_url {
        cfg.base_url = base_url.clone();
    }
    if let Some(cache_dir) = &overrides.cache_dir {
        cfg.cache_dir = cache_dir.clone();
    }
}

pub fn load_config(overrides: &ConfigOverrides) -> Result<SptConfig> {
    let mut cfg = SptConfig::new(DEFAULT_BASE_PATH, DEFAULT_BASE_URL, default_cache_dir()?);
    merge_file_config(&mut cfg)?;

    cfg.base_path = env_or_default_path("CEURSPT_BASE_PATH", cfg.base_path);
    cfg.base_url = env_or_string("CEURSPT_BASE_URL", &cfg.base_url);
    cfg.cache_dir = env_or_default_path("CEURSPT_CACHE_DIR", cfg.cache_dir);
    apply_overrides(&mut cfg, overrides);
    cfg.base_url = cfg.base_url.trim().trim_end_matches('/').to_string();

    validate(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_http_base_url() {
        let cfg = SptConfig::new("ceur-ws", "ftp://example.org", "/tmp/cache");
        let err = validate(&cfg).expect_err("ftp must be rejected");
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn validate_accepts_defaults() {
        let cfg = SptConfig::new(DEFAULT_BASE_PATH, DEFAULT_BASE_URL, "/tmp/cache");
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn overrides_win_over_existing_values() {
        let mut cfg = SptConfig::new("a", "https://a.example", "/a");
        let overrides = ConfigOverrides {
            base_path: Some(PathBuf::from("b")),
            base_url: None,
            cache_dir: Some(PathBuf::from("/b")),
        };
        apply_overrides(&mut cfg, &overrides);
        assert_eq!(cfg.base_path, PathBuf::from("b"));
        assert_eq!(cfg.base_url, "https://a.example");
        assert_eq!(cfg.cache_dir, PathBuf::from("/b"));
    }

    #[test]
    fn partial_file_config_parses_subset() {
        let parsed: PartialSptConfig =
            toml::from_str("base_url = \"https://cvb.example\"\n").expect("parse");
        assert_eq!(parsed.base_url.as_deref(), Some("https://cvb.example"));
        assert!(parsed.base_path.is_none());
    }
}
