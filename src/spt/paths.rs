use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

/// Remote host prefixes stripped from download locations.
pub const CEUR_WS_PREFIXES: &[&str] = &[
    "https://ceur-ws.org/",
    "http://ceur-ws.org/",
    "https://www.ceur-ws.org/",
    "http://www.ceur-ws.org/",
];

pub const CEUR_WS_BASE_URL: &str = "https://ceur-ws.org";

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

pub fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

/// Per-user snapshot cache directory (`~/.ceurws`).
pub fn default_cache_dir() -> Result<PathBuf> {
    Ok(required_home_dir()?.join(".ceurws"))
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".ceurws").join("ceurspt.toml"))
}

pub fn volume_dir_name(number: u32) -> String {
    format!("Vol-{number}")
}

pub fn volume_dir(root: &Path, number: u32) -> PathBuf {
    root.join(volume_dir_name(number))
}

/// Key under which a paper and its author-index record are indexed.
pub fn paper_key(volume: u32, stem: &str) -> String {
    format!("Vol-{volume}/{stem}")
}

pub fn volume_key_prefix(volume: u32) -> String {
    format!("Vol-{volume}/")
}

pub fn default_volume_url(number: u32) -> String {
    format!("{CEUR_WS_BASE_URL}/Vol-{number}/")
}

pub fn default_pdf_url(volume: u32, pdf_name: &str) -> String {
    format!("{CEUR_WS_BASE_URL}/Vol-{volume}/{pdf_name}")
}

/// Download location with the remote host and the `.pdf` extension removed,
/// e.g. `https://ceur-ws.org/Vol-3262/paper7.pdf` → `Vol-3262/paper7`.
pub fn base_path_from_location(location: &str) -> String {
    let trimmed = location.trim();
    let mut path = trimmed;
    for prefix in CEUR_WS_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            path = rest;
            break;
        }
    }
    strip_pdf_extension(path.trim_start_matches('/')).to_string()
}

/// Drop a trailing `.pdf`, in any letter case.
pub fn strip_pdf_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(4);
    match (name.get(..split), name.get(split..)) {
        (Some(head), Some(ext)) if ext.eq_ignore_ascii_case(".pdf") => head,
        _ => name,
    }
}

/// Split a `Vol-<n>/<stem>` base path into its parts.
pub fn split_base_path(base_path: &str) -> Option<(u32, String)> {
    let (vol, stem) = base_path.split_once('/')?;
    let number = vol.strip_prefix("Vol-")?.parse::<u32>().ok()?;
    if stem.is_empty() || stem.contains('/') {
        return None;
    }
    Some((number, stem.to_string()))
}
