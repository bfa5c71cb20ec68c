use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub fn spendwise_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendwise"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(spendwise_home()?.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    /// "debit" or "credit"; used when --statement-type is not given.
    pub default_statement_type: Option<String>,
}

pub fn read_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Base URL precedence: CLI flag, then SPENDWISE_API, then config file,
/// then the local default.
pub fn resolve_base_url(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| std::env::var("SPENDWISE_API").ok().filter(|s| !s.is_empty()))
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
