use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn tally_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}
