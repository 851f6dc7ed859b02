use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn volt_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".volt"))
}

pub fn ensure_volt_home() -> Result<PathBuf> {
    let dir = volt_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// The fixed well-known location of the local record file.
pub fn bills_path() -> Result<PathBuf> {
    Ok(ensure_volt_home()?.join("bills.json"))
}
