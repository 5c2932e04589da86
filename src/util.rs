use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, SecondsFormat, Utc};
use serde::Serialize;

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn today_iso_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn ensure_existing_directory(path: &Path, role: &str) -> Result<()> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("{role} root does not exist: {}", path.display()))?;
    if !metadata.is_dir() {
        anyhow::bail!("{role} root is not a directory: {}", path.display());
    }
    Ok(())
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// Formats a ratio in `[0, 1]` as a percentage with two decimals.
pub fn percent(value: f64) -> String {
    format!("{:.2}", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_json_pretty_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        write_json_pretty(&path, &serde_json::json!({"mean": 0.5})).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        assert!(written.contains("\"mean\": 0.5"));
    }

    #[test]
    fn ensure_existing_directory_rejects_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        assert!(ensure_existing_directory(dir.path(), "groundtruth").is_ok());
        assert!(ensure_existing_directory(&file, "groundtruth").is_err());
        assert!(ensure_existing_directory(&dir.path().join("missing"), "candidate").is_err());
    }

    #[test]
    fn percent_uses_two_decimals() {
        assert_eq!(percent(0.95), "95.00");
        assert_eq!(percent(1.0 / 3.0), "33.33");
    }
}
