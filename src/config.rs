use crate::color::DisplayColors;
use crate::error::SimError;
use crate::params::SimulationParameters;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// User settings persisted between runs. Simulation state is never saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub params: SimulationParameters,
    pub background_hex: String,
    pub pattern_hex: String,
    pub fps_cap: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            params: SimulationParameters::default(),
            background_hex: "#FFFFFF".to_string(),
            pattern_hex: "#000000".to_string(),
            fps_cap: 30,
        }
    }
}

impl Settings {
    pub fn colors(&self) -> Result<DisplayColors, SimError> {
        DisplayColors::from_hex(&self.background_hex, &self.pattern_hex)
    }
}

pub fn settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "rdpaint", "rdpaint")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(dir.join("settings.json"))
}

/// Missing or unreadable files fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => log::warn!("ignoring {}: {e}", path.display()),
        }
    }
    Settings::default()
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file is not atomic on every platform
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("replacing {}", to.display()))?;
    Ok(())
}
