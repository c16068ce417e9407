//! Persisted connection and view settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::Zoom;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// User settings (lives in the OS config directory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Server root, without the `/api` suffix.
    pub base_url: String,
    pub project_id: u64,
    /// JWT access token sent as a bearer token.
    pub access_token: Option<String>,
    pub pixels_per_day: f32,
    pub min_pixels_per_day: f32,
    pub max_pixels_per_day: f32,
    pub request_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        let zoom = Zoom::default();
        Self {
            base_url: "http://localhost:8000".into(),
            project_id: 1,
            access_token: None,
            pixels_per_day: zoom.pixels_per_day(),
            min_pixels_per_day: zoom.min,
            max_pixels_per_day: zoom.max,
            request_timeout_secs: 15,
        }
    }
}

impl AppSettings {
    pub fn zoom(&self) -> Zoom {
        Zoom::new(
            self.pixels_per_day,
            self.min_pixels_per_day,
            self.max_pixels_per_day,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Reads and writes [`AppSettings`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store in the platform config directory, or `./settings.json` when
    /// no home directory can be resolved.
    pub fn new() -> Self {
        let path = directories::ProjectDirs::from("", "", "ClickPMTimeline")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"));
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// Missing or unreadable files yield defaults; missing keys fall back
    /// individually.
    pub fn load(&self) -> AppSettings {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return AppSettings::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring unreadable settings {:?}: {}", self.path, e);
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(settings)?;
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        std::fs::create_dir_all(self.dir()).map_err(write_err)?;
        std::fs::write(&self.path, json).map_err(write_err)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"base_url": "https://pm.example.com", "project_id": 7}"#)
                .unwrap();
        assert_eq!(settings.base_url, "https://pm.example.com");
        assert_eq!(settings.project_id, 7);
        assert_eq!(settings.access_token, None);
        assert_eq!(settings.min_pixels_per_day, 10.0);
        assert_eq!(settings.max_pixels_per_day, 60.0);
    }

    #[test]
    fn zoom_from_settings_is_clamped() {
        let settings = AppSettings {
            pixels_per_day: 500.0,
            ..AppSettings::default()
        };
        assert_eq!(settings.zoom().pixels_per_day(), 60.0);
        assert_eq!(
            AppSettings { request_timeout_secs: 0, ..AppSettings::default() }.request_timeout(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("nested").join("settings.json"));
        assert_eq!(store.load(), AppSettings::default());

        let settings = AppSettings {
            project_id: 42,
            access_token: Some("token".into()),
            ..AppSettings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.json"));
        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), AppSettings::default());
    }
}
