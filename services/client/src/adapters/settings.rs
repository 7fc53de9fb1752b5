//! services/client/src/adapters/settings.rs
//!
//! A JSON-file implementation of the `SettingsStore` port. The whole file is
//! rewritten on every change; the last writer wins.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use storybook_core::{AppSettings, Language, PortError, PortResult, SettingsStore, Voice};
use tracing::warn;

/// On-disk representation of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
struct SettingsFile {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    device_id: Option<String>,
}

impl SettingsFile {
    fn to_domain(&self) -> AppSettings {
        AppSettings {
            language: self.language.clone().map(Language),
            voice: self.voice.as_deref().and_then(Voice::parse),
            device_id: self.device_id.clone(),
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("storybook-reader").join("settings.json")
}

pub struct JsonSettingsStore {
    path: PathBuf,
    cached: Mutex<SettingsFile>,
}

impl JsonSettingsStore {
    /// Opens the store, falling back to empty settings when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = load_or_default(&path);
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, change: impl FnOnce(&mut SettingsFile)) -> PortResult<()> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| PortError::Unexpected("settings lock poisoned".to_string()))?;
        change(&mut cached);
        save(&self.path, &cached)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> AppSettings {
        match self.cached.lock() {
            Ok(cached) => cached.to_domain(),
            Err(poisoned) => poisoned.into_inner().to_domain(),
        }
    }

    fn set_language(&self, language: &Language) -> PortResult<()> {
        self.update(|s| s.language = Some(language.code().to_string()))
    }

    fn set_voice(&self, voice: Voice) -> PortResult<()> {
        self.update(|s| s.voice = Some(voice.as_str().to_string()))
    }

    fn set_device_id(&self, device_id: &str) -> PortResult<()> {
        self.update(|s| s.device_id = Some(device_id.to_string()))
    }
}

fn load_or_default(path: &Path) -> SettingsFile {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str::<SettingsFile>(&contents).unwrap_or_else(|e| {
            warn!(path = %path.display(), "Ignoring unreadable settings file: {}", e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}

fn save(path: &Path, settings: &SettingsFile) -> PortResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| PortError::Precondition("settings path has no parent directory".into()))?;
    fs::create_dir_all(parent).map_err(|e| PortError::Unexpected(e.to_string()))?;
    let contents =
        serde_json::to_string_pretty(settings).map_err(|e| PortError::Unexpected(e.to_string()))?;
    fs::write(path, contents).map_err(|e| PortError::Unexpected(e.to_string()))
}
