use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// User choices remembered between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Last input root that was sampled from
    pub last_input_path: Option<PathBuf>,

    /// Last output root that was written to
    pub last_output_path: Option<PathBuf>,

    #[serde(default)]
    pub last_sample_size: Option<usize>,

    #[serde(default)]
    pub last_seed: Option<u64>,
}

impl Settings {
    /// Platform config location, e.g. `~/.config/yolo-frame-sampler/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "yolo-frame-sampler")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the platform location
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("Could not determine config directory. Using defaults.");
                Self::default()
            }
        }
    }

    /// Load settings from `path`, or defaults if missing or corrupted
    pub fn load_from(path: &Path) -> Self {
        info!("Loading settings from: {:?}", path);

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Failed to parse settings file: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file found. Using defaults.");
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read settings file: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Save settings to the platform location
    pub fn save(&self) {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => warn!("Could not determine config directory. Settings not saved."),
        }
    }

    /// Save settings to `path`; failures are logged, never fatal
    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => info!("Settings saved to: {:?}", path),
                Err(e) => warn!("Failed to write settings file: {}", e),
            },
            Err(e) => warn!("Failed to serialize settings: {}", e),
        }
    }
}
