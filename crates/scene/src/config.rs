//! Scene configuration. Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tier::DeviceTier;

/// How bystanders celebrate once the actor reaches its final stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CelebrationStyle {
    /// Jump and spin in place while still wandering.
    #[default]
    JumpSpin,
    /// Gather on a circle around the center, ordered by name, then jump.
    Formation,
}

/// Persistent scene settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Host viewport width in logical pixels; picks the device tier.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Force the constrained (`true`) or full (`false`) tier regardless of width.
    #[serde(default)]
    pub constrained: Option<bool>,
    /// Length of the weapon swing in seconds.
    #[serde(default = "default_attack_duration")]
    pub attack_duration: f32,
    #[serde(default)]
    pub celebration_style: CelebrationStyle,
    /// Fixed RNG seed. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Ticks the headless driver runs before stopping.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
    /// RON file holding saved participant lists. In-memory only when absent.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Name of the list the driver draws from (created on first run).
    #[serde(default = "default_list_name")]
    pub list_name: String,
    /// Participants used when the list does not exist yet.
    #[serde(default = "default_participants")]
    pub participants: Vec<String>,
}

fn default_viewport_width() -> u32 {
    1280
}
fn default_attack_duration() -> f32 {
    1.5
}
fn default_max_ticks() -> u32 {
    900
}
fn default_list_name() -> String {
    "default".to_string()
}
fn default_participants() -> Vec<String> {
    ["Ana", "Beto", "Cara", "Dani", "Eli", "Fer", "Gabi", "Hugo"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            constrained: None,
            attack_duration: default_attack_duration(),
            celebration_style: CelebrationStyle::default(),
            seed: None,
            max_ticks: default_max_ticks(),
            store_path: None,
            list_name: default_list_name(),
            participants: default_participants(),
        }
    }
}

impl SceneConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str::<Self>(&data) {
                Ok(c) => return c.sanitized(),
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    pub fn tier(&self) -> DeviceTier {
        match self.constrained {
            Some(c) => DeviceTier::from_constrained(c),
            None => DeviceTier::from_viewport_width(self.viewport_width),
        }
    }

    fn sanitized(mut self) -> Self {
        if !(self.attack_duration.is_finite() && self.attack_duration > 0.0) {
            log::warn!(
                "attack_duration {} is not a positive number, using {}",
                self.attack_duration,
                default_attack_duration()
            );
            self.attack_duration = default_attack_duration();
        }
        self
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
