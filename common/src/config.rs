use std::path::Path;
use std::str::FromStr;

use crate::ConfigResult as Result;

use serde::{Deserialize, Serialize};

/// Reveal cadence and host wiring for a dialog player.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    /// Seconds per revealed character.
    pub char_delay: f32,
    /// Seconds consumed by a `_` blank.
    pub blank_delay: f32,
    /// Fixed text shown before the revealed characters.
    pub dialog_prefix: String,
    pub char_sounds: Vec<String>,
    /// Printed characters between two character sounds.
    pub char_sound_skips: u32,
    /// Audio target handed to the store with every sound.
    pub audio_target: String,
    /// Number of response widgets the host provides.
    pub response_slots: usize,
    pub seed: Option<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            char_delay: 0.025,
            blank_delay: 0.5,
            dialog_prefix: "> ".to_string(),
            char_sounds: Vec::new(),
            char_sound_skips: 3,
            audio_target: "dialog".to_string(),
            response_slots: 2,
            seed: None,
        }
    }
}

impl PlayerConfig {
    pub fn load<T>(path: T) -> Result<PlayerConfig>
    where
        T: AsRef<Path>,
    {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(err) => {
                tracing::error!("Could not read config file `{}`", path.display());
                return Err(Box::new(err));
            }
        };

        let config: PlayerConfig = match toml::from_str(&contents) {
            Ok(d) => d,
            Err(err) => {
                tracing::error!("Unable to load config from `{}`", path.display());
                return Err(Box::new(err));
            }
        };

        Ok(config)
    }

    /// Cadence clamped so that a zero never silences the countdown forever.
    pub fn sound_cadence(&self) -> u32 {
        self.char_sound_skips.max(1)
    }
}

impl FromStr for PlayerConfig {
    type Err = toml::de::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
