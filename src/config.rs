use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::round::RoundTiming;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timing: TimingConfig,
    pub ui: UiConfig,
}

/// Round pacing. These are UX tuning knobs, not derived values, which is
/// why they live in the config file instead of constants.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub countdown_secs: f32,
    pub capture_window_secs: f32,
    pub resolved_display_secs: f32,
    pub cooldown_secs: f32,
    /// Consecutive identical frames required before a gesture counts.
    pub dwell_frames: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub mirror_mode: bool,
    pub show_landmarks: bool,
    pub landmark_dot_size: usize,
    pub landmark_color_hex: String, // e.g. "#00FF00"
    pub hud_scale: usize,
    pub font_family: String,
    pub font_size_pt: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3.0,
            capture_window_secs: 2.5,
            resolved_display_secs: 2.0,
            cooldown_secs: 0.8,
            dwell_frames: 8,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mirror_mode: true,
            show_landmarks: true,
            landmark_dot_size: 2,
            landmark_color_hex: "#00FF00".to_string(),
            hud_scale: 2,
            font_family: "Monospace".to_string(),
            font_size_pt: 16,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl TimingConfig {
    pub fn round_timing(&self) -> RoundTiming {
        RoundTiming {
            countdown: Duration::from_secs_f32(self.countdown_secs),
            capture_window: Duration::from_secs_f32(self.capture_window_secs),
            resolved_display: Duration::from_secs_f32(self.resolved_display_secs),
            cooldown: Duration::from_secs_f32(self.cooldown_secs),
        }
    }
}

impl AppConfig {
    const PATH: &'static str = "config.json";

    pub fn load() -> Result<Self> {
        let config = if Path::new(Self::PATH).exists() {
            let content = fs::read_to_string(Self::PATH)?;
            // #[serde(default)] fills in any fields missing from an older file.
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    info!("loaded configuration from {}", Self::PATH);
                    c
                }
                Err(e) => {
                    warn!("error parsing config: {}. loading defaults", e);
                    Self::default()
                }
            }
        } else {
            info!("no configuration file, creating default at {}", Self::PATH);
            Self::default()
        };

        // Save back so new fields show up in the file.
        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::PATH, content)?;
        Ok(())
    }
}
