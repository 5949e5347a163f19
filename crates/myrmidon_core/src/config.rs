//! # Game Configuration
//!
//! Loaded once at startup, from TOML or built in code. Every field has a
//! default so an empty file is a valid configuration.
//!
//! ```toml
//! target_fps = 60
//! screen_resolution = [800, 600]
//!
//! [backends]
//! gfx = "headless"
//! input = "none"
//! ```

use std::path::Path;

use myrmidon_shared::{DEFAULT_MAX_ENTITIES, DEFAULT_RESOLUTION, DEFAULT_TARGET_FPS};
use serde::{Deserialize, Serialize};

use crate::error::{MyrmidonError, MyrmidonResult};

/// Names of the backends to construct, resolved through a
/// [`BackendRegistry`](crate::backend::BackendRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSelection {
    /// Window and clock backend
    pub window: String,
    /// Rendering backend
    pub gfx: String,
    /// Input backend
    pub input: String,
    /// Audio backend
    pub audio: String,
}

impl Default for BackendSelection {
    fn default() -> Self {
        Self {
            window: "dummy".into(),
            gfx: "dummy".into(),
            input: "dummy".into(),
            audio: "dummy".into(),
        }
    }
}

/// Top level framework configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Frames per second the main loop paces to
    pub target_fps: u32,
    /// Window size in pixels
    pub screen_resolution: (u32, u32),
    /// Open the window full screen
    pub full_screen: bool,
    /// Entity slots allocated at startup
    pub max_entities: usize,
    /// Log a warning when a frame takes over twice its budget
    pub slow_frame_warning: bool,
    /// Backend names
    pub backends: BackendSelection,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            screen_resolution: DEFAULT_RESOLUTION,
            full_screen: false,
            max_entities: DEFAULT_MAX_ENTITIES,
            slow_frame_warning: true,
            backends: BackendSelection::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns `InvalidConfig` on malformed TOML or rejected values.
    pub fn from_toml_str(source: &str) -> MyrmidonResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| MyrmidonError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`GameConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> MyrmidonResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if serialization fails.
    pub fn to_toml_string(&self) -> MyrmidonResult<String> {
        toml::to_string(self).map_err(|e| MyrmidonError::InvalidConfig(e.to_string()))
    }

    /// Rejects values the scheduler cannot run with.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the offending field.
    pub fn validate(&self) -> MyrmidonResult<()> {
        if self.target_fps == 0 {
            return Err(MyrmidonError::InvalidConfig(
                "target_fps must be greater than zero".into(),
            ));
        }
        if self.max_entities == 0 {
            return Err(MyrmidonError::InvalidConfig(
                "max_entities must be greater than zero".into(),
            ));
        }
        if u32::try_from(self.max_entities).is_err() {
            return Err(MyrmidonError::InvalidConfig(
                "max_entities does not fit an entity index".into(),
            ));
        }
        Ok(())
    }

    /// Frame budget in milliseconds.
    #[must_use]
    pub fn frame_budget_ms(&self) -> f64 {
        1000.0 / f64::from(self.target_fps.max(1))
    }

    /// Headless configuration: no input or audio, unpaced clock.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            backends: BackendSelection {
                window: "headless".into(),
                gfx: "dummy".into(),
                input: "none".into(),
                audio: "none".into(),
            },
            ..Self::default()
        }
    }
}
