//! # Loop Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! tic_rate = 35
//! ticdup = 1
//! interpolate_frames = false
//! demos = ["DEMO1LMP", "DEMO2LMP", "DEMO3LMP"]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::clock::TICRATE;
use crate::error::ConfigError;

/// Scheduler and phase timing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoopConfig {
    /// Simulation tics per second.
    pub tic_rate: u32,
    /// Times each logical tic is replayed.
    pub ticdup: u32,
    /// Draw an extra frame of the previous state before simulating.
    pub interpolate_frames: bool,
    /// Run exactly the synchronized tics instead of pacing to wall time.
    pub new_sync: bool,
    /// Developer mode.
    pub devparm: bool,
    /// Sleep while waiting for peers, in milliseconds.
    pub wait_sleep_ms: u32,
    /// Per-iteration scratch budget in bytes.
    pub scratch_bytes: usize,
    /// Seconds the title waits with the main menu open before moving on.
    pub title_timeout_secs: u32,
    /// Seconds the legal page is shown.
    pub legal_secs: u32,
    /// Seconds each credit screen is held.
    pub credits_hold_secs: u32,
    /// Attract-mode demos, in order.
    pub demos: Vec<String>,
    /// Also play [`LoopConfig::demo4`].
    pub run_demo4: bool,
    /// Optional fourth demo.
    pub demo4: String,
    /// Demo played as the title map.
    pub title_map_demo: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tic_rate: TICRATE,
            ticdup: 1,
            interpolate_frames: false,
            new_sync: false,
            devparm: false,
            wait_sleep_ms: 1,
            scratch_bytes: 64 * 1024,
            title_timeout_secs: 30,
            legal_secs: 5,
            credits_hold_secs: 6,
            demos: vec![
                "DEMO1LMP".to_string(),
                "DEMO2LMP".to_string(),
                "DEMO3LMP".to_string(),
            ],
            run_demo4: false,
            demo4: "DEMO4LMP".to_string(),
            title_map_demo: "TITLEMAP".to_string(),
        }
    }
}

impl LoopConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for bad syntax or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`LoopConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded loop config");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tic_rate == 0 {
            return Err(ConfigError::Invalid("tic_rate must be positive".into()));
        }
        if self.ticdup == 0 {
            return Err(ConfigError::Invalid("ticdup must be at least 1".into()));
        }
        if i32::try_from(self.ticdup).is_err() {
            return Err(ConfigError::Invalid("ticdup is too large".into()));
        }
        Ok(())
    }

    /// Converts seconds to tics at the configured rate.
    #[must_use]
    pub fn secs_to_tics(&self, secs: u32) -> i32 {
        i32::try_from(u64::from(secs) * u64::from(self.tic_rate)).unwrap_or(i32::MAX)
    }

    /// The full attract-mode demo list, including the fourth if enabled.
    #[must_use]
    pub fn attract_demos(&self) -> Vec<&str> {
        let mut demos: Vec<&str> = self.demos.iter().map(String::as_str).collect();
        if self.run_demo4 {
            demos.push(&self.demo4);
        }
        demos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = LoopConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoopConfig::default());
        assert_eq!(config.secs_to_tics(config.title_timeout_secs), 35 * 30);
    }

    #[test]
    fn test_partial_document() {
        let config = LoopConfig::from_toml_str("ticdup = 3\nrun_demo4 = true\n").unwrap();
        assert_eq!(config.ticdup, 3);
        assert_eq!(
            config.attract_demos(),
            vec!["DEMO1LMP", "DEMO2LMP", "DEMO3LMP", "DEMO4LMP"]
        );
    }

    #[test]
    fn test_rejects_zero_ticdup() {
        let err = LoopConfig::from_toml_str("ticdup = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_tic_rate() {
        let err = LoopConfig::from_toml_str("tic_rate = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = LoopConfig::from_toml_str("tick_rate = 35").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = LoopConfig::load("/nonexistent/lockstep.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
