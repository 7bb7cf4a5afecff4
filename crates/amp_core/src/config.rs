//! Module Configuration

use std::fs;
use std::path::Path;

use amp_platform::PcmConfig;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Amplifier module configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpConfig {
    /// Format of the feedback capture stream
    #[serde(default)]
    pub capture: PcmConfig,
}

impl AmpConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.capture.validate()
    }

    /// Load configuration from a JSON file, or return default if missing/corrupt
    pub fn load(path: &Path) -> Self {
        match fs::File::open(path) {
            Ok(file) => match serde_json::from_reader(file) {
                Ok(config) => {
                    info!("Config loaded from {:?}", path);
                    config
                }
                Err(e) => {
                    error!("Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to open config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AmpConfig::default();
        assert_eq!(config.capture, PcmConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut bad_capture = AmpConfig::default();
        bad_capture.capture.channels = 0;
        assert!(bad_capture.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AmpConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.capture.period_size, 256);
        assert_eq!(config.capture.period_count, 4);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let path = std::env::temp_dir().join("amp_core_config_does_not_exist.json");
        let config = AmpConfig::load(&path);
        assert_eq!(config, AmpConfig::default());
    }

    #[test]
    fn test_load_round_trip() {
        let path =
            std::env::temp_dir().join(format!("amp_core_config_{}.json", std::process::id()));
        let mut config = AmpConfig::default();
        config.capture.period_count = 8;
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = AmpConfig::load(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.capture.period_count, 8);
    }
}
