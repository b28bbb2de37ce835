use crate::utils::error::{RankError, Result};
use crate::utils::validation::{validate_path, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub store_path: Option<String>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// "compact" (default) or "json"
    pub format: Option<String>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| RankError::InvalidConfigValue {
            field: "config".to_string(),
            value: path.to_string(),
            reason: err.to_string(),
        })?;
        let config: FileConfig =
            toml::from_str(&raw).map_err(|err| RankError::InvalidConfigValue {
                field: "config".to_string(),
                value: path.to_string(),
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn log_format(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|log| log.format.as_deref())
            .unwrap_or("compact")
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(store_path) = &self.store_path {
            validate_path("store_path", store_path)?;
        }
        if let Some(log) = &self.log {
            if let Some(format) = &log.format {
                match format.as_str() {
                    "compact" | "json" => {}
                    other => {
                        return Err(RankError::InvalidConfigValue {
                            field: "log.format".to_string(),
                            value: other.to_string(),
                            reason: "expected 'compact' or 'json'".to_string(),
                        })
                    }
                }
            }
        }
        Ok(())
    }
}
