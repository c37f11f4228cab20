use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{ColumnMapping, MacDecoding, OutputShape};

pub const DEFAULT_OUT_PATH: &str = "user_mac_mapping.csv";

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct InputConfig {
    pub old_path: String,
    pub mags_path: String,
    pub new_path: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct OutputConfig {
    pub out_path: String,
    pub shape: OutputShape,
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_path: DEFAULT_OUT_PATH.into(),
            shape: OutputShape::Flat,
            summary_path: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct MacConfig {
    pub decoding: MacDecoding,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct AppConfig {
    pub inputs: InputConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub mac: MacConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inputs.old_path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "inputs.old_path",
            });
        }
        if self.inputs.mags_path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "inputs.mags_path",
            });
        }
        if self.inputs.new_path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "inputs.new_path",
            });
        }
        if self.inputs.old_path == self.inputs.new_path {
            return Err(ConfigError::InvalidValue {
                field: "inputs.new_path",
                reason: format!("same file as old users: {}", self.inputs.old_path),
            });
        }
        for (field, value) in self.columns.entries() {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "column name must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// Validation for runs that write a report file.
    pub fn validate_for_output(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.output.out_path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "output.out_path",
            });
        }
        let inputs = [
            &self.inputs.old_path,
            &self.inputs.mags_path,
            &self.inputs.new_path,
        ];
        if inputs.iter().any(|p| **p == self.output.out_path) {
            return Err(ConfigError::InvalidValue {
                field: "output.out_path",
                reason: format!("would overwrite input file {}", self.output.out_path),
            });
        }
        Ok(())
    }
}
