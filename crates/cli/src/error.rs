//! CLI failures and how they are reported.
//!
//! | exit | kind            | cause                                         |
//! |------|-----------------|-----------------------------------------------|
//! | 2    |                 | clap argument error, before `run` starts      |
//! | 10   | `mask`          | a mask operation failed (dimensions, bounds)  |
//! | 11   | `io`            | a PNG could not be read or written            |
//! | 12   | `input`         | `--params` is not valid JSON                  |
//! | 13   | `serialization` | JSON output could not be produced             |
//! | 14   | `configuration` | an option named a bad value                   |

use mask_forge_core::MaskError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Mask(MaskError),

    /// An option held an unknown name or an out-of-range value.
    #[error("invalid value for '{field}': {value}")]
    Configuration { field: String, value: String },

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Input(String),

    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Mask(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Configuration { .. } => 14,
        }
    }

    /// Short machine-readable category, reported as `kind` under `--json`.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Mask(_) => "mask",
            CliError::Configuration { .. } => "configuration",
            CliError::Io(_) => "io",
            CliError::Input(_) => "input",
            CliError::Serialization(_) => "serialization",
        }
    }

    /// The `--json` error object. Configuration errors also carry the
    /// offending `field` and `value`.
    pub fn to_json(&self) -> Value {
        let mut report = json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "exit_code": self.exit_code(),
        });
        if let CliError::Configuration { field, value } = self {
            report["field"] = json!(field);
            report["value"] = json!(value);
        }
        report
    }
}

impl From<MaskError> for CliError {
    fn from(e: MaskError) -> Self {
        match e {
            MaskError::Io(msg) => CliError::Io(msg),
            MaskError::InvalidConfiguration { field, value } => {
                CliError::Configuration { field, value }
            }
            other => CliError::Mask(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
