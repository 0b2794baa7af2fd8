use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read config {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported config file {}: expected .toml or .json", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("invalid utility class `{id}`: {reason}")]
    InvalidUtilityClass { id: String, reason: String },

    #[error("custom property {name} is generated by both `{first}` and `{second}`")]
    DuplicateProperty {
        name: String,
        first: String,
        second: String,
    },
}

pub type Result<T, E = TokenError> = std::result::Result<T, E>;
