use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading layout settings or a classification vocabulary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML in {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid document reference pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("document reference pattern `{0}` has no capture group for the number")]
    MissingCapture(String),

    #[error("layout setting `{name}` is out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}
