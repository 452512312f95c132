#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read limits file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse limits TOML: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid limits: {message}")]
    InvalidLimits { message: String },
}

impl StandardsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidLimits {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
