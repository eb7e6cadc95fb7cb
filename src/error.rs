//! Error types for edgecfg.
//!
//! Every load failure is fatal to startup; callers never receive a
//! partially populated config.

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required field is missing or a value is malformed.
    #[error("invalid config field '{field}': {message}")]
    Validation { field: String, message: String },

    /// The descriptor is not in the expected structural shape.
    #[error("failed to parse {source_name}: {message}")]
    Parse { source_name: String, message: String },

    /// The descriptor source does not exist.
    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Map a read failure, keeping "not found" distinct from other IO errors.
    pub(crate) fn from_read(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("plugin '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("no plugin registered under '{0}'")]
    UnknownPlugin(String),

    #[error("plugin '{name}' rejected its options: {message}")]
    Configure { name: String, message: String },
}
