//! Error type shared by the profile store and the activation engine.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("configuration with name '{0}' already exists")]
    DuplicateName(String),

    #[error("configuration with name '{0}' not found")]
    NotFound(String),

    #[error("cannot delete active configuration '{0}', activate another configuration first")]
    ActiveProfileDeletion(String),

    #[error("failed to parse config file {}: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("value for {0} contains a NUL byte")]
    InvalidEnvValue(&'static str),

    #[error("failed to serialize {0}: {1}")]
    Serialize(&'static str, #[source] serde_json::Error),
}

impl ProfileError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
