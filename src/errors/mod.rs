use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::selector::SelectionStrategy;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Selection Error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Configuration Error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Provisioning Error: {0}")]
    Util(#[from] UtilError),
}

/// Raised by the best-fit matcher when nothing in the catalog is big enough.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("no instance type found for the given {requested}")]
    NoMatchFound { requested: RequestedResources },
}

/// The dimensions of a request that could not be satisfied, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedResources {
    pub gpus: Option<u64>,
    pub vcpus: u64,
    pub memory: u64,
}

impl fmt::Display for RequestedResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gpus {
            Some(gpus) => write!(
                f,
                "GPUs ({}), vCPUs ({}), and memory ({})",
                gpus, self.vcpus, self.memory
            ),
            None => write!(f, "vcpus ({}) and memory ({})", self.vcpus, self.memory),
        }
    }
}

/// Raised when a candidate instance type is not permitted by the policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("requested instance type ({requested:?}) is not part of supported instance types list")]
    UnsupportedInstanceType { requested: String },

    #[error("requested instance type ({requested:?}) is not default ({default:?}) and supported instance types list is empty")]
    AmbiguousDefaultPolicy { requested: String, default: String },
}

/// Selector failures, tagged with the stage that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("failed to get instance type based on {stage} annotations: {source}")]
    Match {
        stage: SelectionStrategy,
        #[source]
        source: MatchError,
    },

    #[error("failed to verify instance type: {0}")]
    Verify(#[from] VerifyError),
}

impl SelectionError {
    pub fn is_no_match(&self) -> bool {
        matches!(self, SelectionError::Match { .. })
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {message}")]
    Invalid { message: String },
}

#[derive(Error, Debug)]
pub enum UtilError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SSH key file permissions are not 600: {path} (found {mode:o})")]
    KeyPermissions { path: PathBuf, mode: u32 },

    #[error("invalid SSH public key: {message}")]
    InvalidKey { message: String },
}

impl UtilError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UtilError::Io {
            path: path.into(),
            source,
        }
    }
}

// Result type alias for convenience
pub type SelectorResult<T> = Result<T, SelectorError>;
