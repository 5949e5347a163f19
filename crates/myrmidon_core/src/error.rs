//! # Framework Error Types
//!
//! Every fallible operation in the core returns [`MyrmidonResult`].
//! Unknown state names are deliberately not errors; they are created
//! lazily when first switched to.

use thiserror::Error;

use crate::backend::BackendKind;
use crate::entity::EntityId;

/// Errors raised by the scheduler, backends and configuration.
#[derive(Error, Debug)]
pub enum MyrmidonError {
    /// The handle refers to an entity that was purged or never existed.
    #[error("stale entity handle {0:?}")]
    StaleEntity(EntityId),

    /// The entity arena is full.
    #[error("entity capacity exhausted: {capacity} slots in use")]
    EntityCapacity {
        /// Number of slots allocated at startup.
        capacity: usize,
    },

    /// A backend was used before one was configured.
    #[error("no {0} backend configured")]
    BackendUnavailable(BackendKind),

    /// The configuration names a backend the registry does not know.
    #[error("unknown {kind} backend: {name}")]
    UnknownBackend {
        /// Which backend slot was being resolved.
        kind: BackendKind,
        /// The name that failed to resolve.
        name: String,
    },

    /// An image, font or sound could not be loaded.
    #[error("failed to load asset {path}: {reason}")]
    AssetLoad {
        /// Path that was requested.
        path: String,
        /// Why the backend refused it.
        reason: String,
    },

    /// A frame was started from inside a running frame.
    #[error("a frame is already running")]
    FrameInProgress,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for framework operations.
pub type MyrmidonResult<T> = Result<T, MyrmidonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MyrmidonError::EntityCapacity { capacity: 8 };
        assert_eq!(err.to_string(), "entity capacity exhausted: 8 slots in use");

        let err = MyrmidonError::BackendUnavailable(BackendKind::Input);
        assert_eq!(err.to_string(), "no input backend configured");

        let err = MyrmidonError::UnknownBackend {
            kind: BackendKind::Gfx,
            name: "vulkan".into(),
        };
        assert_eq!(err.to_string(), "unknown gfx backend: vulkan");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MyrmidonError = io.into();
        assert!(matches!(err, MyrmidonError::Io(_)));
    }
}
