//! # Error Types
//!
//! Errors for entity reconstruction, world access and configuration.
//!
//! Entity errors are local to a single record. The tree builder logs them
//! and turns them into `None`; they never cross the reconstruction boundary.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while turning a record into an entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    /// The record carries no kind identifier.
    #[error("record has no entity kind identifier")]
    MissingKind,

    /// The kind identifier is not registered.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    /// A field the kind requires is absent.
    #[error("kind {kind} requires field `{field}`")]
    MissingField {
        /// The kind being deserialized.
        kind: String,
        /// The absent field.
        field: String,
    },

    /// A field is present but has the wrong shape.
    #[error("malformed field `{field}`: {reason}")]
    MalformedField {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A passenger lists itself or one of its mounts as a rider.
    #[error("passenger cycle: entity {0} rides itself or one of its mounts")]
    Cycle(Uuid),

    /// The passenger chain is nested deeper than allowed.
    #[error("passenger depth {depth} exceeds limit {limit}")]
    DepthExceeded {
        /// Depth of the rejected record (root is 0).
        depth: usize,
        /// Configured limit.
        limit: usize,
    },
}

/// Result type for entity reconstruction.
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors reported by a world collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// The query volume is larger than the world allows in one query.
    #[error("query volume {volume} exceeds limit {limit}")]
    QueryTooLarge {
        /// Requested volume.
        volume: f64,
        /// Allowed volume.
        limit: f64,
    },

    /// The query box has non-finite coordinates.
    #[error("query bounds are not finite")]
    InvalidBounds,
}

/// Result type for world access.
pub type WorldResult<T> = Result<T, WorldError>;

/// Errors loading or validating configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),

    /// The TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Parsed, but a value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
