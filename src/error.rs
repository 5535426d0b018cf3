//! Error types for scene synchronization.
//!
//! Only conditions a caller can act on are errors. Lookups of ids that are no
//! longer registered are not errors anywhere in this crate: they resolve to
//! `None` or an empty list and the operation becomes a no-op.

use thiserror::Error;

use crate::data_structures::uniform::UniformKind;

/// Failures raised while building or updating render primitives.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A raw uniform carried a `type` tag this crate cannot convert.
    #[error("uniform type '{0}' not known")]
    UnknownUniformType(String),

    #[error("malformed texture descriptor: {0}")]
    MalformedTexture(String),

    #[error("texture references the atlas token '{0}' but no atlas has been set")]
    MissingAtlas(String),

    #[error("plot {plot} has no uniform named '{name}'")]
    UnknownUniform { plot: String, name: String },

    #[error("uniform '{name}' holds a {expected:?} value and cannot be updated with {found}")]
    UniformKindMismatch {
        name: String,
        expected: UniformKind,
        found: &'static str,
    },

    #[error("plot {plot} has no attribute named '{name}'")]
    UnknownAttribute { plot: String, name: String },

    #[error(
        "attribute '{name}' received {values} values for length {length}, but only {capacity} fit in place"
    )]
    AttributeOverflow {
        name: String,
        values: usize,
        length: usize,
        capacity: usize,
    },

    #[error("scene {0} is not registered")]
    UnknownScene(String),

    #[error("invalid description: {0}")]
    Description(#[from] serde_json::Error),
}
