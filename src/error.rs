//! Error types for scene construction and configuration.
//!
//! The numerical core (forces, geometry) never fails; everything here is
//! raised once, at setup time, or by the interactive API when it is handed an
//! id that does not exist.

use crate::graph::BodyId;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("two records produce the same body key: {key}")]
    DuplicateBody { key: String },

    #[error("edge references a body that does not exist: {key}")]
    UnknownBody { key: String },

    #[error("invalid configuration value for `{field}`: {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("{id} cannot be dragged")]
    NotADragTarget { id: BodyId },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
