//! Snapshot error types.

use crate::error::EntityKind;
use crate::model::EntityId;
use thiserror::Error;

/// Errors raised while saving or restoring a store snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot could not be encoded: {0}")]
    Encode(String),

    #[error("Snapshot could not be decoded: {0}")]
    Decode(String),

    /// Written by a newer or older release with a different layout.
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// An entity points at another entity the snapshot does not contain.
    #[error("{entity} {id} refers to missing {missing} {target}")]
    DanglingReference {
        entity: EntityKind,
        id: EntityId,
        missing: EntityKind,
        target: EntityId,
    },

    /// Restoring would hand out ids that are already taken.
    #[error("Id counter {next_id} is behind stored id {highest}")]
    IdCounterBehind { next_id: EntityId, highest: EntityId },
}
