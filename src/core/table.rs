//! Tables of allowed status edges.

use super::state::State;
use crate::error::{EntityKind, WorkflowError, WorkflowResult};

/// The set of `(from, to)` edges a status machine accepts.
///
/// Edges out of a terminal status are rejected even if listed, so a table
/// can never reopen a finished entity.
#[derive(Clone, Debug)]
pub struct TransitionTable<S: State> {
    entity: EntityKind,
    edges: Vec<(S, S)>,
}

impl<S: State> TransitionTable<S> {
    pub fn new(entity: EntityKind, edges: Vec<(S, S)>) -> Self {
        Self { entity, edges }
    }

    /// Whether `from -> to` is an allowed edge.
    pub fn allows(&self, from: &S, to: &S) -> bool {
        !from.is_final() && self.edges.iter().any(|(f, t)| f == from && t == to)
    }

    /// Every status reachable in one step from `from`.
    pub fn targets_from(&self, from: &S) -> Vec<&S> {
        if from.is_final() {
            return Vec::new();
        }
        self.edges
            .iter()
            .filter(|(f, _)| f == from)
            .map(|(_, t)| t)
            .collect()
    }

    /// Validate an edge, failing with [`WorkflowError::InvalidTransition`].
    pub fn check(&self, from: &S, to: &S) -> WorkflowResult<()> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                entity: self.entity,
                from: from.name().to_string(),
                to: to.name().to_string(),
            })
        }
    }
}
