//! Engine error types.

use crate::entity::Entity;

/// Errors surfaced by the entity manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity does not carry a component of the requested type.
    #[error("component `{component}` not found on {entity}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// The handle refers to an entity that was never created or has since
    /// been evicted by a refresh.
    #[error("{0} does not exist")]
    EntityNotFound(Entity),

    /// Internal storage is inconsistent. This is never produced by correct
    /// use of the public API and should be treated as fatal.
    #[error("storage invariant violated: {0}")]
    InvariantViolation(String),
}

impl EcsError {
    /// Returns `true` for faults that indicate storage corruption.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}
