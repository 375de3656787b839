//! Component identity registry.
//!
//! Maps each Rust component type to a [`ComponentKind`]. Registration is
//! explicit and idempotent: registering a type twice returns the kind handed
//! out the first time. Kinds are never removed or reused.
//!
//! Each [`EntityManager`](crate::EntityManager) owns its own registry, so a
//! kind is only meaningful to the manager whose registry issued it.

use std::any::{TypeId, type_name};
use std::collections::HashMap;

use crate::component::{Component, ComponentKind};

/// Registry of component kinds known to one entity manager.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    kinds: HashMap<TypeId, ComponentKind>,
    /// Type names, indexed by `ComponentKind::index`.
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the kind for `T`, registering it on first use.
    pub fn register<T: Component>(&mut self) -> ComponentKind {
        if let Some(&kind) = self.kinds.get(&TypeId::of::<T>()) {
            return kind;
        }

        let kind = ComponentKind(self.names.len() as u32);
        self.kinds.insert(TypeId::of::<T>(), kind);
        self.names.push(type_name::<T>());
        tracing::trace!(component = type_name::<T>(), %kind, "registered component kind");
        kind
    }

    /// Returns the kind for `T` if it has been registered.
    #[must_use]
    pub fn kind_of<T: Component>(&self) -> Option<ComponentKind> {
        self.kinds.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the type name a kind was registered with.
    #[must_use]
    pub fn name(&self, kind: ComponentKind) -> Option<&'static str> {
        self.names.get(kind.index() as usize).copied()
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health;
    impl Component for Health {}

    struct Velocity;
    impl Component for Velocity {}

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        let first = registry.register::<Health>();
        let second = registry.register::<Health>();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_types_get_distinct_kinds() {
        let mut registry = ComponentRegistry::new();
        let health = registry.register::<Health>();
        let velocity = registry.register::<Velocity>();
        assert_ne!(health, velocity);
        assert_eq!(registry.kind_of::<Velocity>(), Some(velocity));
    }

    #[test]
    fn test_kinds_are_scoped_to_their_registry() {
        let mut first = ComponentRegistry::new();
        let mut second = ComponentRegistry::new();
        first.register::<Health>();
        second.register::<Velocity>();
        let health_in_second = second.register::<Health>();

        assert_ne!(first.kind_of::<Health>(), Some(health_in_second));
        assert_eq!(first.kind_of::<Health>(), second.kind_of::<Velocity>());
    }

    #[test]
    fn test_unregistered_kind_is_none() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.kind_of::<Health>(), None);
    }

    #[test]
    fn test_name_lookup() {
        let mut registry = ComponentRegistry::new();
        let kind = registry.register::<Health>();
        assert!(registry.name(kind).unwrap().ends_with("Health"));
        assert_eq!(registry.name(ComponentKind(99)), None);
    }
}
