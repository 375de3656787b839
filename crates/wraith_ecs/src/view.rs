//! Borrowed views of a single entity.

use std::fmt;

use crate::archetype::ArchetypeId;
use crate::component::{self, Component};
use crate::entity::{Entity, EntityRecord};
use crate::error::EcsError;
use crate::manager::EntityManager;
use crate::registry::ComponentRegistry;

/// Read-only access to one live entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    entity: Entity,
    record: &'a EntityRecord,
    registry: &'a ComponentRegistry,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(entity: Entity, record: &'a EntityRecord, registry: &'a ComponentRegistry) -> Self {
        Self {
            entity,
            record,
            registry,
        }
    }

    /// The entity handle.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// The archetype the entity currently belongs to.
    #[must_use]
    pub fn archetype(&self) -> ArchetypeId {
        self.record.archetype
    }

    /// `false` once the entity has been destroyed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.record.is_active()
    }

    /// `false` while the entity is disabled; default queries skip it.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.record.is_enabled()
    }

    /// `true` if eviction is postponed by one refresh after destruction.
    #[must_use]
    pub fn is_deferred_destroy(&self) -> bool {
        self.record.is_deferred_destroy()
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.record.components.len()
    }

    /// Returns `true` if the entity has a `T`.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        component::contains::<T>(&self.record.components, self.registry)
    }

    /// Borrows the entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity has no `T`.
    pub fn get<T: Component>(&self) -> Result<&'a T, EcsError> {
        component::lookup::<T>(&self.record.components, self.registry, self.entity)
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("entity", &self.entity)
            .field("record", self.record)
            .finish()
    }
}

/// Read-write access to one live entity.
///
/// Holds the manager mutably, so no refresh can run while it exists and the
/// entity cannot be evicted underneath it.
pub struct EntityMut<'a> {
    entity: Entity,
    manager: &'a mut EntityManager,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn new(entity: Entity, manager: &'a mut EntityManager) -> Self {
        Self { entity, manager }
    }

    /// The entity handle.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Downgrades to a read-only view.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity vanished, which
    /// cannot happen while this view is held.
    pub fn as_readonly(&self) -> Result<EntityRef<'_>, EcsError> {
        self.manager.entity(self.entity)
    }

    /// `false` once the entity has been destroyed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flag(EntityRecord::is_active)
    }

    /// `false` while the entity is disabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.flag(EntityRecord::is_enabled)
    }

    /// `true` if eviction is postponed by one refresh after destruction.
    #[must_use]
    pub fn is_deferred_destroy(&self) -> bool {
        self.flag(EntityRecord::is_deferred_destroy)
    }

    fn flag(&self, read: fn(&EntityRecord) -> bool) -> bool {
        self.manager.entities.get(self.entity).is_some_and(read)
    }

    fn update(&mut self, write: impl FnOnce(&mut EntityRecord)) -> &mut Self {
        if let Some(record) = self.manager.entities.get_mut(self.entity) {
            write(record);
        }
        self
    }

    /// Marks the entity for destruction.
    pub fn destroy(&mut self) -> &mut Self {
        self.update(EntityRecord::destroy)
    }

    /// Enables or disables the entity. Disabled entities are hidden from
    /// default queries.
    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.update(|record| record.set_enabled(enabled))
    }

    /// Sets the deferred-destroy flag; see [`EntityManager::set_deferred_destroy`].
    pub fn set_deferred_destroy(&mut self, deferred: bool) -> &mut Self {
        self.update(|record| record.set_deferred_destroy(deferred))
    }

    /// Returns `true` if the entity has a `T`.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.manager.has_component::<T>(self.entity)
    }

    /// See [`EntityManager::get_component`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity has no `T`.
    pub fn get<T: Component>(&self) -> Result<&T, EcsError> {
        self.manager.get_component::<T>(self.entity)
    }

    /// See [`EntityManager::get_component_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity has no `T`.
    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T, EcsError> {
        self.manager.get_component_mut::<T>(self.entity)
    }

    /// See [`EntityManager::add_component`].
    ///
    /// # Errors
    ///
    /// Propagates the component's attach hook error.
    pub fn add<T: Component>(&mut self, component: T) -> Result<&mut T, EcsError> {
        self.manager.add_component(self.entity, component)
    }

    /// Attaches `component` and returns the view for chaining.
    ///
    /// # Errors
    ///
    /// Propagates the component's attach hook error.
    pub fn with<T: Component>(&mut self, component: T) -> Result<&mut Self, EcsError> {
        self.manager.add_component(self.entity, component)?;
        Ok(self)
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMut")
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryFilter;

    #[derive(Debug, PartialEq)]
    struct Position(f32, f32);
    impl Component for Position {}

    struct Sprite;
    impl Component for Sprite {}

    #[test]
    fn test_entity_ref_reads() {
        let mut manager = EntityManager::new();
        let e = manager.create_entity();
        manager.add_component(e, Position(1.0, 2.0)).unwrap();

        let view = manager.entity(e).unwrap();
        assert_eq!(view.id(), e);
        assert!(view.is_active());
        assert!(view.is_enabled());
        assert!(!view.is_deferred_destroy());
        assert!(view.has::<Position>());
        assert!(!view.has::<Sprite>());
        assert_eq!(view.get::<Position>().unwrap(), &Position(1.0, 2.0));
        assert!(view.get::<Sprite>().is_err());
        assert_eq!(view.component_count(), 1);
        assert_ne!(view.archetype(), ArchetypeId::ROOT);
    }

    #[test]
    fn test_entity_mut_chaining() {
        let mut manager = EntityManager::new();
        let e = manager.create_entity();
        manager
            .entity_mut(e)
            .unwrap()
            .with(Position(0.0, 0.0))
            .unwrap()
            .with(Sprite)
            .unwrap()
            .set_enabled(false);

        assert!(manager.has_component::<Sprite>(e));
        assert!(!manager.entity(e).unwrap().is_enabled());
        assert!(manager.query_all::<(Position, Sprite)>(QueryFilter::LIVE).is_empty());
    }

    #[test]
    fn test_entity_mut_flags_and_components() {
        let mut manager = EntityManager::new();
        let e = manager.create_entity();
        let mut view = manager.entity_mut(e).unwrap();

        view.add(Position(1.0, 1.0)).unwrap().0 = 4.0;
        assert_eq!(view.get::<Position>().unwrap(), &Position(4.0, 1.0));
        view.get_mut::<Position>().unwrap().1 = 8.0;
        assert!(view.has::<Position>());

        view.set_deferred_destroy(true).destroy();
        assert!(!view.is_active());
        assert!(view.is_deferred_destroy());
        assert!(view.is_enabled());
        assert_eq!(view.as_readonly().unwrap().get::<Position>().unwrap(), &Position(4.0, 8.0));
    }

    #[test]
    fn test_entity_mut_rejects_stale_handle() {
        let mut manager = EntityManager::new();
        let e = manager.create_entity();
        manager.destroy(e).unwrap();
        manager.refresh();
        assert!(matches!(manager.entity_mut(e), Err(EcsError::EntityNotFound(_))));
        assert!(manager.entity(e).is_err());
    }
}
