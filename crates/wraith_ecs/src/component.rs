//! Core [`Component`] trait and component identity.
//!
//! Every piece of data attached to an entity implements [`Component`]. The
//! store treats components opaquely: it only needs each instance's
//! [`ComponentKind`], which the [`ComponentRegistry`] resolves once per Rust
//! type.
//!
//! A component may implement [`Component::on_attach`] to inspect or adjust
//! the components already attached to the same entity. Attachment order is
//! therefore significant and chosen by the caller.

use std::any::{Any, type_name};
use std::fmt;

use crate::entity::{ComponentMap, Entity};
use crate::error::EcsError;
use crate::registry::ComponentRegistry;

/// A stable identifier for a component type, assigned by the
/// [`ComponentRegistry`] in registration order.
///
/// Kinds are scoped to the registry that produced them, which is owned by
/// a single [`EntityManager`](crate::EntityManager). The same Rust type may
/// get different kinds in two managers, so never carry a kind across.
///
/// ```
/// use wraith_ecs::{Component, EntityManager};
///
/// struct A;
/// impl Component for A {}
/// struct B;
/// impl Component for B {}
///
/// let mut first = EntityManager::new();
/// let mut second = EntityManager::new();
/// first.register::<A>();
/// second.register::<B>();
/// assert_eq!(first.register::<A>(), second.register::<B>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(pub(crate) u32);

impl ComponentKind {
    /// Returns the registration index of this kind.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use wraith_ecs::{AttachContext, Component, EcsError, EntityManager};
///
/// struct Position { x: f32, y: f32 }
/// impl Component for Position {}
///
/// struct Label { text: String }
/// impl Component for Label {
///     fn on_attach(&mut self, ctx: &mut AttachContext<'_>) -> Result<(), EcsError> {
///         let pos = ctx.get::<Position>()?;
///         self.text = format!("{} @ ({}, {})", self.text, pos.x, pos.y);
///         Ok(())
///     }
/// }
///
/// let mut manager = EntityManager::new();
/// let e = manager.create_entity();
/// manager.add_component(e, Position { x: 1.0, y: 2.0 }).unwrap();
/// let label = manager.add_component(e, Label { text: "player".into() }).unwrap();
/// assert_eq!(label.text, "player @ (1, 2)");
/// ```
pub trait Component: Any {
    /// Runs once when the component is attached, before it becomes visible
    /// on the entity. `ctx` exposes the components attached earlier.
    ///
    /// Returning an error aborts the attachment: the component is not stored
    /// and the entity does not migrate. Edits already made to siblings
    /// through `ctx` are not rolled back, so fail before mutating.
    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) -> Result<(), EcsError> {
        let _ = ctx;
        Ok(())
    }
}

/// Object-safe view of a stored component, used for typed recovery.
pub(crate) trait ErasedComponent: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedComponent for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn not_found<T: Component>(entity: Entity) -> EcsError {
    EcsError::ComponentNotFound {
        entity,
        component: type_name::<T>(),
    }
}

/// Looks up the `T` stored in `components`.
pub(crate) fn lookup<'a, T: Component>(
    components: &'a ComponentMap,
    registry: &ComponentRegistry,
    entity: Entity,
) -> Result<&'a T, EcsError> {
    registry
        .kind_of::<T>()
        .and_then(|kind| components.get(&kind))
        .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
        .ok_or_else(|| not_found::<T>(entity))
}

/// Mutable counterpart of [`lookup`].
pub(crate) fn lookup_mut<'a, T: Component>(
    components: &'a mut ComponentMap,
    registry: &ComponentRegistry,
    entity: Entity,
) -> Result<&'a mut T, EcsError> {
    registry
        .kind_of::<T>()
        .and_then(|kind| components.get_mut(&kind))
        .and_then(|boxed| boxed.as_any_mut().downcast_mut::<T>())
        .ok_or_else(|| not_found::<T>(entity))
}

pub(crate) fn contains<T: Component>(components: &ComponentMap, registry: &ComponentRegistry) -> bool {
    registry
        .kind_of::<T>()
        .is_some_and(|kind| components.contains_key(&kind))
}

/// Access to an entity's existing components while a new one is attached.
pub struct AttachContext<'a> {
    entity: Entity,
    components: &'a mut ComponentMap,
    registry: &'a ComponentRegistry,
}

impl<'a> AttachContext<'a> {
    pub(crate) fn new(
        entity: Entity,
        components: &'a mut ComponentMap,
        registry: &'a ComponentRegistry,
    ) -> Self {
        Self {
            entity,
            components,
            registry,
        }
    }

    /// The entity receiving the component.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns `true` if a `T` was attached before this component.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        contains::<T>(self.components, self.registry)
    }

    /// Borrows a previously attached sibling component.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if no `T` is attached yet.
    pub fn get<T: Component>(&self) -> Result<&T, EcsError> {
        lookup::<T>(self.components, self.registry, self.entity)
    }

    /// Mutably borrows a previously attached sibling component.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if no `T` is attached yet.
    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T, EcsError> {
        lookup_mut::<T>(self.components, self.registry, self.entity)
    }
}

impl fmt::Debug for AttachContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachContext")
            .field("entity", &self.entity)
            .field("attached", &self.components.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {}

    #[derive(Debug)]
    struct Velocity;

    impl Component for Velocity {}

    fn setup() -> (ComponentMap, ComponentRegistry, Entity) {
        let mut registry = ComponentRegistry::new();
        let kind = registry.register::<Health>();
        registry.register::<Velocity>();

        let mut components: ComponentMap = HashMap::new();
        components.insert(
            kind,
            Box::new(Health {
                current: 80.0,
                max: 100.0,
            }),
        );
        (components, registry, Entity::new(1, 0))
    }

    #[test]
    fn test_lookup_present() {
        let (components, registry, entity) = setup();
        let health = lookup::<Health>(&components, &registry, entity).unwrap();
        assert_eq!(health.current, 80.0);
        assert!(contains::<Health>(&components, &registry));
    }

    #[test]
    fn test_lookup_missing_is_not_found() {
        let (components, registry, entity) = setup();
        let err = lookup::<Velocity>(&components, &registry, entity).unwrap_err();
        assert!(matches!(err, EcsError::ComponentNotFound { .. }));
        assert!(!contains::<Velocity>(&components, &registry));
    }

    #[test]
    fn test_attach_context_mutates_sibling() {
        let (mut components, registry, entity) = setup();
        {
            let mut ctx = AttachContext::new(entity, &mut components, &registry);
            assert_eq!(ctx.entity(), entity);
            assert!(ctx.has::<Health>());
            ctx.get_mut::<Health>().unwrap().current = 100.0;
        }
        let health = lookup::<Health>(&components, &registry, entity).unwrap();
        assert_eq!(
            health,
            &Health {
                current: 100.0,
                max: 100.0
            }
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ComponentKind(3).to_string(), "ComponentKind(3)");
        assert_eq!(ComponentKind(3).index(), 3);
    }
}
