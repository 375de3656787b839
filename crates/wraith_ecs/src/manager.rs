//! The entity manager: entity creation, archetype migration, queries, and
//! the per-frame refresh pass.
//!
//! ## Storage
//!
//! ```text
//! EntityManager
//!   registry:   TypeId -> ComponentKind
//!   entities:   slot arena of EntityRecord (flags + owned components)
//!   archetypes: [ root {}, {Transform}, {Transform, Sprite}, ... ]
//!                 ^ index 0, never pruned          insertion order
//! ```
//!
//! Entity records never move in memory when their archetype changes; only
//! the membership lists of the two archetypes involved are updated. Each
//! record stores its row in its archetype's list, so leaving an archetype is
//! a constant-time swap removal rather than a scan.
//!
//! ## Threading
//!
//! Every mutating operation takes `&mut self`, so the borrow checker enforces
//! the single-writer discipline. Query results are plain handle lists and
//! stay valid as handles, but the entities they name may be evicted by the
//! next [`EntityManager::refresh`].

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::archetype::{Archetype, ArchetypeId};
use crate::component::{self, AttachContext, Component, ComponentKind};
use crate::config::ManagerConfig;
use crate::entity::{Entity, EntityArena, EntityRecord};
use crate::error::EcsError;
use crate::query::{ComponentSet, QueryFilter, QueryKind, Signature};
use crate::registry::ComponentRegistry;
use crate::view::{EntityMut, EntityRef};

/// Summary of one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Entities evicted from storage (their components were dropped).
    pub removed: usize,
    /// Destroyed entities kept for one more cycle by deferred destroy.
    pub deferred: usize,
    /// Empty archetypes pruned. Non-zero only on cleanup cycles.
    pub pruned_archetypes: usize,
}

impl RefreshReport {
    /// Returns `true` if the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.deferred == 0 && self.pruned_archetypes == 0
    }
}

/// Owns every archetype and entity.
#[derive(Debug)]
pub struct EntityManager {
    config: ManagerConfig,
    pub(crate) registry: ComponentRegistry,
    pub(crate) entities: EntityArena,
    /// Index 0 is always the root archetype.
    archetypes: Vec<Archetype>,
    next_archetype_id: u64,
    last_cleanup: Instant,
}

impl EntityManager {
    /// Create a manager with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create a manager with the given settings.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            config,
            registry: ComponentRegistry::new(),
            entities: EntityArena::new(),
            archetypes: vec![Archetype::new(ArchetypeId::ROOT, BTreeSet::new())],
            next_archetype_id: ArchetypeId::ROOT.0 + 1,
            last_cleanup: Instant::now(),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Returns the component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Registers `T` ahead of its first attachment and returns its kind.
    pub fn register<T: Component>(&mut self) -> ComponentKind {
        self.registry.register::<T>()
    }

    // -- Entity lifecycle --

    /// Creates a component-less entity in the root archetype.
    pub fn create_entity(&mut self) -> Entity {
        let root = &mut self.archetypes[0];
        let entity = self.entities.insert(EntityRecord::new(ArchetypeId::ROOT, root.len()));
        root.insert(entity);
        trace!(%entity, "created entity");
        entity
    }

    /// Returns `true` if `entity` is still in storage (possibly inactive).
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Read access to one entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles.
    pub fn entity(&self, entity: Entity) -> Result<EntityRef<'_>, EcsError> {
        let record = self
            .entities
            .get(entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        Ok(EntityRef::new(entity, record, &self.registry))
    }

    /// Read-write access to one entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles.
    pub fn entity_mut(&mut self, entity: Entity) -> Result<EntityMut<'_>, EcsError> {
        if !self.entities.contains(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        Ok(EntityMut::new(entity, self))
    }

    fn record(&self, entity: Entity) -> Result<&EntityRecord, EcsError> {
        self.entities
            .get(entity)
            .ok_or(EcsError::EntityNotFound(entity))
    }

    fn record_mut(&mut self, entity: Entity) -> Result<&mut EntityRecord, EcsError> {
        self.entities
            .get_mut(entity)
            .ok_or(EcsError::EntityNotFound(entity))
    }

    /// Marks the entity inactive. It disappears from default queries at once
    /// and is evicted by a later [`refresh`](Self::refresh).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.record_mut(entity)?.destroy();
        Ok(())
    }

    /// Sets whether the entity is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles.
    pub fn set_enabled(&mut self, entity: Entity, enabled: bool) -> Result<(), EcsError> {
        self.record_mut(entity)?.set_enabled(enabled);
        Ok(())
    }

    /// Sets the deferred-destroy flag: a destroyed entity carrying it
    /// survives one extra refresh before eviction.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles.
    pub fn set_deferred_destroy(&mut self, entity: Entity, deferred: bool) -> Result<(), EcsError> {
        self.record_mut(entity)?.set_deferred_destroy(deferred);
        Ok(())
    }

    // -- Component operations --

    /// Attaches `component` to `entity` and migrates the entity to the
    /// archetype matching its new signature.
    ///
    /// The component's [`on_attach`](Component::on_attach) hook runs first
    /// and sees the components attached earlier. Attaching a kind the entity
    /// already has replaces the stored instance and leaves the archetype
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles, or whatever
    /// the hook returned. On a hook error `component` is dropped and the
    /// entity does not migrate, but edits the hook already made to sibling
    /// components are kept.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        mut component: T,
    ) -> Result<&mut T, EcsError> {
        let kind = self.registry.register::<T>();
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(EcsError::EntityNotFound(entity))?;

        component.on_attach(&mut AttachContext::new(
            entity,
            &mut record.components,
            &self.registry,
        ))?;

        if record.components.insert(kind, Box::new(component)).is_some() {
            debug!(%entity, %kind, "replaced component instance");
        } else {
            self.migrate(entity, kind)?;
        }

        self.get_component_mut::<T>(entity)
    }

    /// Returns `true` if the entity has a `T`. Stale handles have nothing.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|record| component::contains::<T>(&record.components, &self.registry))
    }

    /// Borrows the entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity has no `T`, or
    /// [`EcsError::EntityNotFound`] for stale handles.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        let record = self.record(entity)?;
        component::lookup::<T>(&record.components, &self.registry, entity)
    }

    /// Mutably borrows the entity's `T`.
    ///
    /// # Errors
    ///
    /// Same as [`get_component`](Self::get_component).
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        component::lookup_mut::<T>(&mut record.components, &self.registry, entity)
    }

    /// Moves `entity` from its current archetype to the one whose signature
    /// is the current one plus `added`, creating it if none exists.
    fn migrate(&mut self, entity: Entity, added: ComponentKind) -> Result<ArchetypeId, EcsError> {
        let (from, row) = {
            let record = self.record(entity)?;
            (record.archetype, record.row)
        };
        let source = self
            .archetypes
            .iter_mut()
            .find(|archetype| archetype.id() == from)
            .ok_or_else(|| {
                EcsError::InvariantViolation(format!("{entity} points at missing {from}"))
            })?;
        if !source.is_at(row, entity) {
            return Err(EcsError::InvariantViolation(format!(
                "{entity} is not at row {row} of its own {from}"
            )));
        }
        let moved = source.swap_remove(row);
        let mut kinds = source.kinds().clone();
        kinds.insert(added);

        if let Some(moved) = moved {
            self.record_mut(moved)?.row = row;
        }

        let (to, row) = match self
            .archetypes
            .iter_mut()
            .find(|archetype| archetype.has_signature(&kinds))
        {
            Some(target) => (target.id(), target.insert(entity)),
            None => {
                let id = ArchetypeId(self.next_archetype_id);
                self.next_archetype_id += 1;
                debug!(archetype = %id, components = kinds.len(), "created archetype");

                let mut archetype = Archetype::new(id, kinds);
                let row = archetype.insert(entity);
                self.archetypes.push(archetype);
                (id, row)
            }
        };

        let record = self.record_mut(entity)?;
        record.archetype = to;
        record.row = row;
        trace!(%entity, %from, %to, "migrated entity");
        Ok(to)
    }

    // -- Archetypes --

    /// The archetype `entity` currently belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for stale handles.
    pub fn archetype_of(&self, entity: Entity) -> Result<&Archetype, EcsError> {
        let id = self.record(entity)?.archetype;
        self.archetype(id).ok_or_else(|| {
            EcsError::InvariantViolation(format!("{entity} points at missing {id}"))
        })
    }

    /// Returns an archetype by ID, if it has not been pruned.
    #[must_use]
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.iter().find(|archetype| archetype.id() == id)
    }

    /// Iterates over archetypes in creation order, root first.
    pub fn archetypes(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// Returns the number of live archetypes, including the root.
    #[must_use]
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Returns the number of entities in storage, including inactive ones
    /// awaiting eviction.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- Queries --

    /// Runs a query for an already-resolved signature.
    ///
    /// Results are ordered by archetype, then by insertion into that
    /// archetype. `Exact` stops at the first qualifying archetype.
    #[must_use]
    pub fn query(&self, kind: QueryKind, signature: &Signature, filter: QueryFilter) -> Vec<Entity> {
        let mut result = Vec::new();
        for archetype in &self.archetypes {
            if !kind.matches(archetype, signature) {
                continue;
            }

            result.extend(archetype.entities().iter().copied().filter(|&entity| {
                self.entities
                    .get(entity)
                    .is_some_and(|record| filter.admits(record))
            }));

            if kind == QueryKind::Exact {
                break;
            }
        }
        result
    }

    /// Runs a query for a kind list known only at runtime.
    ///
    /// `kinds` must come from this manager's [`registry`](Self::registry).
    /// Kinds from another manager are plain indices here and match whatever
    /// this registry assigned to the same index.
    #[must_use]
    pub fn query_kinds(&self, kind: QueryKind, kinds: &[ComponentKind], filter: QueryFilter) -> Vec<Entity> {
        self.query(kind, &Signature::from_kinds(kinds.iter().copied()), filter)
    }

    /// Entities whose archetype contains every type in `Q`.
    #[must_use]
    pub fn query_all<Q: ComponentSet>(&self, filter: QueryFilter) -> Vec<Entity> {
        self.query(QueryKind::All, &Q::signature(&self.registry), filter)
    }

    /// Entities whose archetype contains at least one type in `Q`.
    #[must_use]
    pub fn query_any<Q: ComponentSet>(&self, filter: QueryFilter) -> Vec<Entity> {
        self.query(QueryKind::Any, &Q::signature(&self.registry), filter)
    }

    /// Entities whose archetype contains no type in `Q`.
    #[must_use]
    pub fn query_none<Q: ComponentSet>(&self, filter: QueryFilter) -> Vec<Entity> {
        self.query(QueryKind::None, &Q::signature(&self.registry), filter)
    }

    /// Entities whose archetype is exactly the types in `Q`.
    #[must_use]
    pub fn query_exact<Q: ComponentSet>(&self, filter: QueryFilter) -> Vec<Entity> {
        self.query(QueryKind::Exact, &Q::signature(&self.registry), filter)
    }

    // -- Refresh --

    /// Runs the per-frame maintenance pass at the current time.
    pub fn refresh(&mut self) -> RefreshReport {
        self.refresh_at(Instant::now())
    }

    /// Runs the per-frame maintenance pass as if the clock read `now`.
    ///
    /// 1. Every inactive entity is evicted, unless it carries the
    ///    deferred-destroy flag, in which case the flag is cleared and the
    ///    entity is kept for this cycle.
    /// 2. If at least `cleanup_interval` has passed since the last prune,
    ///    every empty archetype other than the root is dropped.
    pub fn refresh_at(&mut self, now: Instant) -> RefreshReport {
        let mut report = RefreshReport::default();
        let entities = &mut self.entities;

        for archetype in &mut self.archetypes {
            let before = archetype.len();
            archetype.retain_entities(|&entity| {
                let evict = match entities.get_mut(entity) {
                    None => true,
                    Some(record) if record.is_active() => false,
                    Some(record) if record.is_deferred_destroy() => {
                        record.set_deferred_destroy(false);
                        report.deferred += 1;
                        false
                    }
                    Some(_) => true,
                };
                if evict {
                    entities.remove(entity);
                    report.removed += 1;
                    trace!(%entity, "evicted entity");
                }
                !evict
            });

            if archetype.len() != before {
                for (row, &entity) in archetype.entities().iter().enumerate() {
                    if let Some(record) = entities.get_mut(entity) {
                        record.row = row;
                    }
                }
            }
        }

        if now.saturating_duration_since(self.last_cleanup) >= self.config.cleanup_interval {
            let before = self.archetypes.len();
            self.archetypes
                .retain(|archetype| archetype.is_root() || !archetype.is_empty());
            report.pruned_archetypes = before - self.archetypes.len();
            self.last_cleanup = now;

            if report.pruned_archetypes > 0 {
                info!(
                    pruned = report.pruned_archetypes,
                    remaining = self.archetypes.len(),
                    "pruned empty archetypes"
                );
            }
        }

        if !report.is_empty() {
            debug!(
                removed = report.removed,
                deferred = report.deferred,
                pruned = report.pruned_archetypes,
                "refresh"
            );
        }
        report
    }

    // -- Diagnostics --

    /// Checks every storage invariant.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvariantViolation`] describing the first broken
    /// invariant found.
    pub fn verify_integrity(&self) -> Result<(), EcsError> {
        let violation = |message: String| Err(EcsError::InvariantViolation(message));

        match self.archetypes.first() {
            Some(root) if root.is_root() && root.kinds().is_empty() => {}
            _ => return violation("root archetype missing or not empty-signature".into()),
        }

        for (i, a) in self.archetypes.iter().enumerate() {
            if let Some(b) = self.archetypes[i + 1..]
                .iter()
                .find(|b| b.has_signature(a.kinds()))
            {
                return violation(format!("{} and {} share a signature", a.id(), b.id()));
            }
        }

        let mut membership: HashMap<Entity, ArchetypeId> = HashMap::new();
        for archetype in &self.archetypes {
            for (row, &entity) in archetype.entities().iter().enumerate() {
                if membership.insert(entity, archetype.id()).is_some() {
                    return violation(format!("{entity} is listed in more than one archetype"));
                }
                let Some(record) = self.entities.get(entity) else {
                    return violation(format!("{} lists evicted {entity}", archetype.id()));
                };
                if record.archetype != archetype.id() {
                    return violation(format!(
                        "{entity} is listed in {} but points at {}",
                        archetype.id(),
                        record.archetype
                    ));
                }
                if record.row != row {
                    return violation(format!(
                        "{entity} sits at row {row} of {} but records row {}",
                        archetype.id(),
                        record.row
                    ));
                }
                if !archetype.has_signature(&record.components.keys().copied().collect::<BTreeSet<_>>()) {
                    return violation(format!(
                        "{entity} components differ from {} signature",
                        archetype.id()
                    ));
                }
            }
        }

        if let Some((entity, _)) = self
            .entities
            .iter()
            .find(|(entity, _)| !membership.contains_key(entity))
        {
            return violation(format!("{entity} is not listed in any archetype"));
        }

        Ok(())
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}
