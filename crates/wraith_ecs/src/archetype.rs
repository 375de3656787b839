//! Archetype definitions.
//!
//! An archetype is a fixed combination of component kinds. Every entity whose
//! signature equals that combination is listed in the same archetype, so a
//! query only has to test each archetype's set once and can then take all of
//! its entities wholesale.
//!
//! The component set is fixed at construction. Membership is mutated only by
//! the [`EntityManager`](crate::EntityManager) during migration and refresh.

use std::collections::BTreeSet;
use std::fmt;

use crate::component::ComponentKind;
use crate::entity::Entity;

/// A unique identifier for an archetype.
///
/// Identifiers are assigned in creation order and never reused, even after
/// the archetype is pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeId(pub u64);

impl ArchetypeId {
    /// The root archetype: empty signature, home of newly created entities.
    pub const ROOT: ArchetypeId = ArchetypeId(0);
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archetype({})", self.0)
    }
}

/// A group of entities sharing an identical set of component kinds.
#[derive(Debug, Clone)]
pub struct Archetype {
    id: ArchetypeId,
    kinds: BTreeSet<ComponentKind>,
    /// Member entities. Each member's position is mirrored in its record's
    /// `row`.
    entities: Vec<Entity>,
}

impl Archetype {
    pub(crate) fn new(id: ArchetypeId, kinds: BTreeSet<ComponentKind>) -> Self {
        Self {
            id,
            kinds,
            entities: Vec::new(),
        }
    }

    /// Returns the archetype identifier.
    #[must_use]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Returns `true` for the root archetype.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id == ArchetypeId::ROOT
    }

    /// The component kinds that define this archetype.
    #[must_use]
    pub fn kinds(&self) -> &BTreeSet<ComponentKind> {
        &self.kinds
    }

    /// Returns `true` if `kind` is part of this archetype's signature.
    #[must_use]
    pub fn contains_kind(&self, kind: ComponentKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Returns `true` if the signature is exactly `kinds`.
    #[must_use]
    pub fn has_signature(&self, kinds: &BTreeSet<ComponentKind>) -> bool {
        self.kinds.len() == kinds.len() && kinds.iter().all(|kind| self.contains_kind(*kind))
    }

    /// Member entities. Insertion order, except that a removal moves the
    /// last member into the vacated row.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the number of member entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity currently has this signature.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Appends `entity` and returns its row.
    pub(crate) fn insert(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Returns `true` if `entity` sits at `row`.
    pub(crate) fn is_at(&self, row: usize, entity: Entity) -> bool {
        self.entities.get(row) == Some(&entity)
    }

    /// Removes the member at `row` in constant time by moving the last member
    /// into it. Returns the moved entity, whose row is now `row`.
    pub(crate) fn swap_remove(&mut self, row: usize) -> Option<Entity> {
        if row >= self.entities.len() {
            return None;
        }
        self.entities.swap_remove(row);
        self.entities.get(row).copied()
    }

    pub(crate) fn retain_entities(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.entities.retain(keep);
    }
}
