//! Entity handles and the slot arena that owns entity state.
//!
//! An [`Entity`] is a handle, not a pointer. It pairs a monotonically
//! increasing identifier (never reused within a process run) with the arena
//! slot the entity occupies. Slots are recycled once an entity is evicted,
//! but the identifier stored in the slot changes, so a stale handle fails its
//! lookup instead of aliasing the new occupant.

use std::collections::HashMap;
use std::fmt;

use crate::archetype::ArchetypeId;
use crate::component::ErasedComponent;
use crate::component::ComponentKind;

/// A handle to an entity owned by an [`EntityManager`](crate::EntityManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    id: u64,
    slot: u32,
}

impl Entity {
    pub(crate) const fn new(id: u64, slot: u32) -> Self {
        Self { id, slot }
    }

    /// Returns the entity's identifier. Identifiers start at 1 and are
    /// assigned in creation order.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }

    pub(crate) const fn slot(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Components attached to one entity, keyed by kind.
pub(crate) type ComponentMap = HashMap<ComponentKind, Box<dyn ErasedComponent>>;

/// Per-instance state of a live entity.
pub(crate) struct EntityRecord {
    /// The archetype whose signature equals the keys of `components`.
    pub(crate) archetype: ArchetypeId,
    /// Position of the entity in its archetype's member list.
    pub(crate) row: usize,
    active: bool,
    enabled: bool,
    deferred_destroy: bool,
    pub(crate) components: ComponentMap,
}

impl EntityRecord {
    pub(crate) fn new(archetype: ArchetypeId, row: usize) -> Self {
        Self {
            archetype,
            row,
            active: true,
            enabled: true,
            deferred_destroy: false,
            components: HashMap::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the entity inactive. It is evicted by a later refresh.
    pub(crate) fn destroy(&mut self) {
        self.active = false;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn is_deferred_destroy(&self) -> bool {
        self.deferred_destroy
    }

    pub(crate) fn set_deferred_destroy(&mut self, deferred: bool) {
        self.deferred_destroy = deferred;
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("archetype", &self.archetype)
            .field("row", &self.row)
            .field("active", &self.active)
            .field("enabled", &self.enabled)
            .field("deferred_destroy", &self.deferred_destroy)
            .field("components", &self.components.len())
            .finish()
    }
}

#[derive(Debug)]
struct Slot {
    /// Identifier of the current occupant, or of the last one if vacant.
    id: u64,
    record: Option<EntityRecord>,
}

/// Slot storage for entity records.
///
/// ```text
/// slots: [ (id 1, rec), (id 4, rec), (id 3, None) ]
/// free:  [ 2 ]            <- slot 2 is reused by the next insert
/// ```
#[derive(Debug)]
pub(crate) struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_id: u64,
    live: usize,
}

impl EntityArena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            next_id: 1,
            live: 0,
        }
    }

    /// Stores a record and returns the handle for it.
    pub(crate) fn insert(&mut self, record: EntityRecord) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        self.live += 1;

        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.id = id;
            entry.record = Some(record);
            return Entity::new(id, slot);
        }

        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            id,
            record: Some(record),
        });
        Entity::new(id, slot)
    }

    pub(crate) fn get(&self, entity: Entity) -> Option<&EntityRecord> {
        self.slots
            .get(entity.slot())
            .filter(|slot| slot.id == entity.id())
            .and_then(|slot| slot.record.as_ref())
    }

    pub(crate) fn get_mut(&mut self, entity: Entity) -> Option<&mut EntityRecord> {
        self.slots
            .get_mut(entity.slot())
            .filter(|slot| slot.id == entity.id())
            .and_then(|slot| slot.record.as_mut())
    }

    /// Removes and returns the record, freeing its slot for reuse.
    pub(crate) fn remove(&mut self, entity: Entity) -> Option<EntityRecord> {
        let slot = self
            .slots
            .get_mut(entity.slot())
            .filter(|slot| slot.id == entity.id())?;
        let record = slot.record.take()?;
        self.free.push(entity.slot);
        self.live -= 1;
        Some(record)
    }

    pub(crate) fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Iterates over every live entity and its record.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Entity, &EntityRecord)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let record = slot.record.as_ref()?;
            Some((Entity::new(slot.id, index as u32), record))
        })
    }
}
