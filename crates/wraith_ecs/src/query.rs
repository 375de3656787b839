//! Query semantics: which archetypes qualify and which entities are admitted.
//!
//! A query is a [`QueryKind`] applied to a requested [`Signature`]:
//!
//! | kind    | archetype qualifies when                  |
//! |---------|-------------------------------------------|
//! | `All`   | its set is a superset of the request      |
//! | `Any`   | its set intersects the request            |
//! | `None`  | its set is disjoint from the request      |
//! | `Exact` | its set equals the request                |
//!
//! Every entity of a qualifying archetype is then passed through a
//! [`QueryFilter`] that hides destroyed and disabled entities by default.

use std::collections::BTreeSet;

use crate::archetype::Archetype;
use crate::component::{Component, ComponentKind};
use crate::entity::EntityRecord;
use crate::registry::ComponentRegistry;

/// The four archetype matching rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Archetype contains every requested kind.
    All,
    /// Archetype contains at least one requested kind.
    Any,
    /// Archetype contains none of the requested kinds.
    None,
    /// Archetype contains exactly the requested kinds.
    Exact,
}

impl QueryKind {
    /// Returns `true` if `archetype` qualifies for `signature`.
    #[must_use]
    pub fn matches(self, archetype: &Archetype, signature: &Signature) -> bool {
        match self {
            Self::All => {
                signature.is_resolved()
                    && signature.kinds.iter().all(|k| archetype.contains_kind(*k))
            }
            Self::Any => signature.kinds.iter().any(|k| archetype.contains_kind(*k)),
            Self::None => !signature.kinds.iter().any(|k| archetype.contains_kind(*k)),
            Self::Exact => signature.is_resolved() && archetype.has_signature(&signature.kinds),
        }
    }
}

/// Controls which entities of a qualifying archetype are returned.
///
/// The default excludes entities that were destroyed (inactive) and entities
/// that are disabled. Each flag only lifts its own exclusion: an entity that
/// is both inactive and disabled needs both flags to be returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Include entities marked for destruction but not yet evicted.
    pub include_inactive: bool,
    /// Include disabled entities.
    pub include_disabled: bool,
}

impl QueryFilter {
    /// Only active, enabled entities.
    pub const LIVE: QueryFilter = QueryFilter {
        include_inactive: false,
        include_disabled: false,
    };

    /// Every entity still in storage.
    pub const EVERYTHING: QueryFilter = QueryFilter {
        include_inactive: true,
        include_disabled: true,
    };

    /// Create a filter from both flags.
    #[must_use]
    pub const fn new(include_inactive: bool, include_disabled: bool) -> Self {
        Self {
            include_inactive,
            include_disabled,
        }
    }

    /// Also return inactive entities.
    #[must_use]
    pub const fn with_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    /// Also return disabled entities.
    #[must_use]
    pub const fn with_disabled(mut self) -> Self {
        self.include_disabled = true;
        self
    }

    pub(crate) fn admits(&self, record: &EntityRecord) -> bool {
        let hidden_inactive = !record.is_active() && !self.include_inactive;
        let hidden_disabled = !record.is_enabled() && !self.include_disabled;
        !(hidden_inactive || hidden_disabled)
    }
}

/// A requested set of component kinds.
///
/// Built from a [`ComponentSet`] type list, a type that was never registered
/// cannot be present on any archetype; it is counted as unresolved so that
/// `All` and `Exact` queries mentioning it match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    kinds: BTreeSet<ComponentKind>,
    unresolved: usize,
}

impl Signature {
    /// An empty request.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a signature from already-resolved kinds.
    #[must_use]
    pub fn from_kinds(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            unresolved: 0,
        }
    }

    /// Resolves `Q` against `registry`.
    #[must_use]
    pub fn of<Q: ComponentSet>(registry: &ComponentRegistry) -> Self {
        Q::signature(registry)
    }

    /// Adds a kind, or records an unresolved type for `None`.
    pub fn push(&mut self, kind: Option<ComponentKind>) {
        match kind {
            Some(kind) => {
                self.kinds.insert(kind);
            }
            None => self.unresolved += 1,
        }
    }

    /// The resolved kinds.
    #[must_use]
    pub fn kinds(&self) -> &BTreeSet<ComponentKind> {
        &self.kinds
    }

    /// Returns `true` if every requested type had a registered kind.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.unresolved == 0
    }
}

/// A statically known list of component types, used as a query parameter.
///
/// Implemented for `()` and for tuples of up to eight [`Component`] types.
pub trait ComponentSet {
    /// Resolves the listed types against `registry`.
    fn signature(registry: &ComponentRegistry) -> Signature;
}

macro_rules! impl_component_set {
    ($($name:ident),*) => {
        impl<$($name: Component),*> ComponentSet for ($($name,)*) {
            #[allow(unused_mut, unused_variables)]
            fn signature(registry: &ComponentRegistry) -> Signature {
                let mut signature = Signature::empty();
                $(signature.push(registry.kind_of::<$name>());)*
                signature
            }
        }
    };
}

impl_component_set!();
impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
