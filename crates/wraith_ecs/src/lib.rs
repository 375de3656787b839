//! # wraith_ecs
//!
//! The composition-and-query engine of the Wraith 2-D framework: an
//! archetype-based entity/component store.
//!
//! This crate provides:
//!
//! - [`Component`] trait and [`ComponentKind`] identities, resolved by the
//!   [`ComponentRegistry`].
//! - [`Entity`] handles backed by a slot arena, so evicted entities can never
//!   be reached through an old handle.
//! - [`Archetype`] grouping of entities by exact component signature.
//! - [`EntityManager`]: creation, migration on attachment, the four query
//!   variants ([`QueryKind`]), and the per-frame [`refresh`] pass.
//!
//! ## Example
//!
//! ```rust
//! use wraith_ecs::{Component, EntityManager, QueryFilter};
//!
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {}
//!
//! let mut manager = EntityManager::new();
//! let a = manager.create_entity();
//! let b = manager.create_entity();
//! manager.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
//!
//! assert_eq!(manager.query_exact::<(Position,)>(QueryFilter::LIVE), vec![a]);
//! assert_eq!(manager.query_none::<(Position,)>(QueryFilter::LIVE), vec![b]);
//! ```
//!
//! [`refresh`]: EntityManager::refresh

pub mod archetype;
pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod manager;
pub mod query;
pub mod registry;
pub mod view;

pub use archetype::{Archetype, ArchetypeId};
pub use component::{AttachContext, Component, ComponentKind};
pub use config::ManagerConfig;
pub use entity::Entity;
pub use error::EcsError;
pub use manager::{EntityManager, RefreshReport};
pub use query::{ComponentSet, QueryFilter, QueryKind, Signature};
pub use registry::ComponentRegistry;
pub use view::{EntityMut, EntityRef};
