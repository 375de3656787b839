//! # wraith_app
//!
//! The frame loop around a [`wraith_ecs::EntityManager`]: an [`Engine`] that
//! runs [`System`]s in order and refreshes the world after each frame, plus
//! the built-in 2D components and systems.

pub mod components;
pub mod config;
pub mod engine;
pub mod scene;
pub mod systems;

pub use config::EngineConfig;
pub use engine::{Engine, FrameContext, System};
