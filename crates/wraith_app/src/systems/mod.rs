//! Built-in systems.

mod animation;
mod lifetime;
mod sprite;

pub use animation::AnimationSystem;
pub use lifetime::LifetimeSystem;
pub use sprite::SpriteSystem;
