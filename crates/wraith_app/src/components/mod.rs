//! Built-in components.

mod animation;
mod lifetime;
mod sprite;
mod transform;

pub use animation::{Animation, Clip, SheetUpdate};
pub use lifetime::Lifetime;
pub use sprite::{Rect, Sprite};
pub use transform::Transform;
