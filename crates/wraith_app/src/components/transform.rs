//! 2D transform component.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use wraith_ecs::Component;

/// Position, scale, and rotation in world space.
///
/// Every entity made through [`Engine::create_entity`](crate::Engine::create_entity)
/// starts with the identity transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// World-space position.
    pub position: Vec2,
    /// Per-axis scale factor.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Transform {
    /// The identity transform: origin, unit scale, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn translated(mut self, offset: Vec2) -> Self {
        self.position += offset;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_builders() {
        let t = Transform::from_position(Vec2::new(3.0, 4.0))
            .with_scale(Vec2::splat(2.0))
            .translated(Vec2::new(1.0, -1.0));
        assert_eq!(t.position, Vec2::new(4.0, 3.0));
        assert_eq!(t.scale, Vec2::splat(2.0));
    }

    #[test]
    fn test_serde_json() {
        let t = Transform::from_position(Vec2::new(1.0, 2.0));
        let json = serde_json::to_string(&t).unwrap();
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
