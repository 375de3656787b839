use wraith_ecs::{EcsError, QueryFilter};

use crate::components::{Sprite, Transform};
use crate::engine::{FrameContext, System};

/// Keeps every sprite's destination rectangle in step with its transform.
#[derive(Debug, Default)]
pub struct SpriteSystem;

impl System for SpriteSystem {
    fn name(&self) -> &'static str {
        "sprite"
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EcsError> {
        for entity in ctx.manager.query_all::<(Sprite, Transform)>(QueryFilter::LIVE) {
            let transform = *ctx.manager.get_component::<Transform>(entity)?;
            ctx.manager.get_component_mut::<Sprite>(entity)?.layout(&transform);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use super::*;
    use crate::components::Rect;
    use crate::{Engine, EngineConfig};

    #[test]
    fn test_moves_with_transform() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.add_system(SpriteSystem).unwrap();
        let e = engine.create_entity().unwrap();
        engine.manager_mut().add_component(e, Sprite::new("hero", 0, 0, 16, 16)).unwrap();

        let transform = engine.manager_mut().get_component_mut::<Transform>(e).unwrap();
        transform.position = Vec2::new(5.0, 6.0);
        transform.scale = Vec2::new(2.0, 0.5);

        engine.frame(Duration::from_millis(16)).unwrap();
        let sprite = engine.manager().get_component::<Sprite>(e).unwrap();
        assert_eq!(sprite.dst_rect(), Rect::new(5, 6, 32, 8));
    }
}
