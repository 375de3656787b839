//! Demo scene: a grid of animated sprites with staggered lifetimes.

use std::time::Duration;

use glam::Vec2;
use tracing::info;
use wraith_ecs::{EcsError, Entity};

use crate::components::{Animation, Clip, Lifetime, Sprite, Transform};
use crate::engine::Engine;

const COLUMNS: usize = 16;
const CELL: f32 = 40.0;

/// Spawn `count` animated sprites. Every fourth sprite gets no lifetime,
/// every third lifetime is deferred.
///
/// # Errors
///
/// Propagates attach failures.
pub fn spawn(engine: &mut Engine, count: usize) -> Result<Vec<Entity>, EcsError> {
    let mut entities = Vec::with_capacity(count);
    for i in 0..count {
        let entity = engine.create_entity()?;
        let manager = engine.manager_mut();

        let position = Vec2::new((i % COLUMNS) as f32 * CELL, (i / COLUMNS) as f32 * CELL);
        *manager.get_component_mut::<Transform>(entity)? = Transform::from_position(position);

        manager
            .entity_mut(entity)?
            .with(Sprite::new("hero", 0, 0, 32, 32))?
            .with(hero_animation())?;

        if i % 4 != 0 {
            let mut lifetime = Lifetime::new(Duration::from_millis(250 * (1 + i as u64 % 8)));
            if i % 3 == 0 {
                lifetime = lifetime.deferred();
            }
            manager.add_component(entity, lifetime)?;
        }
        entities.push(entity);
    }

    info!(
        entities = engine.manager().entity_count(),
        archetypes = engine.manager().archetype_count(),
        "scene spawned"
    );
    Ok(entities)
}

fn hero_animation() -> Animation {
    let mut animation = Animation::new(Clip::new("walk", "hero", 4, Duration::from_millis(100)));
    animation.add_clip(Clip::new("die", "hero", 6, Duration::from_millis(80)).once().on_row(1));
    animation
}

#[cfg(test)]
mod tests {
    use wraith_ecs::QueryFilter;

    use super::*;
    use crate::EngineConfig;
    use crate::systems::{AnimationSystem, LifetimeSystem, SpriteSystem};

    #[test]
    fn test_spawn_builds_two_signatures() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let entities = spawn(&mut engine, 8).unwrap();

        assert_eq!(entities.len(), 8);
        let manager = engine.manager();
        assert_eq!(manager.query_all::<(Sprite, Animation)>(QueryFilter::LIVE).len(), 8);
        assert_eq!(manager.query_none::<(Lifetime,)>(QueryFilter::LIVE).len(), 2);
        // Root, then T, T+S, T+S+A, T+S+A+L.
        assert_eq!(manager.archetype_count(), 5);
        manager.verify_integrity().unwrap();
    }

    #[test]
    fn test_scene_drains_to_immortals() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.add_system(LifetimeSystem).unwrap();
        engine.add_system(AnimationSystem).unwrap();
        engine.add_system(SpriteSystem).unwrap();
        spawn(&mut engine, 16).unwrap();

        // Longest lifetime is 2 s; one extra frame covers deferred destroys.
        for _ in 0..22 {
            engine.frame(Duration::from_millis(100)).unwrap();
        }
        assert_eq!(engine.manager().entity_count(), 4);
        engine.manager().verify_integrity().unwrap();
    }
}
