use wraith_ecs::{EcsError, QueryFilter};

use crate::components::{Animation, Sprite};
use crate::engine::{FrameContext, System};

/// Advances sprite-sheet animations from elapsed engine time.
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl System for AnimationSystem {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EcsError> {
        for entity in ctx.manager.query_all::<(Animation, Sprite)>(QueryFilter::LIVE) {
            let update = ctx.manager.get_component_mut::<Animation>(entity)?.advance(ctx.elapsed);
            update.apply(ctx.manager.get_component_mut::<Sprite>(entity)?);
        }
        Ok(())
    }
}
