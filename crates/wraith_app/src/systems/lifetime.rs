use tracing::debug;
use wraith_ecs::{EcsError, QueryFilter};

use crate::components::Lifetime;
use crate::engine::{FrameContext, System};

/// Destroys entities whose [`Lifetime`] has run out.
#[derive(Debug, Default)]
pub struct LifetimeSystem;

impl System for LifetimeSystem {
    fn name(&self) -> &'static str {
        "lifetime"
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EcsError> {
        let mut expired = 0usize;
        for entity in ctx.manager.query_all::<(Lifetime,)>(QueryFilter::LIVE) {
            let lifetime = ctx.manager.get_component_mut::<Lifetime>(entity)?;
            if !lifetime.tick(ctx.dt) {
                continue;
            }
            let deferred = lifetime.deferred;
            if deferred {
                ctx.manager.set_deferred_destroy(entity, true)?;
            }
            ctx.manager.destroy(entity)?;
            expired += 1;
        }
        if expired > 0 {
            debug!(frame = ctx.frame, expired, "lifetimes expired");
        }
        Ok(())
    }
}
