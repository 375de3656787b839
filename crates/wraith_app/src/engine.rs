//! Frame loop.
//!
//! Each frame runs every registered [`System`] in registration order against
//! the entity manager, then refreshes the manager so entities destroyed
//! during the frame are evicted before the next one starts.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use wraith_ecs::{EcsError, Entity, EntityManager, RefreshReport};

use crate::components::Transform;
use crate::config::EngineConfig;

/// Everything a system can see while it updates.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// The world being simulated.
    pub manager: &'a mut EntityManager,
    /// 1-based index of the frame being run.
    pub frame: u64,
    /// Time step of this frame.
    pub dt: Duration,
    /// Simulated time since the engine started, including this frame.
    pub elapsed: Duration,
}

/// Per-frame logic over the entity manager.
pub trait System {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Called once when the system is added to the engine.
    ///
    /// # Errors
    ///
    /// A failure prevents the system from being registered.
    fn init(&mut self, manager: &mut EntityManager) -> Result<(), EcsError> {
        let _ = manager;
        Ok(())
    }

    /// Called once per frame.
    ///
    /// # Errors
    ///
    /// A failure aborts the frame before the refresh pass.
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EcsError>;
}

/// Owns the world and the ordered list of systems.
pub struct Engine {
    config: EngineConfig,
    manager: EntityManager,
    systems: Vec<Box<dyn System>>,
    frame: u64,
    elapsed: Duration,
}

impl Engine {
    /// Create an engine with an empty world.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not pass [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let manager = EntityManager::with_config(config.manager);
        Ok(Self {
            config,
            manager,
            systems: Vec::new(),
            frame: 0,
            elapsed: Duration::ZERO,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn manager(&self) -> &EntityManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EntityManager {
        &mut self.manager
    }

    /// Number of frames run so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Names of the registered systems, in update order.
    pub fn system_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|system| system.name())
    }

    /// Create an entity with a default [`Transform`] attached.
    ///
    /// # Errors
    ///
    /// Propagates failures from attaching the transform.
    pub fn create_entity(&mut self) -> Result<Entity, EcsError> {
        let entity = self.manager.create_entity();
        self.manager.add_component(entity, Transform::default())?;
        Ok(entity)
    }

    /// Create an entity with no components.
    pub fn create_empty_entity(&mut self) -> Entity {
        self.manager.create_entity()
    }

    /// Initialise `system` and append it to the update order.
    ///
    /// # Errors
    ///
    /// Returns the error from [`System::init`]; the system is not added.
    pub fn add_system<S: System + 'static>(&mut self, mut system: S) -> Result<(), EcsError> {
        system.init(&mut self.manager)?;
        info!(system = system.name(), position = self.systems.len(), "system registered");
        self.systems.push(Box::new(system));
        Ok(())
    }

    /// Run one frame: every system in order, then the refresh pass.
    ///
    /// # Errors
    ///
    /// Returns the first system error. The refresh pass is skipped in that case.
    pub fn frame(&mut self, dt: Duration) -> Result<RefreshReport, EcsError> {
        self.frame += 1;
        self.elapsed += dt;
        let frame = self.frame;

        for system in &mut self.systems {
            let mut ctx = FrameContext {
                manager: &mut self.manager,
                frame,
                dt,
                elapsed: self.elapsed,
            };
            system.update(&mut ctx).inspect_err(|error| {
                warn!(frame, system = system.name(), %error, "system update failed");
            })?;
        }

        let report = self.manager.refresh();
        debug!(
            frame = self.frame,
            entities = self.manager.entity_count(),
            archetypes = self.manager.archetype_count(),
            removed = report.removed,
            "frame complete"
        );
        Ok(report)
    }

    /// Run frames at the configured rate until `max_frames` is reached, or
    /// forever when it is zero.
    ///
    /// Each frame advances simulated time by exactly one frame budget. Time
    /// left over in the budget is slept off; overruns are logged.
    ///
    /// # Errors
    ///
    /// Stops at the first failing frame.
    pub fn run(&mut self) -> Result<(), EcsError> {
        let frame_duration = self.config.frame_duration();
        let mut frames_run = 0u64;

        info!(
            frame_rate = self.config.frame_rate,
            max_frames = self.config.max_frames,
            systems = self.systems.len(),
            "starting frame loop"
        );

        loop {
            let start = Instant::now();

            self.frame(frame_duration)?;

            frames_run += 1;
            if self.config.max_frames > 0 && frames_run >= self.config.max_frames {
                info!(
                    frames = frames_run,
                    entities = self.manager.entity_count(),
                    archetypes = self.manager.archetype_count(),
                    "frame loop complete"
                );
                break;
            }

            let spent = start.elapsed();
            if spent < frame_duration {
                std::thread::sleep(frame_duration - spent);
            } else {
                warn!(
                    frame = self.frame,
                    elapsed_ms = u64::try_from(spent.as_millis()).unwrap_or(u64::MAX),
                    budget_ms = u64::try_from(frame_duration.as_millis()).unwrap_or(u64::MAX),
                    "frame exceeded time budget"
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("frame", &self.frame)
            .field("systems", &self.system_names().collect::<Vec<_>>())
            .field("manager", &self.manager)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wraith_ecs::{Component, QueryFilter};

    use super::*;

    const DT: Duration = Duration::from_millis(16);

    struct Marker;
    impl Component for Marker {}

    /// Records its name into a shared log on every update.
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn update(&mut self, _ctx: &mut FrameContext<'_>) -> Result<(), EcsError> {
            self.log.borrow_mut().push(self.name);
            Ok(())
        }
    }

    /// Destroys every entity carrying a `Marker`.
    struct Reaper;

    impl System for Reaper {
        fn name(&self) -> &'static str {
            "reaper"
        }

        fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EcsError> {
            for entity in ctx.manager.query_all::<(Marker,)>(QueryFilter::LIVE) {
                ctx.manager.destroy(entity)?;
            }
            Ok(())
        }
    }

    struct Failing;

    impl System for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn init(&mut self, _manager: &mut EntityManager) -> Result<(), EcsError> {
            Err(EcsError::InvariantViolation("refused".into()))
        }

        fn update(&mut self, _ctx: &mut FrameContext<'_>) -> Result<(), EcsError> {
            Ok(())
        }
    }

    #[test]
    fn test_create_entity_attaches_transform() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let entity = engine.create_entity().unwrap();
        let empty = engine.create_empty_entity();

        assert_eq!(engine.manager().get_component::<Transform>(entity).unwrap(), &Transform::default());
        assert!(!engine.manager().has_component::<Transform>(empty));
        assert_eq!(engine.manager().archetype_count(), 2);
    }

    #[test]
    fn test_frame_advances_counters() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.frame_count(), 0);
        engine.frame(DT).unwrap();
        engine.frame(DT).unwrap();
        assert_eq!(engine.frame_count(), 2);
        assert_eq!(engine.elapsed(), DT * 2);
    }

    #[test]
    fn test_systems_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        for name in ["input", "physics", "render"] {
            engine
                .add_system(Recorder {
                    name,
                    log: Rc::clone(&log),
                })
                .unwrap();
        }

        engine.frame(DT).unwrap();
        assert_eq!(*log.borrow(), ["input", "physics", "render"]);
        assert_eq!(engine.system_names().collect::<Vec<_>>(), ["input", "physics", "render"]);
    }

    #[test]
    fn test_refresh_runs_after_systems() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.add_system(Reaper).unwrap();
        let doomed = engine.create_entity().unwrap();
        engine.manager_mut().add_component(doomed, Marker).unwrap();
        let survivor = engine.create_entity().unwrap();

        let report = engine.frame(DT).unwrap();
        assert_eq!(report.removed, 1);
        assert!(!engine.manager().contains(doomed));
        assert!(engine.manager().contains(survivor));
    }

    #[test]
    fn test_failed_init_does_not_register() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        assert!(engine.add_system(Failing).is_err());
        assert_eq!(engine.system_names().count(), 0);
    }

    #[test]
    fn test_new_rejects_invalid_frame_rate() {
        for frame_rate in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let config = EngineConfig {
                frame_rate,
                ..EngineConfig::default()
            };
            assert!(Engine::new(config).is_err(), "frame_rate {frame_rate} accepted");
        }
    }

    #[test]
    fn test_run_limited_frames() {
        let config = EngineConfig {
            frame_rate: 1000.0,
            max_frames: 5,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config).unwrap();
        engine.run().unwrap();
        assert_eq!(engine.frame_count(), 5);
        assert_eq!(engine.elapsed(), engine.config().frame_duration() * 5);
    }
}
