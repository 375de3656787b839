//! Self-destruct timer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wraith_ecs::Component;

/// Destroys its entity once `remaining` runs out.
///
/// With `deferred` set, the entity lingers for one extra refresh after it
/// is destroyed, so systems running next frame still see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining: Duration,
    pub deferred: bool,
}

impl Lifetime {
    #[must_use]
    pub fn new(remaining: Duration) -> Self {
        Self {
            remaining,
            deferred: false,
        }
    }

    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Count down by `dt`; `true` once the timer has expired.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.is_expired()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}

impl Component for Lifetime {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_down() {
        let mut lifetime = Lifetime::new(Duration::from_millis(30));
        assert!(!lifetime.tick(Duration::from_millis(20)));
        assert_eq!(lifetime.remaining, Duration::from_millis(10));
        assert!(lifetime.tick(Duration::from_millis(20)));
        assert_eq!(lifetime.remaining, Duration::ZERO);
    }

    #[test]
    fn test_deferred_builder() {
        assert!(!Lifetime::new(Duration::from_secs(1)).deferred);
        assert!(Lifetime::new(Duration::from_secs(1)).deferred().deferred);
    }
}
