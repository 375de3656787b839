//! Sprite-sheet animation component.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wraith_ecs::{AttachContext, Component, EcsError};

use super::Sprite;

/// One row of a sprite sheet played as an animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    pub texture_id: String,
    /// Number of frames in the row.
    pub frames: u32,
    /// Time each frame stays on screen.
    pub frame_delay: Duration,
    /// Non-looping clips hold their last frame.
    pub looping: bool,
    /// Sheet row the clip lives on.
    pub row: u32,
}

impl Clip {
    #[must_use]
    pub fn new(name: impl Into<String>, texture_id: impl Into<String>, frames: u32, frame_delay: Duration) -> Self {
        Self {
            name: name.into(),
            texture_id: texture_id.into(),
            frames,
            frame_delay,
            looping: true,
            row: 0,
        }
    }

    #[must_use]
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    #[must_use]
    pub fn on_row(mut self, row: u32) -> Self {
        self.row = row;
        self
    }

    /// Frame shown at `elapsed` time, or `None` for a clip that cannot advance
    /// (no frames or no delay).
    #[must_use]
    pub fn frame_at(&self, elapsed: Duration) -> Option<u32> {
        if self.frames == 0 || self.frame_delay.is_zero() {
            return None;
        }
        let step = elapsed.as_nanos() / self.frame_delay.as_nanos();
        u32::try_from(step % u128::from(self.frames)).ok()
    }

    /// Index of the final frame.
    #[must_use]
    pub fn last_frame(&self) -> u32 {
        self.frames.saturating_sub(1)
    }
}

/// A set of named clips, one of which is playing.
///
/// Attaching requires a [`Sprite`] on the same entity; the current clip's
/// texture and row are applied to it straight away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    clips: HashMap<String, Clip>,
    current: String,
    frame: u32,
    /// Set when the playing clip changed and the sprite has not caught up.
    #[serde(skip)]
    pending_sheet: bool,
}

impl Animation {
    /// An animation with a single clip, which starts playing.
    #[must_use]
    pub fn new(clip: Clip) -> Self {
        let current = clip.name.clone();
        Self {
            clips: HashMap::from([(current.clone(), clip)]),
            current,
            frame: 0,
            pending_sheet: false,
        }
    }

    /// An animation playing the first of `clips`. `None` when `clips` is empty.
    #[must_use]
    pub fn from_clips(clips: impl IntoIterator<Item = Clip>) -> Option<Self> {
        let mut clips = clips.into_iter();
        let mut animation = Self::new(clips.next()?);
        for clip in clips {
            animation.add_clip(clip);
        }
        Some(animation)
    }

    /// Add or replace a clip by name.
    pub fn add_clip(&mut self, clip: Clip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Start playing `name` from its first frame. Unknown names are ignored
    /// and return `false`.
    pub fn play(&mut self, name: &str) -> bool {
        if !self.clips.contains_key(name) {
            return false;
        }
        name.clone_into(&mut self.current);
        self.frame = 0;
        self.pending_sheet = true;
        true
    }

    /// The clip being played. Only `None` for a deserialized animation whose
    /// current name has no clip.
    #[must_use]
    pub fn current_clip(&self) -> Option<&Clip> {
        self.clips.get(&self.current)
    }

    #[must_use]
    pub fn clips(&self) -> &HashMap<String, Clip> {
        &self.clips
    }

    #[must_use]
    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    pub fn set_current_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    /// Rewind to the first frame.
    pub fn reset(&mut self) {
        self.frame = 0;
    }

    /// Point `sprite` at the current clip's texture row.
    pub fn apply_sheet(&mut self, sprite: &mut Sprite) {
        if let Some(clip) = self.clips.get(&self.current) {
            sprite.set_texture_row(clip.texture_id.clone(), clip.row);
        }
        self.pending_sheet = false;
    }

    /// Step to the frame shown at `elapsed` and report what the sprite must
    /// change to match.
    ///
    /// The frame is `(elapsed / frame_delay) % frames`. A non-looping clip
    /// holds once it reaches its last frame; a looping one rewinds there.
    pub fn advance(&mut self, elapsed: Duration) -> SheetUpdate {
        let mut update = SheetUpdate::default();
        let Some(clip) = self.clips.get(&self.current) else {
            return update;
        };
        if self.pending_sheet {
            update.sheet = Some((clip.texture_id.clone(), clip.row));
            self.pending_sheet = false;
        }

        let last = clip.last_frame();
        if !clip.looping && self.frame == last {
            return update;
        }
        let Some(next) = clip.frame_at(elapsed) else {
            return update;
        };
        update.column = Some(next);
        self.frame = if clip.looping && next == last { 0 } else { next };
        update
    }
}

/// Changes an [`Animation`] step asks of its sprite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetUpdate {
    /// New texture and sheet row, after a clip switch.
    pub sheet: Option<(String, u32)>,
    /// Column of the frame to show.
    pub column: Option<u32>,
}

impl SheetUpdate {
    pub fn apply(self, sprite: &mut Sprite) {
        if let Some((texture_id, row)) = self.sheet {
            sprite.set_texture_row(texture_id, row);
        }
        if let Some(column) = self.column {
            sprite.set_frame_column(column);
        }
    }
}

impl Component for Animation {
    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) -> Result<(), EcsError> {
        let sprite = ctx.get_mut::<Sprite>()?;
        self.apply_sheet(sprite);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wraith_ecs::EntityManager;

    use super::*;
    use crate::components::{Rect, Transform};

    fn walk() -> Clip {
        Clip::new("walk", "hero", 4, Duration::from_millis(100))
    }

    #[test]
    fn test_frame_at_wraps() {
        let clip = walk();
        assert_eq!(clip.frame_at(Duration::ZERO), Some(0));
        assert_eq!(clip.frame_at(Duration::from_millis(250)), Some(2));
        assert_eq!(clip.frame_at(Duration::from_millis(430)), Some(0));
        assert_eq!(clip.last_frame(), 3);
    }

    #[test]
    fn test_degenerate_clip_does_not_advance() {
        assert_eq!(Clip::new("still", "hero", 0, Duration::from_millis(100)).frame_at(Duration::from_secs(1)), None);
        assert_eq!(Clip::new("still", "hero", 3, Duration::ZERO).frame_at(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_from_clips_plays_first() {
        let animation = Animation::from_clips([walk(), Clip::new("die", "hero", 6, Duration::from_millis(80)).once()]).unwrap();
        assert_eq!(animation.current_clip().unwrap().name, "walk");
        assert_eq!(animation.clips().len(), 2);
        assert!(Animation::from_clips(Vec::new()).is_none());
    }

    #[test]
    fn test_play_switches_and_rewinds() {
        let mut animation = Animation::new(walk());
        animation.add_clip(Clip::new("die", "hero", 6, Duration::from_millis(80)).on_row(1));
        animation.set_current_frame(3);

        assert!(!animation.play("jump"));
        assert_eq!(animation.current_frame(), 3);

        assert!(animation.play("die"));
        assert_eq!(animation.current_clip().unwrap().row, 1);
        assert_eq!(animation.current_frame(), 0);

        let update = animation.advance(Duration::ZERO);
        assert_eq!(update.sheet, Some(("hero".to_string(), 1)));
        assert_eq!(update.column, Some(0));
        assert_eq!(animation.advance(Duration::ZERO).sheet, None);
    }

    #[test]
    fn test_advance_looping_rewinds_on_last_frame() {
        let mut animation = Animation::new(Clip::new("spin", "hero", 2, Duration::from_millis(10)));
        let update = animation.advance(Duration::from_millis(15));
        assert_eq!(update.column, Some(1));
        assert_eq!(animation.current_frame(), 0);
    }

    #[test]
    fn test_advance_non_looping_holds() {
        let mut animation = Animation::new(Clip::new("die", "hero", 3, Duration::from_millis(10)).once());
        assert_eq!(animation.advance(Duration::from_millis(25)).column, Some(2));
        assert_eq!(animation.advance(Duration::from_millis(35)), SheetUpdate::default());
        assert_eq!(animation.current_frame(), 2);
    }

    #[test]
    fn test_sheet_update_applies_to_sprite() {
        let mut sprite = Sprite::new("sheet", 0, 0, 8, 8);
        SheetUpdate {
            sheet: Some(("jump_sheet".to_string(), 3)),
            column: Some(2),
        }
        .apply(&mut sprite);
        assert_eq!(sprite.texture_id(), "jump_sheet");
        assert_eq!(sprite.src_rect(), Rect::new(16, 24, 8, 8));
    }

    #[test]
    fn test_attach_configures_sprite_row() {
        let mut manager = EntityManager::new();
        let e = manager.create_entity();
        manager.add_component(e, Transform::default()).unwrap();
        manager.add_component(e, Sprite::new("placeholder", 0, 0, 16, 16)).unwrap();
        manager
            .add_component(e, Animation::new(Clip::new("run", "runner", 8, Duration::from_millis(50)).on_row(2)))
            .unwrap();

        let sprite = manager.get_component::<Sprite>(e).unwrap();
        assert_eq!(sprite.texture_id(), "runner");
        assert_eq!(sprite.src_rect().y, 32);
    }

    #[test]
    fn test_attach_requires_sprite() {
        let mut manager = EntityManager::new();
        let e = manager.create_entity();
        assert!(manager.add_component(e, Animation::new(walk())).is_err());
        assert!(!manager.has_component::<Animation>(e));
    }
}
