//! Sprite component: which part of which texture to draw, and where.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use wraith_ecs::{AttachContext, Component, EcsError};

use super::Transform;

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// A textured quad following its entity's [`Transform`].
///
/// Attaching a sprite requires a `Transform` on the same entity; the
/// destination rectangle is laid out from it immediately and again every
/// frame by [`SpriteSystem`](crate::systems::SpriteSystem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    texture_id: String,
    src_x: i32,
    src_y: i32,
    src_width: i32,
    src_height: i32,
    dst_width: i32,
    dst_height: i32,
    /// Offset from the transform's position, scaled with it.
    pub offset: Vec2,
    pub visible: bool,
    src: Rect,
    dst: Rect,
}

impl Sprite {
    /// A sprite drawing the `width` x `height` region at (`src_x`, `src_y`)
    /// of `texture_id` at its natural size.
    #[must_use]
    pub fn new(texture_id: impl Into<String>, src_x: i32, src_y: i32, width: i32, height: i32) -> Self {
        Self {
            texture_id: texture_id.into(),
            src_x,
            src_y,
            src_width: width,
            src_height: height,
            dst_width: width,
            dst_height: height,
            offset: Vec2::ZERO,
            visible: true,
            src: Rect::new(src_x, src_y, width, height),
            dst: Rect::default(),
        }
    }

    /// Draw at `width` x `height` instead of the source size.
    #[must_use]
    pub fn with_dst_size(mut self, width: i32, height: i32) -> Self {
        self.dst_width = width;
        self.dst_height = height;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn texture_id(&self) -> &str {
        &self.texture_id
    }

    pub fn set_texture(&mut self, texture_id: impl Into<String>) {
        self.texture_id = texture_id.into();
    }

    /// Switch texture and select row `row` of a sprite sheet.
    pub fn set_texture_row(&mut self, texture_id: impl Into<String>, row: u32) {
        self.set_texture(texture_id);
        self.src.y = i32::try_from(row).unwrap_or(i32::MAX).saturating_mul(self.dst_height);
    }

    /// Show column `column` of the current row.
    pub fn set_frame_column(&mut self, column: u32) {
        self.src.x = i32::try_from(column).unwrap_or(i32::MAX).saturating_mul(self.src.w);
    }

    /// Region of the texture to draw.
    #[must_use]
    pub fn src_rect(&self) -> Rect {
        self.src
    }

    /// Screen region to draw into, as of the last layout.
    #[must_use]
    pub fn dst_rect(&self) -> Rect {
        self.dst
    }

    /// Recompute both rectangles from `transform`.
    pub fn layout(&mut self, transform: &Transform) {
        let scale = transform.scale;
        let origin = transform.position + self.offset * scale;

        self.src.w = self.src_width;
        self.src.h = self.src_height;
        self.dst = Rect::new(
            origin.x.round() as i32,
            origin.y.round() as i32,
            (self.dst_width as f32 * scale.x).round() as i32,
            (self.dst_height as f32 * scale.y).round() as i32,
        );
    }
}

impl Component for Sprite {
    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) -> Result<(), EcsError> {
        let transform = *ctx.get::<Transform>()?;
        self.src = Rect::new(self.src_x, self.src_y, self.src_width, self.src_height);
        self.layout(&transform);
        Ok(())
    }
}
