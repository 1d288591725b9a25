use super::{Rect, Vec2};

/// Visible region in world units.
///
/// `origin` is the world position of the top-left screen corner; the beam
/// shader subtracts it and divides by `width`/`height` to reach NDC, which is
/// the 2D orthographic projection used by every pass.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { origin: Vec2::zero(), width, height }
    }

    #[inline]
    pub const fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// World-space rectangle covered by the viewport.
    #[inline]
    pub fn world_rect(self) -> Rect {
        Rect::from_origin_size(self.origin, Vec2::new(self.width, self.height))
    }
}
