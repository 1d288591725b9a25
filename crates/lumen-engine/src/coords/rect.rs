use super::Vec2;

/// Axis-aligned rectangle in world units (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Bounding box of a point set. Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec2]) -> Option<Rect> {
        let (first, rest) = points.split_first()?;
        let (lo, hi) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Some(Rect::from_origin_size(lo, hi - lo))
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    /// Grows the rectangle by `amount` on every side.
    #[inline]
    pub fn inflate(self, amount: f32) -> Rect {
        Rect::new(
            self.origin.x - amount,
            self.origin.y - amount,
            self.size.x + amount * 2.0,
            self.size.y + amount * 2.0,
        )
    }

    /// Closed overlap test. Zero-area rectangles (a horizontal beam's bounds)
    /// still intersect anything they touch.
    #[inline]
    pub fn intersects(self, other: Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.origin.x <= b_max.x
            && other.origin.x <= a_max.x
            && self.origin.y <= b_max.y
            && other.origin.y <= a_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    // ── from_points ───────────────────────────────────────────────────────

    #[test]
    fn from_points_empty_is_none() {
        assert!(Rect::from_points(&[]).is_none());
    }

    #[test]
    fn from_points_bounds_all() {
        let pts = [Vec2::new(3.0, -1.0), Vec2::new(-2.0, 4.0), Vec2::new(0.0, 0.0)];
        assert_eq!(Rect::from_points(&pts).unwrap(), r(-2.0, -1.0, 5.0, 5.0));
    }

    // ── inflate ───────────────────────────────────────────────────────────

    #[test]
    fn inflate_grows_every_side() {
        assert_eq!(r(0.0, 0.0, 10.0, 0.0).inflate(2.0), r(-2.0, -2.0, 14.0, 4.0));
    }

    // ── intersects ────────────────────────────────────────────────────────

    #[test]
    fn intersects_overlapping() {
        assert!(r(0.0, 0.0, 10.0, 10.0).intersects(r(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn intersects_flat_rect_on_edge() {
        // A horizontal line segment has zero height but is still visible.
        assert!(r(0.0, 5.0, 10.0, 0.0).intersects(r(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn intersects_disjoint() {
        assert!(!r(0.0, 0.0, 5.0, 5.0).intersects(r(20.0, 20.0, 5.0, 5.0)));
    }
}
