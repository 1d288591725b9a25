use crate::coords::Vec2;

/// Source of entity positions for beams that follow something.
pub trait PositionSource {
    /// Render-interpolated center of `entity`, or `None` if it no longer exists.
    fn interpolated_center(&self, entity: EntityKey) -> Option<Vec2>;
}

/// Opaque entity identifier owned by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityKey(pub u64);

/// Bounded history of recent positions, oldest first.
///
/// Fixed storage, no allocation: pushing into a full history drops the oldest
/// sample. [`anchors`](Self::anchors) is contiguous so it can be handed to the
/// compositor as-is.
#[derive(Debug, Clone)]
pub struct TrailHistory<const N: usize> {
    points: [Vec2; N],
    len: usize,
    /// Samples closer than this to the newest one are not recorded.
    min_spacing: f32,
}

impl<const N: usize> TrailHistory<N> {
    pub const fn new() -> Self {
        Self { points: [Vec2::zero(); N], len: 0, min_spacing: 0.0 }
    }

    /// Skips samples within `spacing` of the newest one (an idle entity keeps its trail).
    pub const fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = spacing;
        self
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recent sample.
    #[inline]
    pub fn head(&self) -> Option<Vec2> {
        self.anchors().last().copied()
    }

    /// Records a position. Returns `false` if it was skipped.
    pub fn push(&mut self, p: Vec2) -> bool {
        if N == 0 || !p.is_finite() {
            return false;
        }
        if let Some(head) = self.head() {
            if self.min_spacing > 0.0 && head.distance(p) < self.min_spacing {
                return false;
            }
        }
        if self.len == N {
            self.points.copy_within(1.., 0);
            self.points[N - 1] = p;
        } else {
            self.points[self.len] = p;
            self.len += 1;
        }
        true
    }

    /// Records the current center of `entity`, if the source still knows it.
    pub fn sample_from(&mut self, source: &dyn PositionSource, entity: EntityKey) -> bool {
        match source.interpolated_center(entity) {
            Some(p) => self.push(p),
            None => false,
        }
    }

    /// Recorded positions, oldest first.
    #[inline]
    pub fn anchors(&self) -> &[Vec2] {
        &self.points[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for TrailHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32) -> Vec2 {
        Vec2::new(x, 0.0)
    }

    #[test]
    fn fills_then_drops_oldest() {
        let mut t = TrailHistory::<3>::new();
        for x in 0..5 {
            assert!(t.push(v(x as f32)));
        }
        assert_eq!(t.anchors(), &[v(2.0), v(3.0), v(4.0)]);
        assert_eq!(t.head(), Some(v(4.0)));
    }

    #[test]
    fn min_spacing_skips_idle_samples() {
        let mut t = TrailHistory::<8>::new().with_min_spacing(2.0);
        assert!(t.push(v(0.0)));
        assert!(!t.push(v(1.0)));
        assert!(t.push(v(3.0)));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn non_finite_is_ignored() {
        let mut t = TrailHistory::<4>::new();
        assert!(!t.push(Vec2::new(f32::NAN, 0.0)));
        assert!(t.is_empty());
    }

    struct One(Vec2);

    impl PositionSource for One {
        fn interpolated_center(&self, entity: EntityKey) -> Option<Vec2> {
            (entity == EntityKey(1)).then_some(self.0)
        }
    }

    #[test]
    fn samples_from_source() {
        let mut t = TrailHistory::<4>::new();
        let src = One(v(9.0));
        assert!(t.sample_from(&src, EntityKey(1)));
        assert!(!t.sample_from(&src, EntityKey(2)));
        assert_eq!(t.anchors(), &[v(9.0)]);
    }
}
