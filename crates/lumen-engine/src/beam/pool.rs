use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;

/// One ribbon vertex as consumed by every draw backend.
///
/// `color` is linear premultiplied RGBA. `uv.x` is the scrolled position
/// along the beam, `uv.y` is 0 on the left edge and 1 on the right edge.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct BeamVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

/// Vertex and index counts a strip of `point_count` samples needs.
///
/// Two vertices per point, two triangles (six indices) per segment.
#[inline]
pub const fn capacity_for(point_count: usize) -> (usize, usize) {
    (point_count.saturating_mul(2), point_count.saturating_sub(1).saturating_mul(6))
}

/// Static capacity of a [`BufferPool`], fixed at construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PoolCapacity {
    max_points: usize,
}

impl PoolCapacity {
    /// Largest point count whose vertices stay addressable by `u16` indices.
    pub const MAX_POINTS: usize = (u16::MAX as usize + 1) / 2;

    pub const fn new(max_points: usize) -> Self {
        let max_points = if max_points < 2 {
            2
        } else if max_points > Self::MAX_POINTS {
            Self::MAX_POINTS
        } else {
            max_points
        };
        Self { max_points }
    }

    #[inline]
    pub const fn max_points(self) -> usize {
        self.max_points
    }

    #[inline]
    pub const fn vertex_capacity(self) -> usize {
        self.max_points * 2
    }

    /// Six indices per point; one segment's worth more than a full strip needs.
    #[inline]
    pub const fn index_capacity(self) -> usize {
        self.max_points * 6
    }

    /// Whether a strip of `point_count` samples fits without overflow.
    #[inline]
    pub const fn admits(self, point_count: usize) -> bool {
        let (v, i) = capacity_for(point_count);
        point_count <= self.max_points && v <= self.vertex_capacity() && i <= self.index_capacity()
    }
}

impl Default for PoolCapacity {
    /// 128 points, 256 vertices, 768 indices.
    fn default() -> Self {
        Self::new(128)
    }
}

struct Storage {
    points: Box<[Vec2]>,
    vertices: Box<[BeamVertex]>,
    indices: Box<[u16]>,
}

impl Storage {
    fn allocate(cap: PoolCapacity) -> Self {
        Self {
            points: vec![Vec2::zero(); cap.max_points()].into_boxed_slice(),
            vertices: vec![BeamVertex::zeroed(); cap.vertex_capacity()].into_boxed_slice(),
            indices: vec![0u16; cap.index_capacity()].into_boxed_slice(),
        }
    }
}

/// Mutable views over the pooled arrays.
///
/// The three fields borrow disjoint storage so the compositor can read
/// smoothed points while the strip builder writes vertices.
pub struct PoolSlices<'a> {
    pub points: &'a mut [Vec2],
    pub vertices: &'a mut [BeamVertex],
    pub indices: &'a mut [u16],
}

/// Preallocated geometry storage shared by every beam draw.
///
/// Storage is allocated on first use (or by [`initialize`](Self::initialize))
/// and never resized. Every pass overwrites it, so a pass must hand its geometry
/// to the draw backend before the next pass is built.
pub struct BufferPool {
    capacity: PoolCapacity,
    storage: Option<Storage>,
}

impl BufferPool {
    /// Creates an empty pool. Nothing is allocated until first use.
    pub fn new(capacity: PoolCapacity) -> Self {
        Self { capacity, storage: None }
    }

    #[inline]
    pub fn capacity(&self) -> PoolCapacity {
        self.capacity
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.storage.is_some()
    }

    /// Allocates the arrays if they are not already allocated.
    pub fn initialize(&mut self) {
        if self.storage.is_some() {
            return;
        }
        let cap = self.capacity;
        self.storage = Some(Storage::allocate(cap));
        log::debug!(
            "beam pool initialized: {} points, {} vertices, {} indices",
            cap.max_points(),
            cap.vertex_capacity(),
            cap.index_capacity()
        );
    }

    /// Frees the arrays. The next [`acquire`](Self::acquire) allocates again.
    pub fn release(&mut self) {
        if self.storage.take().is_some() {
            log::debug!("beam pool released");
        }
    }

    /// Returns fixed-capacity mutable views, allocating on first use.
    pub fn acquire(&mut self) -> PoolSlices<'_> {
        let cap = self.capacity;
        let storage = self.storage.get_or_insert_with(|| {
            log::debug!("beam pool initialized lazily ({} points)", cap.max_points());
            Storage::allocate(cap)
        });
        PoolSlices {
            points: &mut storage.points,
            vertices: &mut storage.vertices,
            indices: &mut storage.indices,
        }
    }

    /// Read-only view of the current vertex contents (empty when released).
    pub fn vertices(&self) -> &[BeamVertex] {
        match &self.storage {
            Some(s) => &s.vertices,
            None => &[],
        }
    }

    /// Read-only view of the current index contents (empty when released).
    pub fn indices(&self) -> &[u16] {
        match &self.storage {
            Some(s) => &s.indices,
            None => &[],
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("capacity", &self.capacity)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_for_counts() {
        assert_eq!(capacity_for(2), (4, 6));
        assert_eq!(capacity_for(128), (256, 762));
        assert_eq!(capacity_for(0), (0, 0));
    }

    #[test]
    fn default_capacity_matches_budget() {
        let cap = PoolCapacity::default();
        assert_eq!(cap.vertex_capacity(), 256);
        assert_eq!(cap.index_capacity(), 768);
        assert!(cap.admits(128));
        assert!(!cap.admits(129));
        assert!(!cap.admits(1000));
    }

    #[test]
    fn capacity_is_clamped_to_u16_range() {
        let cap = PoolCapacity::new(usize::MAX);
        assert!(cap.vertex_capacity() <= u16::MAX as usize + 1);
        assert_eq!(PoolCapacity::new(0).max_points(), 2);
    }

    #[test]
    fn lazy_init_and_release() {
        let mut pool = BufferPool::new(PoolCapacity::new(16));
        assert!(!pool.is_initialized());
        assert!(pool.vertices().is_empty());

        let s = pool.acquire();
        assert_eq!(s.vertices.len(), 32);
        assert_eq!(s.indices.len(), 96);
        assert_eq!(s.points.len(), 16);
        assert!(pool.is_initialized());

        pool.release();
        assert!(!pool.is_initialized());
        assert!(pool.indices().is_empty());

        // Re-acquiring after release allocates again with the same capacity.
        assert_eq!(pool.acquire().vertices.len(), 32);
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut pool = BufferPool::default();
        pool.initialize();
        pool.acquire().vertices[0].pos = [7.0, 7.0];
        pool.initialize();
        assert_eq!(pool.vertices()[0].pos, [7.0, 7.0]);
    }
}
