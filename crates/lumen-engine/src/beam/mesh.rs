use crate::coords::Vec2;
use crate::paint::Color;

use super::pool::{capacity_for, BeamVertex};

/// Deltas shorter than this are treated as zero-length.
const MIN_DIRECTION: f32 = 1e-5;

/// Per-strip options.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct StripStyle {
    /// Added to the U coordinate of every vertex.
    pub scroll: f32,
    /// Replaces rgb with the coverage of the evaluated color (premultiplied white).
    pub force_white: bool,
}

/// Counts of the geometry written by [`build_strip`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StripCounts {
    pub vertex_count: usize,
    pub index_count: usize,
}

impl StripCounts {
    #[inline]
    pub fn triangle_count(self) -> usize {
        self.index_count / 3
    }
}

/// Direction of travel at sample `i`: central difference inside the strip,
/// one-sided at the ends, `Vec2::X` when the delta is degenerate.
#[inline]
fn direction_at(points: &[Vec2], i: usize) -> Vec2 {
    let last = points.len() - 1;
    let delta = if i == 0 {
        points[1] - points[0]
    } else if i == last {
        points[last] - points[last - 1]
    } else {
        points[i + 1] - points[i - 1]
    };
    delta.normalize_or(Vec2::X, MIN_DIRECTION)
}

/// Writes a quad-chain ribbon for `points` into `vertices`/`indices`.
///
/// Point `i` becomes vertices `2i` (left, `v = 0`) and `2i + 1` (right, `v = 1`),
/// offset by `±perpendicular · width(ratio) / 2`. Each segment is two triangles
/// with the same winding.
///
/// Returns `None` without touching either slice when there are fewer than two
/// points or the strip does not fit.
pub fn build_strip(
    points: &[Vec2],
    vertices: &mut [BeamVertex],
    indices: &mut [u16],
    width: impl Fn(f32) -> f32,
    color: impl Fn(f32) -> Color,
    style: StripStyle,
) -> Option<StripCounts> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let (vertex_count, index_count) = capacity_for(n);
    if vertex_count > vertices.len()
        || index_count > indices.len()
        || vertex_count > u16::MAX as usize + 1
    {
        return None;
    }

    let steps = (n - 1) as f32;
    for (i, &p) in points.iter().enumerate() {
        let ratio = i as f32 / steps;

        let w = width(ratio);
        let half = if w.is_finite() && w > 0.0 { w * 0.5 } else { 0.0 };
        let offset = direction_at(points, i).perp() * half;

        let c = color(ratio);
        let c = if !c.is_finite() {
            Color::transparent()
        } else if style.force_white {
            Color::from_premul(c.a, c.a, c.a, c.a)
        } else {
            c
        };

        let u = ratio + style.scroll;
        let left = p + offset;
        let right = p - offset;
        let rgba = c.to_array();
        vertices[i * 2] = BeamVertex { pos: [left.x, left.y], color: rgba, uv: [u, 0.0] };
        vertices[i * 2 + 1] = BeamVertex { pos: [right.x, right.y], color: rgba, uv: [u, 1.0] };
    }

    for seg in 0..n - 1 {
        let a = (seg * 2) as u16;
        let (b, c, d) = (a + 1, a + 2, a + 3);
        indices[seg * 6..seg * 6 + 6].copy_from_slice(&[a, b, c, b, d, c]);
    }

    Some(StripCounts { vertex_count, index_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::pool::PoolCapacity;
    use crate::beam::BufferPool;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn signed_area(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    }

    fn straight(n: usize) -> Vec<Vec2> {
        (0..n).map(|i| v(i as f32 * 10.0, 50.0)).collect()
    }

    #[test]
    fn vertices_offset_by_half_width() {
        let mut pool = BufferPool::new(PoolCapacity::new(8));
        let s = pool.acquire();
        let pts = straight(4);
        let style = StripStyle::default();
        let counts =
            build_strip(&pts, s.vertices, s.indices, |_| 8.0, |_| Color::WHITE, style).unwrap();
        assert_eq!(counts, StripCounts { vertex_count: 8, index_count: 18 });
        assert_eq!(counts.triangle_count(), 6);

        for i in 0..4 {
            let l = s.vertices[i * 2];
            let r = s.vertices[i * 2 + 1];
            assert!(((l.pos[1] - r.pos[1]).abs() - 8.0).abs() < 1e-4);
            assert_eq!(l.pos[0], r.pos[0]);
            assert_eq!((l.uv[1], r.uv[1]), (0.0, 1.0));
        }
    }

    #[test]
    fn uv_u_encodes_ratio_plus_scroll() {
        let mut pool = BufferPool::default();
        let s = pool.acquire();
        let style = StripStyle { scroll: 0.25, force_white: false };
        build_strip(&straight(5), s.vertices, s.indices, |_| 1.0, |_| Color::WHITE, style).unwrap();
        assert!((s.vertices[0].uv[0] - 0.25).abs() < 1e-6);
        assert!((s.vertices[4].uv[0] - 0.75).abs() < 1e-6);
        assert!((s.vertices[9].uv[0] - 1.25).abs() < 1e-6);
    }

    #[test]
    fn both_triangles_share_winding() {
        let mut pool = BufferPool::default();
        let s = pool.acquire();
        let pts = [v(0.0, 0.0), v(30.0, 20.0), v(60.0, -10.0), v(90.0, 5.0)];
        let style = StripStyle::default();
        let counts =
            build_strip(&pts, s.vertices, s.indices, |_| 6.0, |_| Color::WHITE, style).unwrap();

        let areas: Vec<f32> = s.indices[..counts.index_count]
            .chunks(3)
            .map(|t| {
                signed_area(
                    s.vertices[t[0] as usize].pos,
                    s.vertices[t[1] as usize].pos,
                    s.vertices[t[2] as usize].pos,
                )
            })
            .collect();
        assert!(areas.iter().all(|a| *a < 0.0) || areas.iter().all(|a| *a > 0.0), "{areas:?}");
    }

    #[test]
    fn zero_length_direction_uses_default_axis() {
        let mut pool = BufferPool::default();
        let s = pool.acquire();
        let pts = [v(5.0, 5.0); 3];
        build_strip(&pts, s.vertices, s.indices, |_| 4.0, |_| Color::WHITE, StripStyle::default())
            .unwrap();
        for vert in &s.vertices[..6] {
            assert!(vert.pos.iter().all(|c| c.is_finite()));
            assert_eq!(vert.pos[0], 5.0);
        }
        assert_eq!(s.vertices[0].pos[1], 7.0);
        assert_eq!(s.vertices[1].pos[1], 3.0);
    }

    #[test]
    fn nan_width_and_color_are_neutralized() {
        let mut pool = BufferPool::default();
        let s = pool.acquire();
        build_strip(
            &straight(3),
            s.vertices,
            s.indices,
            |_| f32::NAN,
            |_| Color::from_premul(f32::NAN, 0.0, 0.0, 1.0),
            StripStyle::default(),
        )
        .unwrap();
        for vert in &s.vertices[..6] {
            assert!(vert.pos.iter().all(|c| c.is_finite()));
            assert_eq!(vert.color, [0.0; 4]);
        }
    }

    #[test]
    fn force_white_keeps_coverage() {
        let mut pool = BufferPool::default();
        let s = pool.acquire();
        let style = StripStyle { scroll: 0.0, force_white: true };
        build_strip(
            &straight(2),
            s.vertices,
            s.indices,
            |_| 1.0,
            |_| Color::from_premul(0.5, 0.0, 0.1, 0.5),
            style,
        )
        .unwrap();
        assert_eq!(s.vertices[0].color, [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn overflow_writes_nothing() {
        let mut pool = BufferPool::new(PoolCapacity::new(4));
        let s = pool.acquire();
        let before: Vec<BeamVertex> = s.vertices.to_vec();
        let idx_before: Vec<u16> = s.indices.to_vec();

        let style = StripStyle::default();
        let result =
            build_strip(&straight(5), s.vertices, s.indices, |_| 1.0, |_| Color::WHITE, style);
        assert!(result.is_none());
        assert_eq!(s.vertices.to_vec(), before);
        assert_eq!(s.indices.to_vec(), idx_before);
    }

    #[test]
    fn single_point_is_rejected() {
        let mut pool = BufferPool::default();
        let s = pool.acquire();
        let style = StripStyle::default();
        let result =
            build_strip(&[v(1.0, 1.0)], s.vertices, s.indices, |_| 1.0, |_| Color::WHITE, style);
        assert!(result.is_none());
    }
}
