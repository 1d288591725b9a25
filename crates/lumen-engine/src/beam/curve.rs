//! Anchor smoothing.
//!
//! Resamples an ordered anchor sequence into a fixed number of points along a
//! uniform Catmull-Rom spline. The functions here hold no state between calls.

use crate::coords::Vec2;

/// Evaluates one Catmull-Rom segment between `p1` and `p2` at local `t`.
///
/// `P(t) = 0.5 * (2p1 + (-p0+p2)t + (2p0-5p1+4p2-p3)t² + (-p0+3p1-3p2+p3)t³)`
#[inline]
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = p1 * 2.0;
    let b = (p2 - p0) * t;
    let c = (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2;
    let d = (-p0 + p1 * 3.0 - p2 * 3.0 + p3) * t3;

    (a + b + c + d) * 0.5
}

/// Samples the smoothed path at parameter `t` in [0, 1].
///
/// `t` is mapped to a fractional index into `anchors`; neighbours outside the
/// sequence are clamped to the first/last anchor. A two-anchor sequence is a
/// straight line and is sampled linearly, so evenly spaced `t` stay evenly
/// spaced on the segment.
///
/// Returns `None` for an empty slice.
pub fn sample(anchors: &[Vec2], t: f32) -> Option<Vec2> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    match anchors {
        [] => None,
        [only] => Some(*only),
        [a, b] => Some(a.lerp(*b, t)),
        _ => {
            let last = anchors.len() - 1;
            let f = t * last as f32;
            let seg = (f.floor() as usize).min(last - 1);
            let local = f - seg as f32;

            let p0 = anchors[seg.saturating_sub(1)];
            let p1 = anchors[seg];
            let p2 = anchors[seg + 1];
            let p3 = anchors[(seg + 2).min(last)];
            Some(catmull_rom(p0, p1, p2, p3, local))
        }
    }
}

/// Fills `out` with `out.len()` evenly spaced samples of the smoothed path.
///
/// The first and last outputs are exactly the first and last anchors. With
/// fewer than two anchors nothing is written and `false` is returned; the
/// caller is expected to skip the draw.
pub fn resample_into(anchors: &[Vec2], out: &mut [Vec2]) -> bool {
    if anchors.len() < 2 || out.is_empty() {
        return false;
    }
    if out.len() == 1 {
        out[0] = anchors[0];
        return true;
    }

    let steps = (out.len() - 1) as f32;
    for (i, slot) in out.iter_mut().enumerate() {
        let t = i as f32 / steps;
        // Safe: anchors is non-empty.
        *slot = sample(anchors, t).unwrap_or(anchors[0]);
    }

    // Pin the ends so accumulated float error never shifts them.
    out[0] = anchors[0];
    let n = out.len();
    out[n - 1] = anchors[anchors.len() - 1];
    true
}

/// Allocating convenience wrapper around [`resample_into`].
///
/// Returns an empty vector for fewer than two anchors or a zero count.
pub fn resample(anchors: &[Vec2], out_count: usize) -> Vec<Vec2> {
    let mut out = vec![Vec2::zero(); out_count];
    if !resample_into(anchors, &mut out) {
        out.clear();
    }
    out
}

/// Total polyline length of the anchor sequence.
pub fn path_length(anchors: &[Vec2]) -> f32 {
    anchors.windows(2).map(|w| w[0].distance(w[1])).sum()
}
