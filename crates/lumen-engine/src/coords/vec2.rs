use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// 2D vector in world units (logical pixels, +Y down).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Unit X axis. Used as the fallback direction when a strip sample has no
    /// usable neighbour delta.
    pub const X: Vec2 = Vec2::new(1.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn dot(self, rhs: Vec2) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector in this direction, or `fallback` when the
    /// length is below `eps` or not finite.
    #[inline]
    pub fn normalize_or(self, fallback: Vec2, eps: f32) -> Vec2 {
        let len = self.length();
        if len.is_finite() && len > eps {
            self / len
        } else {
            fallback
        }
    }

    /// Counter-clockwise perpendicular (in a +Y-down space this points to the
    /// left of the direction of travel).
    #[inline]
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[inline]
    pub fn lerp(self, to: Vec2, t: f32) -> Vec2 {
        self + (to - self) * t
    }

    #[inline]
    pub fn min(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x.min(rhs.x), self.y.min(rhs.y))
    }

    #[inline]
    pub fn max(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x.max(rhs.x), self.y.max(rhs.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_or_unit_length() {
        let n = Vec2::new(3.0, 4.0).normalize_or(Vec2::X, 1e-6);
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn normalize_or_zero_uses_fallback() {
        assert_eq!(Vec2::zero().normalize_or(Vec2::X, 1e-6), Vec2::X);
    }

    #[test]
    fn normalize_or_nan_uses_fallback() {
        let v = Vec2::new(f32::NAN, 1.0);
        assert_eq!(v.normalize_or(Vec2::X, 1e-6), Vec2::X);
    }

    #[test]
    fn perp_is_orthogonal() {
        let d = Vec2::new(2.0, -5.0);
        assert_eq!(d.dot(d.perp()), 0.0);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(5.0, -2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(3.0, 0.0));
    }
}
