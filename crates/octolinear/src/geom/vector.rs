use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::Vector2;

use super::Point;

/// Displacement `(dx, dy)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D(pub Vector2<f64>);

impl Vector2D {
    #[inline]
    pub fn new(dx: f64, dy: f64) -> Self {
        Self(Vector2::new(dx, dy))
    }

    /// Vector from `from` to `to`.
    #[inline]
    pub fn between(from: Point, to: Point) -> Self {
        Self(to.to_vector() - from.to_vector())
    }

    #[inline]
    pub fn dx(&self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn dy(&self) -> f64 {
        self.0.y
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.0.norm()
    }

    /// Unit vector, or `None` for a zero (or non-finite) vector.
    pub fn unit(&self) -> Option<Self> {
        let n = self.magnitude();
        if n > 0.0 && n.is_finite() {
            Some(Self(self.0 / n))
        } else {
            None
        }
    }

    /// Left normal `(-dy, dx)` when `ccw`, right normal `(dy, -dx)` otherwise.
    #[inline]
    pub fn normal(&self, ccw: bool) -> Self {
        if ccw {
            Self::new(-self.0.y, self.0.x)
        } else {
            Self::new(self.0.y, -self.0.x)
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    /// z-component of the 3D cross product; positive when `other` is counter-clockwise of `self`.
    #[inline]
    pub fn cross(&self, other: &Self) -> f64 {
        self.0.perp(&other.0)
    }

    /// Direction angle in `(-π, π]`.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.0.y.atan2(self.0.x)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.x == 0.0 && self.0.y == 0.0
    }
}

impl Add for Vector2D {
    type Output = Vector2D;
    #[inline]
    fn add(self, rhs: Vector2D) -> Self::Output {
        Vector2D(self.0 + rhs.0)
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;
    #[inline]
    fn sub(self, rhs: Vector2D) -> Self::Output {
        Vector2D(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;
    #[inline]
    fn mul(self, k: f64) -> Self::Output {
        Vector2D(self.0 * k)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;
    #[inline]
    fn neg(self) -> Self::Output {
        Vector2D(-self.0)
    }
}
