use std::ops::Neg;

use crate::math::{Angle, Vector3, TOLERANCE};

/// A point on the unit sphere, stored as a unit-length 3D vector.
///
/// Immutable value type; all constructors produce (or preserve) unit norm
/// within floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub Vector3);

impl Point {
    /// Creates a point by normalizing the given coordinates.
    ///
    /// The input must be non-zero.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z).normalize())
    }

    /// Wraps coordinates that are already unit length.
    #[must_use]
    pub fn from_unit_unchecked(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// Returns a unit vector orthogonal to this point.
    ///
    /// Deterministic: crosses against the coordinate axis along which this
    /// point has the smallest component, so the result is never degenerate.
    #[must_use]
    pub fn ortho(&self) -> Self {
        let abs = self.0.abs();
        let mut axis = Vector3::zeros();
        if abs.x <= abs.y && abs.x <= abs.z {
            axis.x = 1.0;
        } else if abs.y <= abs.z {
            axis.y = 1.0;
        } else {
            axis.z = 1.0;
        }
        Self(self.0.cross(&axis).normalize())
    }

    /// The angle in radians between this point and `other`.
    #[must_use]
    pub fn angle(&self, other: &Self) -> Angle {
        self.0.cross(&other.0).norm().atan2(self.0.dot(&other.0))
    }

    /// Reports whether two points coincide within the global tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.0 - other.0).norm_squared() <= TOLERANCE * TOLERANCE
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Returns the point at angular distance `angle` from `origin` along the
/// great circle toward `dir`.
///
/// `dir` must be a unit vector orthogonal to `origin`; the result is then
/// exactly `origin * cos(angle) + dir * sin(angle)`, renormalized to guard
/// against drift.
#[must_use]
pub fn point_on_ray(origin: &Point, dir: &Point, angle: Angle) -> Point {
    Point((origin.0 * angle.cos() + dir.0 * angle.sin()).normalize())
}

/// Spherical linear interpolation between `a` and `b` at fraction `t`.
#[must_use]
pub fn interpolate(t: f64, a: &Point, b: &Point) -> Point {
    let theta = a.angle(b);
    if theta < TOLERANCE {
        return *a;
    }
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;
    Point((a.0 * wa + b.0 * wb).normalize())
}
