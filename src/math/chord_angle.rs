use crate::geometry::Point;

use super::Angle;

/// The angular distance between two points on the unit sphere, represented
/// by the squared length of the chord connecting them.
///
/// Squared chord length is a monotonic surrogate for angular distance that
/// avoids trigonometric calls on hot paths. Values range from 0 (equal
/// points) to 4 (antipodal points).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ChordAngle(f64);

impl ChordAngle {
    /// The zero distance.
    pub const ZERO: Self = Self(0.0);

    /// Computes the chord angle between two unit points.
    #[must_use]
    pub fn between(a: &Point, b: &Point) -> Self {
        Self((a.0 - b.0).norm_squared().min(4.0))
    }

    /// Converts an angle in radians to a chord angle.
    ///
    /// Angles of π or more map to the maximum chord; negative angles map
    /// to zero.
    #[must_use]
    pub fn from_angle(angle: Angle) -> Self {
        if angle <= 0.0 {
            return Self(0.0);
        }
        if angle >= std::f64::consts::PI {
            return Self(4.0);
        }
        let half_chord = (0.5 * angle).sin();
        Self(4.0 * half_chord * half_chord)
    }

    /// Converts back to an angle in radians.
    #[must_use]
    pub fn to_angle(self) -> Angle {
        2.0 * (0.5 * self.0.sqrt()).asin()
    }

    /// The raw squared chord length.
    #[must_use]
    pub fn length2(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_between_equal_points() {
        let p = Point::new(1.0, 0.0, 0.0);
        assert_eq!(ChordAngle::between(&p, &p), ChordAngle::ZERO);
    }

    #[test]
    fn right_angle_round_trip() {
        let a = Point::new(1.0, 0.0, 0.0);
        let b = Point::new(0.0, 1.0, 0.0);
        let chord = ChordAngle::between(&a, &b);
        assert_abs_diff_eq!(chord.to_angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-14);
    }

    #[test]
    fn antipodal_points_are_maximal() {
        let a = Point::new(0.0, 0.0, 1.0);
        let b = Point::new(0.0, 0.0, -1.0);
        assert_abs_diff_eq!(ChordAngle::between(&a, &b).length2(), 4.0, epsilon = 1e-14);
    }

    #[test]
    fn ordering_is_monotonic_in_angle() {
        let small = ChordAngle::from_angle(0.1);
        let large = ChordAngle::from_angle(0.2);
        assert!(small < large);
    }

    #[test]
    fn from_angle_clamps() {
        assert_eq!(ChordAngle::from_angle(-1.0), ChordAngle::ZERO);
        assert_abs_diff_eq!(ChordAngle::from_angle(4.0).length2(), 4.0, epsilon = 1e-14);
    }
}
