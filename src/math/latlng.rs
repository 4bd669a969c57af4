use crate::geometry::Point;

use super::Angle;

/// A latitude/longitude pair in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: Angle,
    pub lng: Angle,
}

impl LatLng {
    /// Creates a `LatLng` from radians.
    #[must_use]
    pub fn new(lat: Angle, lng: Angle) -> Self {
        Self { lat, lng }
    }

    /// Creates a `LatLng` from degrees.
    #[must_use]
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.to_radians(),
            lng: lng.to_radians(),
        }
    }

    /// Converts to a unit point on the sphere.
    #[must_use]
    pub fn to_point(self) -> Point {
        let phi = self.lat;
        let theta = self.lng;
        let cos_phi = phi.cos();
        Point::from_unit_unchecked(
            theta.cos() * cos_phi,
            theta.sin() * cos_phi,
            phi.sin(),
        )
    }

    /// Recovers the latitude/longitude of a unit point.
    #[must_use]
    pub fn from_point(p: &Point) -> Self {
        Self {
            lat: p.0.z.atan2(p.0.x.hypot(p.0.y)),
            lng: p.0.y.atan2(p.0.x),
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn lat_degrees(self) -> f64 {
        self.lat.to_degrees()
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn lng_degrees(self) -> f64 {
        self.lng.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_maps_to_x_axis() {
        let p = LatLng::from_degrees(0.0, 0.0).to_point();
        assert_abs_diff_eq!(p.0.x, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.0.y, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.0.z, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn north_pole() {
        let p = LatLng::from_degrees(90.0, 0.0).to_point();
        assert_abs_diff_eq!(p.0.z, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn round_trip_degrees() {
        let ll = LatLng::from_degrees(37.5, -122.2);
        let back = LatLng::from_point(&ll.to_point());
        assert_abs_diff_eq!(back.lat_degrees(), 37.5, epsilon = 1e-12);
        assert_abs_diff_eq!(back.lng_degrees(), -122.2, epsilon = 1e-12);
    }

    #[test]
    fn points_are_unit_length() {
        let p = LatLng::from_degrees(45.0, 45.0).to_point();
        assert_abs_diff_eq!(p.0.norm(), 1.0, epsilon = 1e-15);
    }
}
