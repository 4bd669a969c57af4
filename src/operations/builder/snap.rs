use crate::geometry::Point;
use crate::math::latlng::LatLng;
use crate::math::Angle;

/// Restricts the locations of output vertices produced by a
/// [`Builder`](super::Builder).
///
/// `snap_point` must be a pure, idempotent function of the point alone
/// (no history dependence), moving it by at most `snap_radius`, so that
/// repeated calls are consistent.
pub trait SnapFunction {
    /// The maximum distance vertices can move when snapped.
    fn snap_radius(&self) -> Angle;

    /// The guaranteed minimum distance between vertices in the output.
    fn min_vertex_separation(&self) -> Angle;

    /// The guaranteed minimum spacing between edges and non-incident
    /// vertices in the output.
    fn min_edge_vertex_separation(&self) -> Angle;

    /// Returns the candidate snap site for the given point.
    fn snap_point(&self, point: &Point) -> Point;
}

/// Snaps every vertex to itself.
///
/// Vertices are preserved exactly unless they fall within the snap radius
/// of an earlier site, in which case they are merged with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySnapFunction {
    snap_radius: Angle,
}

impl IdentitySnapFunction {
    /// Creates an identity snap function with the given radius.
    #[must_use]
    pub fn new(snap_radius: Angle) -> Self {
        Self { snap_radius }
    }
}

impl SnapFunction for IdentitySnapFunction {
    fn snap_radius(&self) -> Angle {
        self.snap_radius
    }

    fn min_vertex_separation(&self) -> Angle {
        self.snap_radius
    }

    fn min_edge_vertex_separation(&self) -> Angle {
        0.5 * self.snap_radius
    }

    fn snap_point(&self, point: &Point) -> Point {
        *point
    }
}

/// Snaps vertices to a decimal latitude/longitude grid.
///
/// With exponent `e`, coordinates are rounded to `10^-e` degrees. The snap
/// radius is the half-diagonal of a grid cell at the equator with a small
/// margin for rounding, so the radius guarantee holds everywhere.
#[derive(Debug, Clone, Copy)]
pub struct LatLngGridSnapFunction {
    exponent: i32,
}

impl LatLngGridSnapFunction {
    /// Creates a grid snap function rounding to `10^-exponent` degrees.
    #[must_use]
    pub fn new(exponent: i32) -> Self {
        Self { exponent }
    }

    fn spacing_degrees(&self) -> f64 {
        10f64.powi(-self.exponent)
    }
}

impl SnapFunction for LatLngGridSnapFunction {
    fn snap_radius(&self) -> Angle {
        // Half the cell diagonal, with margin.
        let half_diag = 0.5 * std::f64::consts::SQRT_2 * self.spacing_degrees().to_radians();
        half_diag * 1.05
    }

    fn min_vertex_separation(&self) -> Angle {
        // Distinct grid sites differ by at least one cell step in latitude
        // or in longitude; longitude steps shrink toward the poles, so
        // only a conservative equatorial-scaled fraction is guaranteed.
        0.5 * self.spacing_degrees().to_radians()
    }

    fn min_edge_vertex_separation(&self) -> Angle {
        0.5 * self.min_vertex_separation()
    }

    fn snap_point(&self, point: &Point) -> Point {
        let ll = LatLng::from_point(point);
        let spacing = self.spacing_degrees();
        let lat = (ll.lat_degrees() / spacing).round() * spacing;
        let lng = (ll.lng_degrees() / spacing).round() * spacing;
        LatLng::from_degrees(lat, lng).to_point()
    }
}
