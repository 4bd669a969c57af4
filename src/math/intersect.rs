use crate::error::{GeometryError, Result};
use crate::geometry::Point;

use super::TOLERANCE;

/// Computes the intersection point of two crossing great-circle edges.
///
/// The intersection of the two great circles is the cross product of their
/// normals; of the two antipodal candidates, the one on the same side of
/// the sphere as the edge midpoints is returned. The computation is
/// symmetric in the edge arguments: calling it with `(a0, a1, b0, b1)` and
/// `(b0, b1, a0, a1)` produces bitwise-identical points, so the two passes
/// of a boolean operation reconstruct the same vertex.
///
/// Callers are expected to have established that the edges actually cross
/// (e.g. via [`super::predicates::interior_crossing`]).
///
/// # Errors
///
/// Returns [`GeometryError::EdgesDoNotCross`] if the edges lie on the same
/// great circle (no unique intersection exists).
pub fn edge_intersection(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> Result<Point> {
    let na = a0.0.cross(&a1.0);
    let nb = b0.0.cross(&b1.0);
    let x = na.cross(&nb);
    let norm = x.norm();
    if norm < TOLERANCE {
        return Err(GeometryError::EdgesDoNotCross(
            "edges lie on the same great circle".to_owned(),
        )
        .into());
    }
    let mut x = x / norm;

    // Pick the candidate near the edges, not its antipode. The reference
    // sum is symmetric in the two edges, keeping the sign choice stable
    // under argument order.
    let reference = a0.0 + a1.0 + b0.0 + b1.0;
    if x.dot(&reference) < 0.0 {
        x = -x;
    }
    Ok(Point(x))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::latlng::LatLng;
    use approx::assert_abs_diff_eq;

    fn ll(lat: f64, lng: f64) -> Point {
        LatLng::from_degrees(lat, lng).to_point()
    }

    #[test]
    fn meridian_crosses_equator() {
        let a0 = ll(-10.0, 0.0);
        let a1 = ll(10.0, 0.0);
        let b0 = ll(0.0, -10.0);
        let b1 = ll(0.0, 10.0);
        let x = edge_intersection(&a0, &a1, &b0, &b1).unwrap();
        assert_abs_diff_eq!(x.0.x, 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(x.0.y, 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(x.0.z, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn symmetric_in_edge_order() {
        let a0 = ll(-3.0, 1.0);
        let a1 = ll(5.0, 2.0);
        let b0 = ll(1.0, -4.0);
        let b1 = ll(0.5, 6.0);
        let x = edge_intersection(&a0, &a1, &b0, &b1).unwrap();
        let y = edge_intersection(&b0, &b1, &a0, &a1).unwrap();
        assert_eq!(x.0, y.0);
    }

    #[test]
    fn intersection_is_unit_length() {
        let x = edge_intersection(&ll(-2.0, 1.0), &ll(3.0, 1.5), &ll(0.5, -2.0), &ll(0.4, 4.0))
            .unwrap();
        assert_abs_diff_eq!(x.0.norm(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn coplanar_edges_are_rejected() {
        let a0 = ll(0.0, 0.0);
        let a1 = ll(0.0, 10.0);
        let b0 = ll(0.0, 20.0);
        let b1 = ll(0.0, 30.0);
        assert!(edge_intersection(&a0, &a1, &b0, &b1).is_err());
    }
}
