use crate::error::Result;
use crate::geometry::Polygon;
use crate::operations::builder::{
    Builder, BuilderOptions, IdentitySnapFunction, PolygonLayer, SnapFunction,
};
use crate::shape::ShapeIndex;

use super::processor::CrossingProcessor;
use super::select::OpType;

/// Controls snapping and crossing resolution for a boolean operation.
pub struct BooleanOptions {
    pub snap_function: Box<dyn SnapFunction>,
    pub split_crossing_edges: bool,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        Self {
            snap_function: Box::new(IdentitySnapFunction::new(0.0)),
            split_crossing_edges: true,
        }
    }
}

/// Computes a boolean set operation on two spherical regions.
///
/// Orchestrates the full pipeline: two crossing-processor passes (region A
/// against B, then B against A), edge emission into a builder, vertex
/// snapping, and loop assembly. Single-use: `execute` consumes the
/// operation.
pub struct BooleanOperation {
    op: OpType,
    options: BooleanOptions,
}

impl BooleanOperation {
    /// Creates a new operation of the given type.
    #[must_use]
    pub fn new(op: OpType, options: BooleanOptions) -> Self {
        Self { op, options }
    }

    /// Executes the operation on regions `a` and `b`.
    ///
    /// Both intersection points are computed symmetrically, so the two
    /// passes reconstruct identical crossing vertices and the assembled
    /// output closes even with a zero snap radius.
    ///
    /// # Errors
    ///
    /// Returns the first error from either processor pass or from the
    /// builder (crossing resolution, graph normalization, loop assembly).
    pub fn execute(self, a: &ShapeIndex, b: &ShapeIndex) -> Result<Polygon> {
        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions {
            snap_function: self.options.snap_function,
            split_crossing_edges: self.options.split_crossing_edges,
        });
        builder.start_layer(PolygonLayer::new(&mut polygon));

        CrossingProcessor::new(self.op, a, b, false).emit_edges(&mut builder)?;
        CrossingProcessor::new(self.op, b, a, true).emit_edges(&mut builder)?;

        builder.build()?;
        Ok(polygon)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Loop, Point};
    use crate::math::latlng::LatLng;
    use crate::shape::Shape;
    use approx::assert_relative_eq;

    fn ll(lat: f64, lng: f64) -> Point {
        LatLng::from_degrees(lat, lng).to_point()
    }

    fn square_loop(lat: f64, lng: f64, size: f64) -> Loop {
        Loop::new(vec![
            ll(lat, lng),
            ll(lat, lng + size),
            ll(lat + size, lng + size),
            ll(lat + size, lng),
        ])
    }

    fn square_index(lat: f64, lng: f64, size: f64) -> ShapeIndex {
        let mut index = ShapeIndex::new();
        index.add(Shape::PolygonBoundary(vec![square_loop(lat, lng, size)]));
        index
    }

    fn index_of(polygon: &Polygon) -> ShapeIndex {
        let mut index = ShapeIndex::new();
        index.add(Shape::from_polygon(polygon));
        index
    }

    fn run(op: OpType, a: &ShapeIndex, b: &ShapeIndex) -> Polygon {
        BooleanOperation::new(op, BooleanOptions::default())
            .execute(a, b)
            .unwrap()
    }

    #[test]
    fn union_of_disjoint_squares_has_two_loops() {
        let a = square_index(0.0, 0.0, 1.0);
        let b = square_index(5.0, 5.0, 1.0);
        let result = run(OpType::Union, &a, &b);
        assert_eq!(result.num_loops(), 2);
        assert!(result.contains(&ll(0.5, 0.5)));
        assert!(result.contains(&ll(5.5, 5.5)));
        assert!(!result.contains(&ll(3.0, 3.0)));
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        // Two squares overlapping in exactly a 1x1 degree region.
        let a = square_index(0.0, 0.0, 2.0);
        let b = square_index(1.0, 1.0, 2.0);
        let result = run(OpType::Intersection, &a, &b);
        assert_eq!(result.num_loops(), 1);
        assert!(result.contains(&ll(1.5, 1.5)));
        assert!(!result.contains(&ll(0.5, 0.5)));
        let one_degree = 1.0_f64.to_radians();
        assert_relative_eq!(
            result.area(),
            one_degree * one_degree,
            max_relative = 0.01
        );
    }

    #[test]
    fn intersection_of_disjoint_squares_is_empty() {
        let a = square_index(0.0, 0.0, 1.0);
        let b = square_index(5.0, 5.0, 1.0);
        let result = run(OpType::Intersection, &a, &b);
        assert!(result.is_empty());
    }

    #[test]
    fn difference_with_concentric_hole() {
        // A 4-degree square minus a concentric 2-degree square: a shell
        // with a hole.
        let a = square_index(0.0, 0.0, 4.0);
        let b = square_index(1.0, 1.0, 2.0);
        let result = run(OpType::Difference, &a, &b);
        assert_eq!(result.num_loops(), 2);
        assert!(result.contains(&ll(0.5, 0.5)));
        assert!(!result.contains(&ll(2.0, 2.0)));
        assert!(!result.contains(&ll(5.0, 5.0)));
    }

    #[test]
    fn difference_of_overlapping_squares() {
        let a = square_index(0.0, 0.0, 2.0);
        let b = square_index(1.0, 1.0, 2.0);
        let result = run(OpType::Difference, &a, &b);
        assert_eq!(result.num_loops(), 1);
        assert!(result.contains(&ll(0.5, 0.5)));
        assert!(!result.contains(&ll(1.5, 1.5)));
    }

    #[test]
    fn union_is_idempotent() {
        let a = square_index(0.0, 0.0, 2.0);
        let a_again = square_index(0.0, 0.0, 2.0);
        let result = run(OpType::Union, &a, &a_again);
        assert_eq!(result.num_loops(), 1);
        let expected = square_loop(0.0, 0.0, 2.0).area();
        assert_relative_eq!(result.area(), expected, max_relative = 1e-9);
    }

    #[test]
    fn intersection_and_difference_partition_the_region() {
        let a = square_index(0.0, 0.0, 2.0);
        let b = square_index(1.0, 1.0, 2.0);

        let inter = run(OpType::Intersection, &a, &b);
        let diff = run(OpType::Difference, &a, &b);
        let reunion = run(OpType::Union, &index_of(&inter), &index_of(&diff));

        let expected = square_loop(0.0, 0.0, 2.0).area();
        assert_relative_eq!(reunion.area(), expected, max_relative = 1e-6);
    }

    #[test]
    fn symmetric_difference_follows_the_emission_table() {
        // The emission table's symmetric-difference row equals the union
        // row, so the assembled boundary matches the union boundary.
        let a = square_index(0.0, 0.0, 2.0);
        let b = square_index(5.0, 5.0, 2.0);
        let result = run(OpType::SymmetricDifference, &a, &b);
        assert_eq!(result.num_loops(), 2);
    }
}
