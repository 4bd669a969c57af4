use std::cmp::Ordering;

use crate::error::Result;
use crate::geometry::Point;
use crate::math::chord_angle::ChordAngle;
use crate::math::intersect::edge_intersection;
use crate::operations::builder::Builder;
use crate::shape::{CrossingEdgeQuery, CrossingType, Shape, ShapeIndex};

use super::select::{should_emit, OpType};

/// Walks every chain of a query region against a reference region,
/// splitting edges at interior crossings and emitting the sub-segments the
/// operation keeps.
///
/// The parity invariant drives the walk: a chain starts inside or outside
/// the reference region according to its first vertex, and every interior
/// crossing flips that state exactly once.
#[derive(Debug)]
pub struct CrossingProcessor<'a> {
    op: OpType,
    query: &'a ShapeIndex,
    reference: &'a ShapeIndex,
    second_region: bool,
}

impl<'a> CrossingProcessor<'a> {
    /// Creates a processor for one pass of the operation. `second_region`
    /// marks the B-vs-A pass, whose emission rules differ for
    /// [`OpType::Difference`].
    #[must_use]
    pub fn new(
        op: OpType,
        query: &'a ShapeIndex,
        reference: &'a ShapeIndex,
        second_region: bool,
    ) -> Self {
        Self {
            op,
            query,
            reference,
            second_region,
        }
    }

    /// Emits the kept sub-segments of every chain into the builder.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference shape disappears mid-query or an
    /// intersection point cannot be computed for a reported crossing.
    pub fn emit_edges(&self, builder: &mut Builder<'_>) -> Result<()> {
        for (_, shape) in self.query.iter() {
            for chain_id in 0..shape.num_chains() {
                self.process_chain(shape, chain_id, builder)?;
            }
        }
        Ok(())
    }

    fn process_chain(
        &self,
        shape: &Shape,
        chain_id: usize,
        builder: &mut Builder<'_>,
    ) -> Result<()> {
        let chain = shape.chain(chain_id);
        if chain.length == 0 {
            return Ok(());
        }

        // Initial inside/outside parity from the chain's first vertex.
        let first = shape.chain_edge(chain_id, 0);
        let mut inside = self.reference.contains(&first.v0);

        let crossing_query = CrossingEdgeQuery::new(self.reference);

        for offset in 0..chain.length {
            let edge = shape.chain_edge(chain_id, offset);

            // Interior crossings against the reference region, ordered by
            // distance from the edge start.
            let mut crossings: Vec<(ChordAngle, Point)> = Vec::new();
            for (shape_id, edge_id) in
                crossing_query.crossings(&edge.v0, &edge.v1, CrossingType::Interior)
            {
                let other = self.reference.shape(shape_id)?.edge(edge_id);
                let x = edge_intersection(&edge.v0, &edge.v1, &other.v0, &other.v1)?;
                crossings.push((ChordAngle::between(&edge.v0, &x), x));
            }
            crossings.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

            let num_crossings = crossings.len();
            let mut boundaries = Vec::with_capacity(num_crossings + 2);
            boundaries.push(edge.v0);
            boundaries.extend(crossings.into_iter().map(|(_, x)| x));
            boundaries.push(edge.v1);

            for i in 0..boundaries.len() - 1 {
                let a = boundaries[i];
                let b = boundaries[i + 1];
                if !a.approx_eq(&b) && should_emit(self.op, inside, self.second_region) {
                    self.emit(builder, a, b);
                }
                // Parity flips at each crossing point (never at the final
                // endpoint).
                if i < num_crossings {
                    inside = !inside;
                }
            }
        }
        Ok(())
    }

    fn emit(&self, builder: &mut Builder<'_>, a: Point, b: Point) {
        // Difference keeps the parts of B's boundary that close off the
        // subtracted region; they bound the output from the opposite side,
        // so they are emitted reversed to keep vertex degrees balanced for
        // loop assembly.
        if self.op == OpType::Difference && self.second_region {
            builder.add_edge(b, a);
        } else {
            builder.add_edge(a, b);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Loop;
    use crate::math::latlng::LatLng;
    use crate::operations::builder::BuilderOptions;

    fn ll(lat: f64, lng: f64) -> Point {
        LatLng::from_degrees(lat, lng).to_point()
    }

    fn square_index(lat: f64, lng: f64, size: f64) -> ShapeIndex {
        let mut index = ShapeIndex::new();
        index.add(Shape::PolygonBoundary(vec![Loop::new(vec![
            ll(lat, lng),
            ll(lat, lng + size),
            ll(lat + size, lng + size),
            ll(lat + size, lng),
        ])]));
        index
    }

    /// Runs one pass into a fresh builder and returns how many edges were
    /// emitted.
    fn run_pass(op: OpType, query: &ShapeIndex, reference: &ShapeIndex, second: bool) -> usize {
        let mut builder = Builder::new(BuilderOptions::default());
        CrossingProcessor::new(op, query, reference, second)
            .emit_edges(&mut builder)
            .unwrap();
        builder.num_input_edges()
    }

    #[test]
    fn chain_parity_toggles_per_crossing() {
        // A's four edges against an overlapping square: two edges cross
        // once each, so each splits into an emitted and a suppressed part.
        let a = square_index(0.0, 0.0, 2.0);
        let b = square_index(1.0, 1.0, 2.0);
        // Intersection keeps exactly one sub-segment per crossing edge.
        assert_eq!(run_pass(OpType::Intersection, &a, &b, false), 2);
        // Union keeps the outside parts: two whole edges plus two halves.
        assert_eq!(run_pass(OpType::Union, &a, &b, false), 4);
    }

    #[test]
    fn disjoint_chain_emits_whole_boundary_for_union() {
        let a = square_index(0.0, 0.0, 1.0);
        let b = square_index(10.0, 10.0, 1.0);
        assert_eq!(run_pass(OpType::Union, &a, &b, false), 4);
        assert_eq!(run_pass(OpType::Intersection, &a, &b, false), 0);
    }

    #[test]
    fn contained_chain_emits_everything_inside() {
        let outer = square_index(0.0, 0.0, 4.0);
        let inner = square_index(1.0, 1.0, 2.0);
        assert_eq!(run_pass(OpType::Difference, &inner, &outer, true), 4);
        assert_eq!(run_pass(OpType::Union, &inner, &outer, false), 0);
    }
}
