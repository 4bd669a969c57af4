use crate::geometry::Point;
use crate::math::predicates::interior_crossing;

use super::index::BoundingCap;
use super::{Shape, ShapeId, ShapeIndex};

/// Which contacts between a query arc and shape edges count as crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingType {
    /// Only crossings strictly interior to both edges. Shared endpoints do
    /// not count, which avoids endpoint complications when the query arc
    /// is anchored on a shape vertex.
    Interior,
    /// Interior crossings plus edges that share an endpoint with the query
    /// arc.
    All,
}

/// Enumerates shape edges crossing a query arc.
///
/// Candidates are pruned with the index's bounding caps (a superset
/// filter); every reported crossing is confirmed with the exact
/// orientation predicates.
#[derive(Debug)]
pub struct CrossingEdgeQuery<'a> {
    index: &'a ShapeIndex,
}

impl<'a> CrossingEdgeQuery<'a> {
    /// Creates a query over the given index.
    #[must_use]
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self { index }
    }

    /// Returns `(shape, edge)` pairs for every indexed edge crossing the
    /// arc from `a` to `b`.
    #[must_use]
    pub fn crossings(&self, a: &Point, b: &Point, crossing_type: CrossingType) -> Vec<(ShapeId, usize)> {
        let query_cap = BoundingCap::for_edge(a, b);
        let mut out = Vec::new();
        for (id, shape) in self.index.iter() {
            if !self.index.cap(id).may_intersect(&query_cap) {
                continue;
            }
            for edge_id in shape_crossings(a, b, shape, crossing_type) {
                out.push((id, edge_id));
            }
        }
        out
    }

    /// Returns the edge IDs of `shape` crossing the arc from `a` to `b`.
    #[must_use]
    pub fn crossings_with_shape(
        &self,
        a: &Point,
        b: &Point,
        shape: &Shape,
        crossing_type: CrossingType,
    ) -> Vec<usize> {
        shape_crossings(a, b, shape, crossing_type)
    }
}

fn shape_crossings(a: &Point, b: &Point, shape: &Shape, crossing_type: CrossingType) -> Vec<usize> {
    let mut out = Vec::new();
    for i in 0..shape.num_edges() {
        let e = shape.edge(i);
        let crosses = match crossing_type {
            CrossingType::Interior => interior_crossing(a, b, &e.v0, &e.v1),
            CrossingType::All => {
                interior_crossing(a, b, &e.v0, &e.v1)
                    || a.approx_eq(&e.v0)
                    || a.approx_eq(&e.v1)
                    || b.approx_eq(&e.v0)
                    || b.approx_eq(&e.v1)
            }
        };
        if crosses {
            out.push(i);
        }
    }
    out
}
