pub mod crossing;
pub mod index;
pub mod nesting;

pub use crossing::{CrossingEdgeQuery, CrossingType};
pub use index::{ShapeId, ShapeIndex};
pub use nesting::{ChainRelation, ShapeNestingQuery, ShapeNestingQueryOptions};

use crate::geometry::{Loop, Point, Polygon};

/// A directed great-circle edge between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub v0: Point,
    pub v1: Point,
}

/// A maximal contiguous run of edges within a shape, representing one loop
/// or polyline. Identified by the index of its first edge and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    pub start: usize,
    pub length: usize,
}

/// The (chain, offset-within-chain) position of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPosition {
    pub chain: usize,
    pub offset: usize,
}

/// A point with known containment, used to seed interior/exterior
/// classification for a shape.
#[derive(Debug, Clone, Copy)]
pub struct ReferencePoint {
    pub point: Point,
    pub contained: bool,
}

/// Polygonal geometry of one of the three dimensions this kernel operates
/// on. The set of kinds is closed, so consumers dispatch with a plain
/// `match` and get uniform edge/chain iteration from the methods below.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Isolated points; each is a length-1 chain holding one degenerate
    /// `(p, p)` edge.
    PointSet(Vec<Point>),
    /// An open vertex chain with `n - 1` edges.
    Polyline(Vec<Point>),
    /// Closed loops, one chain per loop, closing edges included.
    PolygonBoundary(Vec<Loop>),
}

impl Shape {
    /// Builds a polygon-boundary shape from a polygon's loops.
    #[must_use]
    pub fn from_polygon(polygon: &Polygon) -> Self {
        Self::PolygonBoundary(polygon.loops().to_vec())
    }

    /// The dimension of the geometry: 0 for points, 1 for polylines, 2 for
    /// polygon boundaries.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Self::PointSet(_) => 0,
            Self::Polyline(_) => 1,
            Self::PolygonBoundary(_) => 2,
        }
    }

    /// Total number of edges across all chains.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        match self {
            Self::PointSet(points) => points.len(),
            Self::Polyline(vertices) => vertices.len().saturating_sub(1),
            Self::PolygonBoundary(loops) => loops.iter().map(Loop::num_vertices).sum(),
        }
    }

    /// Returns edge `i` under global edge numbering.
    #[must_use]
    pub fn edge(&self, i: usize) -> Edge {
        match self {
            Self::PointSet(points) => Edge {
                v0: points[i],
                v1: points[i],
            },
            Self::Polyline(vertices) => Edge {
                v0: vertices[i],
                v1: vertices[i + 1],
            },
            Self::PolygonBoundary(loops) => {
                let pos = self.chain_position(i);
                let l = &loops[pos.chain];
                Edge {
                    v0: l.vertex(pos.offset),
                    v1: l.vertex(pos.offset + 1),
                }
            }
        }
    }

    /// Number of chains.
    #[must_use]
    pub fn num_chains(&self) -> usize {
        match self {
            Self::PointSet(points) => points.len(),
            Self::Polyline(vertices) => usize::from(vertices.len() >= 2),
            Self::PolygonBoundary(loops) => loops.len(),
        }
    }

    /// Returns chain `i`.
    #[must_use]
    pub fn chain(&self, i: usize) -> Chain {
        match self {
            Self::PointSet(_) => Chain { start: i, length: 1 },
            Self::Polyline(vertices) => Chain {
                start: 0,
                length: vertices.len() - 1,
            },
            Self::PolygonBoundary(loops) => {
                let start = loops[..i].iter().map(Loop::num_vertices).sum();
                Chain {
                    start,
                    length: loops[i].num_vertices(),
                }
            }
        }
    }

    /// Returns edge `offset` of chain `chain`.
    #[must_use]
    pub fn chain_edge(&self, chain: usize, offset: usize) -> Edge {
        self.edge(self.chain(chain).start + offset)
    }

    /// Locates the chain containing edge `i`.
    #[must_use]
    pub fn chain_position(&self, i: usize) -> ChainPosition {
        match self {
            Self::PointSet(_) => ChainPosition { chain: i, offset: 0 },
            Self::Polyline(_) => ChainPosition { chain: 0, offset: i },
            Self::PolygonBoundary(loops) => {
                let mut remaining = i;
                for (chain, l) in loops.iter().enumerate() {
                    if remaining < l.num_vertices() {
                        return ChainPosition {
                            chain,
                            offset: remaining,
                        };
                    }
                    remaining -= l.num_vertices();
                }
                ChainPosition {
                    chain: loops.len().saturating_sub(1),
                    offset: remaining,
                }
            }
        }
    }

    /// The vertices of chain `i` in walk order. For polygon chains the
    /// closing vertex is not repeated.
    #[must_use]
    pub fn chain_vertices(&self, i: usize) -> Vec<Point> {
        match self {
            Self::PointSet(points) => vec![points[i]],
            Self::Polyline(vertices) => vertices.clone(),
            Self::PolygonBoundary(loops) => loops[i].vertices().to_vec(),
        }
    }

    /// A reference point with known containment.
    ///
    /// Lower-dimensional shapes have no interior, and boundary points of
    /// polygon shapes classify as exterior under this kernel's containment
    /// model, so the first vertex with `contained = false` serves for every
    /// kind. Empty shapes fall back to a fixed axis point.
    #[must_use]
    pub fn reference_point(&self) -> ReferencePoint {
        let point = match self {
            Self::PointSet(points) | Self::Polyline(points) => points.first().copied(),
            Self::PolygonBoundary(loops) => loops
                .iter()
                .find(|l| l.num_vertices() > 0)
                .map(|l| l.vertex(0)),
        };
        ReferencePoint {
            point: point.unwrap_or_else(|| Point::new(1.0, 0.0, 0.0)),
            contained: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::latlng::LatLng;

    fn ll(lat: f64, lng: f64) -> Point {
        LatLng::from_degrees(lat, lng).to_point()
    }

    fn two_loop_shape() -> Shape {
        Shape::PolygonBoundary(vec![
            Loop::new(vec![ll(0.0, 0.0), ll(0.0, 4.0), ll(4.0, 4.0), ll(4.0, 0.0)]),
            Loop::new(vec![ll(1.0, 1.0), ll(1.0, 3.0), ll(3.0, 3.0)]),
        ])
    }

    #[test]
    fn polygon_chain_numbering() {
        let shape = two_loop_shape();
        assert_eq!(shape.dimension(), 2);
        assert_eq!(shape.num_chains(), 2);
        assert_eq!(shape.num_edges(), 7);
        assert_eq!(shape.chain(0), Chain { start: 0, length: 4 });
        assert_eq!(shape.chain(1), Chain { start: 4, length: 3 });
    }

    #[test]
    fn polygon_closing_edge_wraps() {
        let shape = two_loop_shape();
        let closing = shape.chain_edge(0, 3);
        assert!(closing.v0.approx_eq(&ll(4.0, 0.0)));
        assert!(closing.v1.approx_eq(&ll(0.0, 0.0)));
    }

    #[test]
    fn chain_position_round_trip() {
        let shape = two_loop_shape();
        assert_eq!(shape.chain_position(5), ChainPosition { chain: 1, offset: 1 });
        assert_eq!(shape.chain_position(0), ChainPosition { chain: 0, offset: 0 });
    }

    #[test]
    fn point_set_edges_are_degenerate() {
        let shape = Shape::PointSet(vec![ll(1.0, 1.0), ll(2.0, 2.0)]);
        assert_eq!(shape.dimension(), 0);
        assert_eq!(shape.num_chains(), 2);
        let e = shape.edge(1);
        assert!(e.v0.approx_eq(&e.v1));
    }

    #[test]
    fn polyline_is_one_chain() {
        let shape = Shape::Polyline(vec![ll(0.0, 0.0), ll(1.0, 0.0), ll(2.0, 0.0)]);
        assert_eq!(shape.dimension(), 1);
        assert_eq!(shape.num_chains(), 1);
        assert_eq!(shape.num_edges(), 2);
        let e = shape.edge(1);
        assert!(e.v0.approx_eq(&ll(1.0, 0.0)));
        assert!(e.v1.approx_eq(&ll(2.0, 0.0)));
    }

    #[test]
    fn reference_point_is_not_contained() {
        let shape = two_loop_shape();
        assert!(!shape.reference_point().contained);
    }
}
