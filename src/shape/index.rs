use slotmap::{new_key_type, SlotMap};

use crate::error::TopologyError;
use crate::geometry::Point;
use crate::math::Angle;

use super::Shape;

new_key_type! {
    /// Generational key identifying a shape within a [`ShapeIndex`].
    pub struct ShapeId;
}

/// A spherical cap bounding a set of edges, used as a conservative filter
/// when enumerating candidate crossings: it may report phantom overlaps
/// but never misses a real one.
#[derive(Debug, Clone, Copy)]
pub struct BoundingCap {
    center: Point,
    radius: Angle,
}

impl BoundingCap {
    /// An empty cap.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            center: Point::new(1.0, 0.0, 0.0),
            radius: -1.0,
        }
    }

    /// A cap covering every edge of the given shape.
    ///
    /// Centered on the normalized vertex centroid; the radius covers the
    /// farthest vertex plus half the longest edge, which bounds how far any
    /// edge arc can bulge beyond its endpoints.
    #[must_use]
    pub fn for_shape(shape: &Shape) -> Self {
        let mut sum = crate::math::Vector3::zeros();
        let mut count = 0usize;
        for i in 0..shape.num_edges() {
            let e = shape.edge(i);
            sum += e.v0.0;
            sum += e.v1.0;
            count += 2;
        }
        if count == 0 || sum.norm() < crate::math::TOLERANCE {
            return Self {
                center: Point::new(1.0, 0.0, 0.0),
                radius: std::f64::consts::PI,
            };
        }
        let center = Point(sum.normalize());
        let mut max_vertex: Angle = 0.0;
        let mut max_edge: Angle = 0.0;
        for i in 0..shape.num_edges() {
            let e = shape.edge(i);
            max_vertex = max_vertex.max(center.angle(&e.v0)).max(center.angle(&e.v1));
            max_edge = max_edge.max(e.v0.angle(&e.v1));
        }
        Self {
            center,
            radius: max_vertex + 0.5 * max_edge,
        }
    }

    /// A cap covering the single edge `(a, b)`, centered on the edge
    /// midpoint. Exact: every point of the minor arc lies within it.
    #[must_use]
    pub fn for_edge(a: &Point, b: &Point) -> Self {
        let mid = a.0 + b.0;
        if mid.norm() < crate::math::TOLERANCE {
            // Near-antipodal edge; fall back to a full cap.
            return Self {
                center: Point::new(1.0, 0.0, 0.0),
                radius: std::f64::consts::PI,
            };
        }
        let center = Point(mid.normalize());
        Self {
            center,
            radius: center.angle(a),
        }
    }

    /// Reports whether two caps can overlap.
    #[must_use]
    pub fn may_intersect(&self, other: &Self) -> bool {
        if self.radius < 0.0 || other.radius < 0.0 {
            return false;
        }
        self.center.angle(&other.center) <= self.radius + other.radius
    }
}

/// An ownership container for shapes plus their bounding caps.
///
/// Shapes are stored in a generational arena and referenced by typed
/// [`ShapeId`] keys. The index is treated as immutable while boolean or
/// buffer operations read from it, which makes concurrent read-only use of
/// the same index by independent operations safe.
#[derive(Debug, Default)]
pub struct ShapeIndex {
    shapes: SlotMap<ShapeId, IndexedShape>,
}

#[derive(Debug)]
struct IndexedShape {
    shape: Shape,
    cap: BoundingCap,
}

impl ShapeIndex {
    /// Creates a new, empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a shape and returns its ID.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let cap = BoundingCap::for_shape(&shape);
        self.shapes.insert(IndexedShape { shape, cap })
    }

    /// Returns a reference to the shape, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is not in the index.
    pub fn shape(&self, id: ShapeId) -> Result<&Shape, TopologyError> {
        self.shapes
            .get(id)
            .map(|entry| &entry.shape)
            .ok_or_else(|| TopologyError::EntityNotFound("shape".into()))
    }

    /// The bounding cap of a shape, or an empty cap if not found.
    #[must_use]
    pub fn cap(&self, id: ShapeId) -> BoundingCap {
        self.shapes
            .get(id)
            .map_or_else(BoundingCap::empty, |entry| entry.cap)
    }

    /// Number of shapes in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Reports whether the index holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates over `(id, shape)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter().map(|(id, entry)| (id, &entry.shape))
    }

    /// Even-odd containment of `p` by the union of all polygon-dimension
    /// shapes in the index: inside when contained by an odd number of
    /// loops. Boundary points classify by deterministic sign parity (see
    /// [`crate::geometry::Loop::contains`]).
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        let mut inside = false;
        for (_, entry) in &self.shapes {
            if let Shape::PolygonBoundary(loops) = &entry.shape {
                for l in loops {
                    if l.contains(p) {
                        inside = !inside;
                    }
                }
            }
        }
        inside
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Loop;
    use crate::math::latlng::LatLng;

    fn ll(lat: f64, lng: f64) -> Point {
        LatLng::from_degrees(lat, lng).to_point()
    }

    fn square(lat: f64, lng: f64, size: f64) -> Shape {
        Shape::PolygonBoundary(vec![Loop::new(vec![
            ll(lat, lng),
            ll(lat, lng + size),
            ll(lat + size, lng + size),
            ll(lat + size, lng),
        ])])
    }

    #[test]
    fn add_and_lookup() {
        let mut index = ShapeIndex::new();
        let id = index.add(square(0.0, 0.0, 1.0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.shape(id).unwrap().num_edges(), 4);
    }

    #[test]
    fn contains_uses_even_odd_over_shapes() {
        let mut index = ShapeIndex::new();
        index.add(square(0.0, 0.0, 4.0));
        index.add(square(1.0, 1.0, 2.0));
        assert!(index.contains(&ll(0.5, 0.5)));
        assert!(!index.contains(&ll(2.0, 2.0)));
        assert!(!index.contains(&ll(10.0, 10.0)));
    }

    #[test]
    fn shape_cap_covers_all_edges() {
        let mut index = ShapeIndex::new();
        let id = index.add(square(0.0, 0.0, 2.0));
        let cap = index.cap(id);
        let inside_edge = BoundingCap::for_edge(&ll(0.0, 0.0), &ll(0.0, 2.0));
        assert!(cap.may_intersect(&inside_edge));
    }

    #[test]
    fn distant_edge_cap_is_pruned() {
        let mut index = ShapeIndex::new();
        let id = index.add(square(0.0, 0.0, 1.0));
        let cap = index.cap(id);
        let far = BoundingCap::for_edge(&ll(40.0, 40.0), &ll(41.0, 40.0));
        assert!(!cap.may_intersect(&far));
    }

    #[test]
    fn empty_cap_never_intersects() {
        let empty = BoundingCap::empty();
        let edge = BoundingCap::for_edge(&ll(0.0, 0.0), &ll(1.0, 0.0));
        assert!(!empty.may_intersect(&edge));
    }
}
