use crate::math::predicates::{interior_crossing, ordered_ccw};

use super::Point;

/// A closed loop of vertices on the sphere, connected by great-circle
/// edges (including the closing edge from the last vertex to the first).
///
/// Loops are oriented — walking the vertices in order, a counter-clockwise
/// loop keeps its interior on the left — but containment queries normalize
/// orientation, so a loop and its reverse enclose the same region.
#[derive(Debug, Clone, Default)]
pub struct Loop {
    vertices: Vec<Point>,
}

impl Loop {
    /// Creates a loop from a vertex list.
    #[must_use]
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Number of vertices (equals the number of edges).
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns vertex `i`, wrapping past the end so that
    /// `vertex(num_vertices())` is the first vertex again.
    #[must_use]
    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i % self.vertices.len()]
    }

    /// All vertices in order.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Signed spherical area in steradians: positive for counter-clockwise
    /// loops, negative for clockwise ones.
    ///
    /// Computed as a triangle fan from the first vertex, accumulating each
    /// triangle's spherical excess via
    /// `tan(e/2) = a.(b x c) / (1 + a.b + b.c + c.a)`,
    /// which is signed and stable for small triangles.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let a = &self.vertices[0];
        let mut total = 0.0;
        for i in 1..n - 1 {
            let b = &self.vertices[i];
            let c = &self.vertices[i + 1];
            let triple = a.0.dot(&b.0.cross(&c.0));
            let denom = 1.0 + a.0.dot(&b.0) + b.0.dot(&c.0) + c.0.dot(&a.0);
            total += 2.0 * triple.atan2(denom);
        }
        total
    }

    /// Unsigned spherical area in steradians.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Reports whether `p` lies in the region this loop encloses.
    ///
    /// Walks the great-circle arc from an anchor vertex of the loop to `p`:
    /// a wedge orientation test at the anchor decides whether the arc
    /// departs into the interior, and each interior crossing with a loop
    /// edge flips the state. Edges incident to the anchor can only touch
    /// the arc at its endpoint and therefore never register as crossings.
    ///
    /// The result is orientation-normalized: a reversed copy of a loop
    /// denotes the same enclosed region, so holes emitted clockwise still
    /// combine correctly under even-odd semantics.
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut k = 1;
        if self.vertices[k].approx_eq(p) {
            k = 2 % n;
        }
        let anchor = self.vertices[k];
        let prev = self.vertices[(k + n - 1) % n];
        let next = self.vertices[(k + 1) % n];
        let mut inside = ordered_ccw(&next, p, &prev, &anchor);
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            if interior_crossing(&anchor, p, a, b) {
                inside = !inside;
            }
        }
        // The wedge test reads "interior" as the region to the left; for a
        // clockwise loop that is the complement of the enclosed region.
        if self.signed_area() < 0.0 {
            inside = !inside;
        }
        inside
    }
}

/// A polygonal region on the sphere, bounded by a set of loops with
/// even-odd semantics: a point is inside the polygon when it is inside an
/// odd number of loops, so holes are expressed simply as loops around the
/// excluded region.
#[derive(Debug, Clone, Default)]
pub struct Polygon {
    loops: Vec<Loop>,
}

impl Polygon {
    /// Creates an empty polygon (zero loops) — a valid region covering
    /// nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a polygon from a loop set.
    #[must_use]
    pub fn from_loops(loops: Vec<Loop>) -> Self {
        Self { loops }
    }

    /// Number of loops.
    #[must_use]
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Returns loop `i`.
    #[must_use]
    pub fn loop_at(&self, i: usize) -> &Loop {
        &self.loops[i]
    }

    /// All loops.
    #[must_use]
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    /// Reports whether the polygon has no loops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Even-odd point containment across all loops.
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        let mut inside = false;
        for l in &self.loops {
            if l.contains(p) {
                inside = !inside;
            }
        }
        inside
    }

    /// Area of the enclosed region in steradians.
    ///
    /// Consistent with even-odd containment: each loop contributes its
    /// unsigned area positively at even nesting depth (shells) and
    /// negatively at odd depth (holes). Depth is measured by how many other
    /// loops contain a representative vertex of the loop.
    #[must_use]
    pub fn area(&self) -> f64 {
        let mut total = 0.0;
        for (i, l) in self.loops.iter().enumerate() {
            if l.num_vertices() < 3 {
                continue;
            }
            let sample = l.vertex(0);
            let depth = self
                .loops
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.contains(&sample))
                .count();
            let sign = if depth % 2 == 0 { 1.0 } else { -1.0 };
            total += sign * l.area();
        }
        total.max(0.0)
    }
}
