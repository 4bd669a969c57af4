pub mod graph;
pub mod layer;
pub mod snap;

pub use graph::{
    DegenerateEdges, DuplicateEdges, EdgeType, Graph, GraphEdge, GraphOptions, SiblingPairs,
};
pub use layer::{Layer, PolygonLayer};
pub use snap::{IdentitySnapFunction, LatLngGridSnapFunction, SnapFunction};

use std::collections::{HashMap, VecDeque};

use crate::error::{OperationError, Result};
use crate::geometry::{Point, Polygon};
use crate::math::chord_angle::ChordAngle;
use crate::math::intersect::edge_intersection;
use crate::math::predicates::interior_crossing;
use crate::math::{Angle, TOLERANCE};

/// Controls the behavior of a [`Builder`].
pub struct BuilderOptions {
    pub snap_function: Box<dyn SnapFunction>,
    pub split_crossing_edges: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            snap_function: Box::new(IdentitySnapFunction::new(0.0)),
            split_crossing_edges: false,
        }
    }
}

/// An input edge referencing vertices by index.
#[derive(Debug, Clone, Copy)]
struct InputEdge {
    v0: usize,
    v1: usize,
}

/// Assembles polygonal geometry from edges.
///
/// Edges are accumulated with [`add_edge`](Builder::add_edge) /
/// [`add_polygon`](Builder::add_polygon), then
/// [`build`](Builder::build) — which consumes the builder, making each
/// instance single-use — optionally splits crossing edges, snaps vertices
/// to sites, and dispatches the resulting graph to every registered layer
/// in registration order.
#[derive(Default)]
pub struct Builder<'a> {
    options: BuilderOptions,
    layers: Vec<Box<dyn Layer + 'a>>,
    input_vertices: Vec<Point>,
    input_edges: Vec<InputEdge>,
}

impl<'a> Builder<'a> {
    /// Creates a builder with the given options.
    #[must_use]
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Registers an output layer. Layers are built in registration order.
    pub fn start_layer(&mut self, layer: impl Layer + 'a) {
        self.layers.push(Box::new(layer));
    }

    /// Adds an edge. No validation happens at call time; zero-length edges
    /// are permitted and resolved by the degenerate-edge policy later.
    pub fn add_edge(&mut self, v0: Point, v1: Point) {
        let base = self.input_vertices.len();
        self.input_vertices.push(v0);
        self.input_vertices.push(v1);
        self.input_edges.push(InputEdge {
            v0: base,
            v1: base + 1,
        });
    }

    /// Adds every edge of every loop of a polygon, closing edges included.
    pub fn add_polygon(&mut self, polygon: &Polygon) {
        for l in polygon.loops() {
            for j in 0..l.num_vertices() {
                self.add_edge(l.vertex(j), l.vertex(j + 1));
            }
        }
    }

    /// Number of input edges accumulated so far.
    #[must_use]
    pub fn num_input_edges(&self) -> usize {
        self.input_edges.len()
    }

    /// Snaps vertices, constructs the edge graph, and builds every layer.
    ///
    /// # Errors
    ///
    /// Returns the first error from crossing resolution, graph
    /// normalization, or a layer build; remaining layers are not built.
    pub fn build(mut self) -> Result<()> {
        if self.options.split_crossing_edges {
            self.resolve_crossings()?;
        }

        // Map every input vertex to a site: snap it, then merge with an
        // existing site within the snap radius, else start a new site.
        // Greedy first-match, deterministic in input order.
        let mut table = SiteTable::new(self.options.snap_function.snap_radius());
        let site_map: Vec<usize> = self
            .input_vertices
            .iter()
            .map(|v| table.site_for(self.options.snap_function.snap_point(v)))
            .collect();
        let sites = table.sites;

        // Degenerate edges (both endpoints on one site) are retained here;
        // each layer's graph options decide their fate.
        let edges: Vec<GraphEdge> = self
            .input_edges
            .iter()
            .enumerate()
            .map(|(id, e)| GraphEdge {
                src: site_map[e.v0],
                dst: site_map[e.v1],
                input_ids: vec![id],
            })
            .collect();

        for layer in &mut self.layers {
            let graph = Graph::new(layer.graph_options(), sites.clone(), edges.clone())?;
            layer.build(&graph)?;
        }

        Ok(())
    }

    /// Splits edges at their interior crossing points until none remain.
    ///
    /// Worklist fixed point: every split re-queues the four sub-edges for
    /// re-testing. Both edges are split at the same intersection point, so
    /// the snapping phase maps the split ends to one site even with a zero
    /// snap radius.
    fn resolve_crossings(&mut self) -> Result<()> {
        let n = self.input_edges.len();
        let max_splits = 64 + 8 * n * n;
        let mut splits = 0usize;
        let mut queue: VecDeque<usize> = (0..n).collect();

        while let Some(i) = queue.pop_front() {
            for j in 0..self.input_edges.len() {
                if j == i {
                    continue;
                }
                let (a0, a1) = self.edge_points(i);
                let (b0, b1) = self.edge_points(j);
                if !interior_crossing(&a0, &a1, &b0, &b1) {
                    continue;
                }

                splits += 2;
                if splits > max_splits {
                    return Err(OperationError::Failed(
                        "crossing resolution did not converge".to_owned(),
                    )
                    .into());
                }

                let x = edge_intersection(&a0, &a1, &b0, &b1)?;
                let xi = self.input_vertices.len();
                self.input_vertices.push(x);

                let ni = self.split_edge(i, xi);
                let nj = self.split_edge(j, xi);
                queue.extend([i, ni, j, nj]);
                break;
            }
        }
        Ok(())
    }

    fn edge_points(&self, i: usize) -> (Point, Point) {
        let e = self.input_edges[i];
        (self.input_vertices[e.v0], self.input_vertices[e.v1])
    }

    /// Truncates edge `i` at vertex `xi` and appends the tail as a new
    /// edge, returning the new edge's index.
    fn split_edge(&mut self, i: usize, xi: usize) -> usize {
        let tail = InputEdge {
            v0: xi,
            v1: self.input_edges[i].v1,
        };
        self.input_edges[i].v1 = xi;
        self.input_edges.push(tail);
        self.input_edges.len() - 1
    }
}

/// Spatial hash grid over emitted sites, replacing a linear
/// scan-for-nearby-site with O(1) neighborhood lookups while keeping the
/// same snap-radius contract.
struct SiteTable {
    cell_size: f64,
    radius: ChordAngle,
    grid: HashMap<(i64, i64, i64), Vec<usize>>,
    sites: Vec<Point>,
}

impl SiteTable {
    fn new(snap_radius: Angle) -> Self {
        // Cells are sized to the snap radius' chord length so any matching
        // site lies in the 3x3x3 neighborhood of a query cell.
        let chord = 2.0 * (0.5 * snap_radius.max(0.0)).sin();
        Self {
            cell_size: chord.max(TOLERANCE),
            radius: ChordAngle::from_angle(snap_radius),
            grid: HashMap::new(),
            sites: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point) -> (i64, i64, i64) {
        let inv = 1.0 / self.cell_size;
        (
            (p.0.x * inv).floor() as i64,
            (p.0.y * inv).floor() as i64,
            (p.0.z * inv).floor() as i64,
        )
    }

    fn site_for(&mut self, snapped: Point) -> usize {
        let key = self.cell_key(&snapped);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (key.0 + dx, key.1 + dy, key.2 + dz);
                    if let Some(entries) = self.grid.get(&neighbor) {
                        for &site in entries {
                            if ChordAngle::between(&snapped, &self.sites[site]) <= self.radius {
                                return site;
                            }
                        }
                    }
                }
            }
        }

        let site = self.sites.len();
        self.sites.push(snapped);
        self.grid.entry(key).or_default().push(site);
        site
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Loop;
    use crate::math::km_to_angle;
    use crate::math::latlng::LatLng;

    fn ll(lat: f64, lng: f64) -> Point {
        LatLng::from_degrees(lat, lng).to_point()
    }

    #[test]
    fn exact_square_builds_one_loop() {
        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions::default());
        builder.start_layer(PolygonLayer::new(&mut polygon));
        let pts = [ll(0.0, 0.0), ll(0.0, 1.0), ll(1.0, 1.0), ll(1.0, 0.0)];
        for i in 0..4 {
            builder.add_edge(pts[i], pts[(i + 1) % 4]);
        }
        builder.build().unwrap();
        assert_eq!(polygon.num_loops(), 1);
        assert_eq!(polygon.loop_at(0).num_vertices(), 4);
    }

    #[test]
    fn snapping_closes_a_near_closed_ring() {
        // Almost-closed ring with a 0.0000001 degree gap; a 100 m snap
        // radius must weld the final vertex back onto the first.
        let pts = [
            ll(0.0, 0.0),
            ll(0.0, 1.0),
            ll(1.0, 1.0),
            ll(1.0, 0.0),
            ll(0.0, 0.000_000_1),
        ];
        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions {
            snap_function: Box::new(IdentitySnapFunction::new(km_to_angle(0.1))),
            split_crossing_edges: false,
        });
        builder.start_layer(PolygonLayer::new(&mut polygon));
        for i in 0..pts.len() - 1 {
            builder.add_edge(pts[i], pts[i + 1]);
        }
        builder.build().unwrap();
        assert_eq!(polygon.num_loops(), 1);
        assert_eq!(polygon.loop_at(0).num_vertices(), 4);
    }

    #[test]
    fn open_chain_is_reported() {
        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions::default());
        builder.start_layer(PolygonLayer::new(&mut polygon));
        builder.add_edge(ll(0.0, 0.0), ll(0.0, 1.0));
        builder.add_edge(ll(0.0, 1.0), ll(1.0, 1.0));
        assert!(builder.build().is_err());
    }

    #[test]
    fn add_polygon_round_trips_through_build() {
        let input = Polygon::from_loops(vec![Loop::new(vec![
            ll(0.0, 0.0),
            ll(0.0, 2.0),
            ll(2.0, 2.0),
            ll(2.0, 0.0),
        ])]);
        let mut output = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions::default());
        builder.start_layer(PolygonLayer::new(&mut output));
        builder.add_polygon(&input);
        builder.build().unwrap();
        assert_eq!(output.num_loops(), 1);
        assert!(output.contains(&ll(1.0, 1.0)));
    }

    #[test]
    fn crossing_edges_are_split_and_assembled() {
        // Bowtie: the two diagonals cross, so the ring is only assemblable
        // after the crossing is split.
        let pts = [ll(0.0, 0.0), ll(1.0, 1.0), ll(1.0, 0.0), ll(0.0, 1.0)];
        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions {
            snap_function: Box::new(IdentitySnapFunction::new(0.0)),
            split_crossing_edges: true,
        });
        builder.start_layer(PolygonLayer::new(&mut polygon));
        for i in 0..4 {
            builder.add_edge(pts[i], pts[(i + 1) % 4]);
        }
        builder.build().unwrap();
        assert_eq!(polygon.num_loops(), 1);
        assert_eq!(polygon.loop_at(0).num_vertices(), 6);
    }

    #[test]
    fn snapped_vertices_stay_within_radius() {
        let snap = LatLngGridSnapFunction::new(1);
        let radius = snap.snap_radius();
        let pts = [
            ll(0.04, 0.03),
            ll(0.02, 2.04),
            ll(1.97, 2.01),
            ll(2.03, -0.02),
        ];
        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions {
            snap_function: Box::new(snap),
            split_crossing_edges: false,
        });
        builder.start_layer(PolygonLayer::new(&mut polygon));
        for i in 0..4 {
            builder.add_edge(pts[i], pts[(i + 1) % 4]);
        }
        builder.build().unwrap();
        assert_eq!(polygon.num_loops(), 1);
        for v in polygon.loop_at(0).vertices() {
            let moved = pts.iter().map(|p| p.angle(v)).fold(f64::MAX, f64::min);
            assert!(moved <= radius, "site moved {moved} > snap radius {radius}");
        }
    }

    #[test]
    fn builder_without_layers_is_a_no_op() {
        let mut builder = Builder::new(BuilderOptions::default());
        builder.add_edge(ll(0.0, 0.0), ll(1.0, 1.0));
        assert!(builder.build().is_ok());
    }
}
