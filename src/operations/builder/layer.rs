use crate::error::{Result, TopologyError};
use crate::geometry::{Loop, Polygon};

use super::graph::{
    DegenerateEdges, DuplicateEdges, EdgeType, Graph, GraphOptions, SiblingPairs,
};

/// A consumer of a builder graph.
///
/// Layers declare the graph normalization they need via `graph_options`
/// and receive the normalized graph in `build`. A layer must not retain
/// the graph after returning; its lifetime is the build call only.
pub trait Layer {
    /// The normalization policies this layer requires.
    fn graph_options(&self) -> GraphOptions;

    /// Assembles the layer's output from the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph violates the layer's invariants.
    fn build(&mut self, graph: &Graph) -> Result<()>;
}

/// Assembles a graph into a [`Polygon`] owned by the caller.
///
/// Loops are extracted greedily: each walk follows unused out-edges (first
/// in edge order) until it returns to its start vertex. After sibling-pair
/// and degenerate-edge normalization every vertex has balanced in/out
/// degree, so a walk that runs out of edges anywhere but its start vertex
/// reveals an upstream invariant violation and is reported as an error.
#[derive(Debug)]
pub struct PolygonLayer<'a> {
    polygon: &'a mut Polygon,
}

impl<'a> PolygonLayer<'a> {
    /// Creates a layer that assembles into the given polygon.
    #[must_use]
    pub fn new(polygon: &'a mut Polygon) -> Self {
        Self { polygon }
    }
}

impl Layer for PolygonLayer<'_> {
    fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            edge_type: EdgeType::Directed,
            degenerate_edges: DegenerateEdges::Discard,
            duplicate_edges: DuplicateEdges::Merge,
            sibling_pairs: SiblingPairs::Discard,
        }
    }

    fn build(&mut self, graph: &Graph) -> Result<()> {
        let mut used = vec![false; graph.num_edges()];
        let mut loops = Vec::new();

        for start in 0..graph.num_edges() {
            if used[start] {
                continue;
            }

            let start_vertex = graph.edge(start).src;
            let mut vertices = Vec::new();
            let mut current = start;

            loop {
                used[current] = true;
                let edge = graph.edge(current);
                vertices.push(graph.vertex(edge.src));

                if edge.dst == start_vertex {
                    break;
                }

                match graph.out_edges(edge.dst).iter().find(|&&i| !used[i]) {
                    Some(&next) => current = next,
                    None => {
                        return Err(TopologyError::OpenChain { vertex: edge.dst }.into());
                    }
                }
            }

            // Closed walks shorter than a triangle are degenerate remnants,
            // not loops.
            if vertices.len() >= 3 {
                loops.push(Loop::new(vertices));
            }
        }

        *self.polygon = Polygon::from_loops(loops);
        Ok(())
    }
}
