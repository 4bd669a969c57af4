use std::collections::HashMap;

use crate::error::{Result, TopologyError};
use crate::geometry::Point;

/// Whether graph edges are directed or undirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeType {
    #[default]
    Directed,
    Undirected,
}

/// Policy for edges whose endpoints snapped to the same site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegenerateEdges {
    /// Retain them as explicit point-like edges (`src == dst`), e.g. for
    /// layers that represent isolated points.
    #[default]
    Keep,
    Discard,
}

/// Policy for multiple edges connecting the same pair of sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateEdges {
    #[default]
    Keep,
    /// Collapse duplicates into one edge, concatenating their input-edge
    /// provenance lists.
    Merge,
}

/// Policy for sibling pairs (an edge and its reverse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiblingPairs {
    #[default]
    Keep,
    /// Cancel sibling pairs one-for-one. Polygon boundary assembly uses
    /// this: a back-to-back edge pair encloses nothing.
    Discard,
    /// Demand that every edge has a sibling; report an error otherwise.
    Require,
}

/// Declares the normalization a layer requires of its input graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    pub edge_type: EdgeType,
    pub degenerate_edges: DegenerateEdges,
    pub duplicate_edges: DuplicateEdges,
    pub sibling_pairs: SiblingPairs,
}

/// An edge between two snapped sites, carrying the IDs of the input edges
/// it originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub src: usize,
    pub dst: usize,
    pub input_ids: Vec<usize>,
}

/// An immutable directed-edge graph over snapped sites.
///
/// Constructed once per layer during a build; the layer's
/// [`GraphOptions`] are applied at construction, in order: degenerate
/// policy, duplicate policy, sibling policy. Adjacency is computed eagerly
/// so lookups during assembly are O(1).
#[derive(Debug)]
pub struct Graph {
    options: GraphOptions,
    vertices: Vec<Point>,
    edges: Vec<GraphEdge>,
    out_edges: Vec<Vec<usize>>,
}

impl Graph {
    /// Builds a graph from snapped sites and mapped edges, applying the
    /// given normalization policies.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MissingSibling`] under
    /// [`SiblingPairs::Require`] when some edge has no reverse partner.
    pub fn new(options: GraphOptions, vertices: Vec<Point>, edges: Vec<GraphEdge>) -> Result<Self> {
        let mut edges = edges;

        if options.degenerate_edges == DegenerateEdges::Discard {
            edges.retain(|e| e.src != e.dst);
        }

        if options.duplicate_edges == DuplicateEdges::Merge {
            edges = merge_duplicates(edges, options.edge_type);
        }

        match options.sibling_pairs {
            SiblingPairs::Keep => {}
            SiblingPairs::Discard => edges = discard_siblings(edges),
            SiblingPairs::Require => require_siblings(&edges)?,
        }

        let mut out_edges = vec![Vec::new(); vertices.len()];
        for (i, e) in edges.iter().enumerate() {
            out_edges[e.src].push(i);
        }

        Ok(Self {
            options,
            vertices,
            edges,
            out_edges,
        })
    }

    /// The options this graph was normalized with.
    #[must_use]
    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// Number of vertices (sites).
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the vertex at `i`.
    #[must_use]
    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i]
    }

    /// Number of edges after normalization.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edge at `i`.
    #[must_use]
    pub fn edge(&self, i: usize) -> &GraphEdge {
        &self.edges[i]
    }

    /// Indices of edges leaving vertex `v`, in edge order.
    #[must_use]
    pub fn out_edges(&self, v: usize) -> &[usize] {
        &self.out_edges[v]
    }
}

fn duplicate_key(e: &GraphEdge, edge_type: EdgeType) -> (usize, usize) {
    match edge_type {
        EdgeType::Directed => (e.src, e.dst),
        EdgeType::Undirected => (e.src.min(e.dst), e.src.max(e.dst)),
    }
}

fn merge_duplicates(edges: Vec<GraphEdge>, edge_type: EdgeType) -> Vec<GraphEdge> {
    let mut merged: Vec<GraphEdge> = Vec::with_capacity(edges.len());
    let mut by_key: HashMap<(usize, usize), usize> = HashMap::new();
    for e in edges {
        let key = duplicate_key(&e, edge_type);
        if let Some(&i) = by_key.get(&key) {
            merged[i].input_ids.extend(e.input_ids);
        } else {
            by_key.insert(key, merged.len());
            merged.push(e);
        }
    }
    merged
}

fn discard_siblings(edges: Vec<GraphEdge>) -> Vec<GraphEdge> {
    // Cancel min(count(u->v), count(v->u)) edges from each direction.
    // Degenerate edges are their own reverse and are left alone.
    let mut count: HashMap<(usize, usize), usize> = HashMap::new();
    for e in &edges {
        if e.src != e.dst {
            *count.entry((e.src, e.dst)).or_insert(0) += 1;
        }
    }
    let mut to_cancel: HashMap<(usize, usize), usize> = HashMap::new();
    for (&(src, dst), &n) in &count {
        if src < dst {
            let reverse = count.get(&(dst, src)).copied().unwrap_or(0);
            let cancelled = n.min(reverse);
            if cancelled > 0 {
                to_cancel.insert((src, dst), cancelled);
                to_cancel.insert((dst, src), cancelled);
            }
        }
    }
    edges
        .into_iter()
        .filter(|e| {
            if e.src == e.dst {
                return true;
            }
            match to_cancel.get_mut(&(e.src, e.dst)) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    false
                }
                _ => true,
            }
        })
        .collect()
}

fn require_siblings(edges: &[GraphEdge]) -> Result<()> {
    let mut count: HashMap<(usize, usize), i64> = HashMap::new();
    for e in edges {
        if e.src != e.dst {
            *count.entry((e.src, e.dst)).or_insert(0) += 1;
        }
    }
    for (&(src, dst), &n) in &count {
        let reverse = count.get(&(dst, src)).copied().unwrap_or(0);
        if n > reverse {
            return Err(TopologyError::MissingSibling { src, dst }.into());
        }
    }
    Ok(())
}
