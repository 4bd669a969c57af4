use crate::error::{OperationError, Result, TopologyError};
use crate::math::predicates::ordered_ccw;

use super::{CrossingEdgeQuery, CrossingType, Shape, ShapeId, ShapeIndex};

/// Picks the chain that is a shell by definition.
///
/// On a sphere the polygon hierarchy is ambiguous (two loops can divide
/// the sphere into equal halves); the datum chain resolves the ambiguity
/// by declaring one chain to be a shell.
pub type DatumStrategy = fn(&Shape) -> usize;

/// The default strategy: the first chain is always a shell.
#[must_use]
pub fn first_chain_datum(_shape: &Shape) -> usize {
    0
}

/// Options for [`ShapeNestingQuery`].
#[derive(Debug, Clone, Copy)]
pub struct ShapeNestingQueryOptions {
    pub datum_strategy: DatumStrategy,
}

impl Default for ShapeNestingQueryOptions {
    fn default() -> Self {
        Self {
            datum_strategy: first_chain_datum,
        }
    }
}

/// The parent/child relationship of one chain.
///
/// Relations form a forest: shells have no parent, holes point at their
/// enclosing shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRelation {
    parent: Option<usize>,
    holes: Vec<usize>,
}

impl ChainRelation {
    /// Reports whether the chain has no parent.
    #[must_use]
    pub fn is_shell(&self) -> bool {
        self.parent.is_none()
    }

    /// Reports whether the chain has a parent.
    #[must_use]
    pub fn is_hole(&self) -> bool {
        !self.is_shell()
    }

    /// The index of the enclosing chain, if any.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Indices of chains that are holes of this chain.
    #[must_use]
    pub fn holes(&self) -> &[usize] {
        &self.holes
    }
}

/// Classifies the chains of a polygon-dimension shape as shells or holes.
#[derive(Debug)]
pub struct ShapeNestingQuery<'a> {
    index: &'a ShapeIndex,
    options: ShapeNestingQueryOptions,
}

impl<'a> ShapeNestingQuery<'a> {
    /// Creates a query over the given index with default options.
    #[must_use]
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self {
            index,
            options: ShapeNestingQueryOptions::default(),
        }
    }

    /// Creates a query with explicit options.
    #[must_use]
    pub fn with_options(index: &'a ShapeIndex, options: ShapeNestingQueryOptions) -> Self {
        Self { index, options }
    }

    /// Computes the nesting relation of every chain in the shape.
    ///
    /// A chain is considered a child of another chain when the arc from a
    /// datum-chain vertex to a vertex of the chain crosses the candidate
    /// parent an odd number of times; a wedge orientation test at the
    /// datum vertex seeds the datum's own parity. When several candidate
    /// parents remain, the direct parent is the most deeply nested one
    /// (the candidate contained by all others). Finally, chains at even
    /// nesting depth are detached into shells so the result matches the
    /// flat shell+hole output model.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is missing or not polygon-dimension,
    /// if the datum chain is shorter than three edges, or if the computed
    /// relations are cyclic (malformed input).
    pub fn shape_nesting(&self, shape_id: ShapeId) -> Result<Vec<ChainRelation>> {
        let shape = self.index.shape(shape_id)?;
        if shape.dimension() != 2 {
            return Err(OperationError::Unsupported(
                "shape nesting is only defined for polygon shapes".to_owned(),
            )
            .into());
        }

        let num_chains = shape.num_chains();
        if num_chains == 0 {
            return Ok(Vec::new());
        }
        if num_chains == 1 {
            return Ok(vec![ChainRelation::default()]);
        }

        let datum = (self.options.datum_strategy)(shape);
        if shape.chain(datum).length < 3 {
            return Err(OperationError::InvalidInput(
                "datum chain must have at least three edges".to_owned(),
            )
            .into());
        }

        // Three consecutive datum vertices give the wedge at the start
        // vertex of the probe arcs.
        let v0 = shape.chain_edge(datum, 0).v0;
        let v1 = shape.chain_edge(datum, 1).v0;
        let v2 = shape.chain_edge(datum, 2).v0;
        let start = v1;

        // parent_of[c][o] == true means chain c lies inside chain o.
        let mut parent_of = vec![vec![false; num_chains]; num_chains];
        let query = CrossingEdgeQuery::new(self.index);

        for chain in 0..num_chains {
            if chain == datum {
                continue;
            }

            let mut target = shape.chain_edge(chain, 0).v0;
            if target.approx_eq(&start) {
                target = shape.chain_edge(chain, 1).v0;
            }

            // Does the probe arc leave the datum vertex into the datum
            // chain's interior?
            if ordered_ccw(&v2, &target, &v0, &v1) {
                parent_of[chain][datum] = true;
            }

            for edge_id in query.crossings_with_shape(&start, &target, shape, CrossingType::Interior)
            {
                let other = shape.chain_position(edge_id).chain;
                if other != chain {
                    parent_of[chain][other] = !parent_of[chain][other];
                }
            }
        }

        // Resolve direct parents: among all candidates, pick the one that
        // is itself contained by every other candidate.
        let mut relations = vec![ChainRelation::default(); num_chains];
        for chain in 0..num_chains {
            let candidates: Vec<usize> = (0..num_chains)
                .filter(|&o| o != chain && parent_of[chain][o])
                .collect();
            let Some(&first) = candidates.first() else {
                continue;
            };
            let mut best = first;
            for &o in &candidates[1..] {
                if parent_of[o][best] {
                    best = o;
                }
            }
            relations[chain].parent = Some(best);
            relations[best].holes.push(chain);
        }

        // Depth of every chain, with cycle detection.
        let mut depths = vec![0usize; num_chains];
        for chain in 0..num_chains {
            let mut depth = 0;
            let mut current = chain;
            while let Some(p) = relations[current].parent {
                depth += 1;
                current = p;
                if depth > num_chains {
                    return Err(TopologyError::InvalidTopology(
                        "cyclic chain nesting".to_owned(),
                    )
                    .into());
                }
            }
            depths[chain] = depth;
        }

        // Flatten: even-depth chains are shells in the output model, so
        // they are detached from their (hole) parents.
        for chain in 0..num_chains {
            if depths[chain] % 2 == 0 {
                if let Some(p) = relations[chain].parent.take() {
                    relations[p].holes.retain(|&h| h != chain);
                }
            }
        }

        Ok(relations)
    }
}
