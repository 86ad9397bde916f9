mod config;
mod node;
mod types;

pub use config::Config;

use crate::error::{QuadtreeError, QuadtreeResult};
use crate::QuadtreeVisitor;
use common::shapes::{Indexable, NodeBounds};
use fxhash::FxHashSet;
use node::QuadNode;
use std::rc::Rc;
use tracing::{debug, trace};
use types::{object_key, query_key, validate_bounds};

/// Region quadtree over shared shape handles.
///
/// The tree stores `Rc<S>` clones and never touches the shapes themselves.
/// Identity is the handle's address, so two equal shapes stay distinct.
/// Positions are picked up only by [`QuadTree::rebuild`] (or `clear` followed
/// by fresh inserts); there is no per-shape move or delete.
#[derive(Debug)]
pub struct QuadTree<S: ?Sized> {
    root: QuadNode<S>,
}

impl<S: Indexable + ?Sized> QuadTree<S> {
    pub fn new(bounds: NodeBounds) -> QuadtreeResult<Self> {
        Self::new_with_config(bounds, Config::default())
    }

    pub fn new_with_config(bounds: NodeBounds, config: Config) -> QuadtreeResult<Self> {
        validate_bounds(&bounds)?;
        Ok(Self {
            root: QuadNode::new(bounds, 0, config),
        })
    }

    pub fn bounds(&self) -> NodeBounds {
        self.root.bounds
    }

    pub fn config(&self) -> Config {
        self.root.config
    }

    /// Stores `object` in every leaf its area reaches, splitting full leaves.
    ///
    /// Shapes that do not overlap the root bounds are rejected with
    /// [`QuadtreeError::OutOfBounds`] and nothing is stored. A split that would
    /// produce degenerate child bounds fails with
    /// [`QuadtreeError::InvalidBounds`]. A failed insert stores nothing and
    /// leaves every earlier shape in place, though nodes split on the way
    /// down may stay split.
    pub fn insert(&mut self, object: Rc<S>) -> QuadtreeResult<()> {
        if object.quadrant_indexes(&self.root.bounds).is_empty() {
            debug!(?object, "rejecting shape outside quadtree bounds");
            return Err(QuadtreeError::OutOfBounds {
                bounds: self.root.bounds,
            });
        }
        self.root.insert(object)
    }

    /// Clears the tree and inserts every object, stopping at the first error.
    pub fn rebuild<I>(&mut self, objects: I) -> QuadtreeResult<()>
    where
        I: IntoIterator<Item = Rc<S>>,
    {
        self.clear();
        for object in objects {
            self.insert(object)?;
        }
        Ok(())
    }

    /// Broad-phase candidates for `query`: every stored shape sharing a leaf
    /// with it, each once, never `query` itself. Order is unspecified.
    pub fn retrieve<Q: Indexable + ?Sized>(&self, query: &Q) -> Vec<Rc<S>> {
        let mut candidates = Vec::new();
        self.retrieve_into(query, &mut candidates);
        candidates
    }

    /// Appends the candidates for `query` to `candidates`.
    pub fn retrieve_into<Q: Indexable + ?Sized>(&self, query: &Q, candidates: &mut Vec<Rc<S>>) {
        self.retrieve_with(query, |object| candidates.push(Rc::clone(object)));
    }

    pub fn retrieve_with<Q, F>(&self, query: &Q, mut f: F)
    where
        Q: Indexable + ?Sized,
        F: FnMut(&Rc<S>),
    {
        let excluded = query_key(query);
        let mut seen = FxHashSet::default();
        self.root.for_each_candidate(query, |object| {
            let key = object_key(object);
            if key != excluded && seen.insert(key) {
                f(object);
            }
        });
    }

    /// Drops every handle and all children, leaving one empty leaf.
    pub fn clear(&mut self) {
        trace!(split = !self.root.is_leaf(), "clearing quadtree");
        self.root.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_leaf() && self.root.objects.is_empty()
    }

    /// Number of distinct stored shapes.
    pub fn len(&self) -> usize {
        let mut seen = FxHashSet::default();
        self.root.for_each_object(|object| {
            seen.insert(object_key(object));
        });
        seen.len()
    }

    /// Level of the deepest node; 0 while the root is unsplit.
    pub fn depth(&self) -> usize {
        let mut stats = NodeStats::default();
        self.traverse(&mut stats);
        stats.depth
    }

    pub fn node_count(&self) -> usize {
        let mut stats = NodeStats::default();
        self.traverse(&mut stats);
        stats.nodes
    }

    pub fn traverse<V: QuadtreeVisitor<S>>(&self, visitor: &mut V) {
        self.root.visit(visitor);
    }

    // Pre-order, the root first.
    pub fn all_node_bounds(&self, bounds: &mut Vec<NodeBounds>) {
        let mut collector = BoundsCollector { bounds };
        self.traverse(&mut collector);
    }

    /// Every distinct stored shape, in first-seen order.
    pub fn all_objects(&self, objects: &mut Vec<Rc<S>>) {
        let mut seen = FxHashSet::default();
        self.root.for_each_object(|object| {
            if seen.insert(object_key(object)) {
                objects.push(Rc::clone(object));
            }
        });
    }
}

struct BoundsCollector<'a> {
    bounds: &'a mut Vec<NodeBounds>,
}

impl<S: ?Sized> QuadtreeVisitor<S> for BoundsCollector<'_> {
    fn branch(&mut self, _level: usize, bounds: &NodeBounds) {
        self.bounds.push(*bounds);
    }

    fn leaf(&mut self, _level: usize, bounds: &NodeBounds, _objects: &[Rc<S>]) {
        self.bounds.push(*bounds);
    }
}

#[derive(Default)]
struct NodeStats {
    nodes: usize,
    depth: usize,
}

impl NodeStats {
    fn record(&mut self, level: usize) {
        self.nodes += 1;
        self.depth = self.depth.max(level);
    }
}

impl<S: ?Sized> QuadtreeVisitor<S> for NodeStats {
    fn branch(&mut self, level: usize, _bounds: &NodeBounds) {
        self.record(level);
    }

    fn leaf(&mut self, level: usize, _bounds: &NodeBounds, _objects: &[Rc<S>]) {
        self.record(level);
    }
}
