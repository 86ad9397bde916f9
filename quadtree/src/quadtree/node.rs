use super::config::Config;
use super::types::{object_key, validate_bounds, ObjectKey};
use crate::error::QuadtreeResult;
use crate::QuadtreeVisitor;
use common::shapes::{Indexable, NodeBounds};
use smallvec::{smallvec, SmallVec};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug)]
pub(crate) struct QuadNode<S: ?Sized> {
    pub(crate) bounds: NodeBounds,
    pub(crate) level: usize,
    pub(crate) config: Config,
    pub(crate) objects: Vec<Rc<S>>,
    /// Split nodes own exactly four children, indexed by `Quadrant::index`.
    pub(crate) children: Option<Box<[QuadNode<S>; 4]>>,
}

impl<S: Indexable + ?Sized> QuadNode<S> {
    pub(crate) fn new(bounds: NodeBounds, level: usize, config: Config) -> Self {
        Self {
            bounds,
            level,
            config,
            objects: Vec::new(),
            children: None,
        }
    }

    #[inline(always)]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// All-or-nothing: on error the subtree holds exactly the handles it held
    /// before the call. Nodes split along the way may stay split.
    pub(crate) fn insert(&mut self, object: Rc<S>) -> QuadtreeResult<()> {
        if let Some(children) = self.children.as_mut() {
            let quadrants = object.quadrant_indexes(&self.bounds);
            for (done, quadrant) in quadrants.iter().enumerate() {
                if let Err(err) = children[quadrant.index()].insert(Rc::clone(&object)) {
                    let key = object_key(&object);
                    for inserted in &quadrants[..done] {
                        children[inserted.index()].forget_last(key);
                    }
                    return Err(err);
                }
            }
            return Ok(());
        }

        self.objects.push(object);
        if self.objects.len() > self.config.max_objects && self.level < self.config.max_levels {
            if let Err(err) = self.split() {
                self.objects.pop();
                debug!(level = self.level, %err, "split failed, insert undone");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Redistributes into detached children and attaches them only once every
    /// object has landed, so a failed split leaves this leaf untouched.
    fn split(&mut self) -> QuadtreeResult<()> {
        let child_bounds = self.bounds.quadrants();
        for bounds in &child_bounds {
            validate_bounds(bounds)?;
        }

        let level = self.level + 1;
        let config = self.config;
        let mut children = Box::new(child_bounds.map(|bounds| QuadNode::new(bounds, level, config)));
        for object in &self.objects {
            for quadrant in object.quadrant_indexes(&self.bounds) {
                children[quadrant.index()].insert(Rc::clone(object))?;
            }
        }

        debug!(
            level = self.level,
            objects = self.objects.len(),
            "split quadtree node"
        );
        self.objects.clear();
        self.children = Some(children);
        Ok(())
    }

    // Drops the newest handle for `key` from every leaf holding one. Inserts
    // append, so that is the copy a failed insert left behind.
    fn forget_last(&mut self, key: ObjectKey) {
        match self.children.as_deref_mut() {
            None => {
                if let Some(position) = self
                    .objects
                    .iter()
                    .rposition(|object| object_key(object) == key)
                {
                    self.objects.remove(position);
                }
            }
            Some(children) => {
                for child in children {
                    child.forget_last(key);
                }
            }
        }
    }

    /// Calls `f` for every object in the leaves `query` reaches, in quadrant
    /// order. An object stored in several reached leaves is reported once per
    /// leaf.
    pub(crate) fn for_each_candidate<Q, F>(&self, query: &Q, mut f: F)
    where
        Q: Indexable + ?Sized,
        F: FnMut(&Rc<S>),
    {
        let mut stack: SmallVec<[&QuadNode<S>; 32]> = smallvec![self];
        while let Some(node) = stack.pop() {
            match node.children.as_deref() {
                None => node.objects.iter().for_each(&mut f),
                Some(children) => {
                    // Reversed so the children pop in quadrant order.
                    for quadrant in query.quadrant_indexes(&node.bounds).into_iter().rev() {
                        stack.push(&children[quadrant.index()]);
                    }
                }
            }
        }
    }

    /// Calls `f` for every handle in every leaf, duplicates included.
    pub(crate) fn for_each_object<F>(&self, mut f: F)
    where
        F: FnMut(&Rc<S>),
    {
        let mut stack: SmallVec<[&QuadNode<S>; 32]> = smallvec![self];
        while let Some(node) = stack.pop() {
            match node.children.as_deref() {
                None => node.objects.iter().for_each(&mut f),
                Some(children) => stack.extend(children.iter().rev()),
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.objects.clear();
        self.children = None;
    }

    pub(crate) fn visit<V>(&self, visitor: &mut V)
    where
        V: QuadtreeVisitor<S>,
    {
        match self.children.as_deref() {
            None => visitor.leaf(self.level, &self.bounds, &self.objects),
            Some(children) => {
                visitor.branch(self.level, &self.bounds);
                for child in children {
                    child.visit(visitor);
                }
            }
        }
    }
}
