pub mod error;
pub mod quadtree;

pub use common::shapes;
pub use error::{QuadtreeError, QuadtreeResult};

use common::shapes::NodeBounds;
use std::rc::Rc;

/// Callbacks for [`quadtree::QuadTree::traverse`], visited in pre-order.
pub trait QuadtreeVisitor<S: ?Sized> {
    fn branch(&mut self, level: usize, bounds: &NodeBounds);
    fn leaf(&mut self, level: usize, bounds: &NodeBounds, objects: &[Rc<S>]);
}
