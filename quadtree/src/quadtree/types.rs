use crate::error::{QuadtreeError, QuadtreeResult};
use common::shapes::NodeBounds;
use std::rc::Rc;

/// Address of a shape, used for identity comparisons. Never dereferenced.
pub(crate) type ObjectKey = *const ();

#[inline(always)]
pub(crate) fn object_key<S: ?Sized>(object: &Rc<S>) -> ObjectKey {
    Rc::as_ptr(object).cast::<()>()
}

#[inline(always)]
pub(crate) fn query_key<Q: ?Sized>(query: &Q) -> ObjectKey {
    (query as *const Q).cast::<()>()
}

pub(crate) fn validate_bounds(bounds: &NodeBounds) -> QuadtreeResult<()> {
    if !bounds.is_valid() {
        return Err(QuadtreeError::InvalidBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }
    Ok(())
}
