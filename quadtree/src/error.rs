use common::shapes::NodeBounds;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuadtreeError {
    #[error(
        "node bounds must be finite with positive width and height (x: {x}, y: {y}, width: {width}, height: {height})"
    )]
    InvalidBounds {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    #[error(
        "shape does not overlap the quadtree bounds (bounds_x: {}, bounds_y: {}, bounds_width: {}, bounds_height: {})",
        .bounds.x,
        .bounds.y,
        .bounds.width,
        .bounds.height
    )]
    OutOfBounds { bounds: NodeBounds },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;
