use rand::Rng;
use smallvec::SmallVec;
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four equal children a node splits into.
///
/// North is the half with the greater y, east the half with the greater x.
/// The discriminant is the child's position in a split node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Quadrants reported by [`Indexable::quadrant_indexes`], in `ALL` order.
pub type Quadrants = SmallVec<[Quadrant; 4]>;

/// The geometry capability every storable shape provides.
///
/// Implementations must report every child quadrant of `bounds` that the
/// shape's area overlaps, not only the one holding its center, and must
/// return an empty set when the shape does not reach `bounds` at all.
pub trait Indexable: Debug {
    fn quadrant_indexes(&self, bounds: &NodeBounds) -> Quadrants;
}

/// Axis-aligned extent owned by one tree node. `(x, y)` is the min corner.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds anchored at the origin.
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Finite origin and strictly positive, finite extent.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Bounds of the child that `quadrant` names after a split.
    pub fn quadrant(&self, quadrant: Quadrant) -> NodeBounds {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        let (x, y) = match quadrant {
            Quadrant::NorthEast => (self.x + half_width, self.y + half_height),
            Quadrant::NorthWest => (self.x, self.y + half_height),
            Quadrant::SouthWest => (self.x, self.y),
            Quadrant::SouthEast => (self.x + half_width, self.y),
        };
        NodeBounds::new(x, y, half_width, half_height)
    }

    pub fn quadrants(&self) -> [NodeBounds; 4] {
        Quadrant::ALL.map(|quadrant| self.quadrant(quadrant))
    }

    /// Random point at least `margin_x`/`margin_y` away from the edges.
    /// Collapses to the min corner side when the margins do not fit.
    pub fn random_point_inside<R: Rng>(
        &self,
        margin_x: f32,
        margin_y: f32,
        rng: &mut R,
    ) -> (f32, f32) {
        (
            safe_randf32(rng, self.x + margin_x, self.right() - margin_x),
            safe_randf32(rng, self.y + margin_y, self.top() - margin_y),
        )
    }
}

fn safe_randf32<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Axis-aligned rectangle with its min corner at `(x, y)` and an optional
/// caller payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect<T = ()> {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub data: Option<T>,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            data: None,
        }
    }
}

impl<T> Rect<T> {
    pub fn with_data(x: f32, y: f32, width: f32, height: f32, data: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
            data: Some(data),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Open-interval overlap: rects that only share an edge do not overlap.
    pub fn overlaps<U>(&self, other: &Rect<U>) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.top()
            && self.top() > other.y
    }

    // Closed test so edge-touching rects are still indexed.
    fn touches(&self, bounds: &NodeBounds) -> bool {
        self.width >= 0.0
            && self.height >= 0.0
            && self.x <= bounds.right()
            && self.right() >= bounds.x
            && self.y <= bounds.top()
            && self.top() >= bounds.y
    }
}

impl<T: Debug> Indexable for Rect<T> {
    fn quadrant_indexes(&self, bounds: &NodeBounds) -> Quadrants {
        let mut indexes = Quadrants::new();
        if !self.touches(bounds) {
            return indexes;
        }

        let (cx, cy) = bounds.center();
        let lx = self.x < cx;
        let ly = self.y < cy;
        // A zero-width (zero-height) rect on a center line falls east (north).
        let gx = self.right() > cx || self.x >= cx;
        let gy = self.top() > cy || self.y >= cy;

        if gx && gy {
            indexes.push(Quadrant::NorthEast);
        }
        if lx && gy {
            indexes.push(Quadrant::NorthWest);
        }
        if lx && ly {
            indexes.push(Quadrant::SouthWest);
        }
        if gx && ly {
            indexes.push(Quadrant::SouthEast);
        }
        indexes
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Circle<T = ()> {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub data: Option<T>,
}

impl Circle {
    pub fn new(x: f32, y: f32, r: f32) -> Self {
        Self {
            x,
            y,
            r,
            data: None,
        }
    }
}

impl<T> Circle<T> {
    pub fn with_data(x: f32, y: f32, r: f32, data: T) -> Self {
        Self {
            x,
            y,
            r,
            data: Some(data),
        }
    }

    /// Clamp test against `[min_x, max_x] x [min_y, max_y]`. Tangency is not
    /// an intersection.
    pub fn intersects_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> bool {
        let dx = self.x - self.x.min(max_x).max(min_x);
        let dy = self.y - self.y.min(max_y).max(min_y);
        dx * dx + dy * dy < self.r * self.r
    }

    pub fn intersects_bounds(&self, bounds: &NodeBounds) -> bool {
        self.intersects_rect(bounds.x, bounds.y, bounds.right(), bounds.top())
    }
}

impl<T: Debug> Indexable for Circle<T> {
    fn quadrant_indexes(&self, bounds: &NodeBounds) -> Quadrants {
        Quadrant::ALL
            .into_iter()
            .filter(|&quadrant| self.intersects_bounds(&bounds.quadrant(quadrant)))
            .collect()
    }
}
