use serde::{Deserialize, Serialize};

/// A 2-D cartesian coordinate. Equality is exact: every coordinate in the
/// model is a small multiple of the cell step, so no tolerance is needed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pointwise addition, used to step a cell along its growth direction.
    pub fn translate(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn is_axis_aligned(self) -> bool {
        self.x == 0.0 || self.y == 0.0
    }

    pub fn key(self) -> GridKey {
        GridKey::from(self)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Hashable exact form of a `Point` for the occupied-location and origin sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridKey(u64, u64);

impl From<Point> for GridKey {
    fn from(p: Point) -> Self {
        // adding 0.0 folds -0.0 into 0.0 so both hash alike
        GridKey((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
    }
}
