use serde::Serialize;

use crate::types::Point;

/// A stationary energy source. Reaching it is detection only; its energy is
/// never drawn down.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Food {
    pub location: Point,
    pub energy: i64,
}

impl Food {
    pub fn new(location: Point, energy: i64) -> Self {
        Self { location, energy }
    }
}

pub const FOOD_COLOR: [f32; 4] = [0.0, 0.5, 0.0, 1.0];

// Direct scan; food lists are short and fixed for the run. When two entries
// share a location the later one wins.
pub fn food_energy_at(food: &[Food], location: Point) -> Option<i64> {
    food.iter()
        .rev()
        .find(|f| f.location == location)
        .map(|f| f.energy)
}
