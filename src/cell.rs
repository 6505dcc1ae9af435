use ::rand as external_rand;
use external_rand::Rng;

use crate::config::{BRANCH_COST, ENERGY_DECREASE};
use crate::food::Food;
use crate::types::Point;

pub const CELL_COLOR: [f32; 4] = [1.0, 0.84, 0.0, 1.0]; // gold

/// How a cell grows new cells.
#[derive(Clone, Debug, PartialEq)]
pub enum Branching {
    /// Centre of a fruiting body, never branches.
    Root,
    /// Extends one step along its own direction, once.
    Straight,
    /// Splits into its diagonal and the two axis components of it. A
    /// candidate is dropped only once a child has been grown for it.
    Diagonal { candidates: Vec<Point> },
}

impl Branching {
    fn for_direction(direction: Point) -> Self {
        if direction.is_axis_aligned() {
            Branching::Straight
        } else {
            Branching::Diagonal {
                candidates: vec![
                    direction,
                    Point::new(0.0, direction.y),
                    Point::new(direction.x, 0.0),
                ],
            }
        }
    }

    fn quota(&self) -> u32 {
        match self {
            Branching::Root => 0,
            Branching::Straight => 1,
            Branching::Diagonal { candidates } => candidates.len() as u32,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub location: Point,
    pub direction: Point,
    pub total_energy: i64,
    // Ids in the owning colony's arena
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub found_food: bool,
    pub exploration: f64,
    pub max_children: u32,
    pub branching: Branching,
}

impl Cell {
    fn with_branching(
        location: Point,
        direction: Point,
        energy: i64,
        exploration: f64,
        branching: Branching,
    ) -> Self {
        Self {
            location,
            direction,
            total_energy: energy,
            children: Vec::new(),
            parent: None,
            found_food: false,
            exploration,
            max_children: branching.quota(),
            branching,
        }
    }

    pub fn root(location: Point, energy: i64, exploration: f64) -> Self {
        Self::with_branching(
            location,
            Point::new(0.0, 0.0),
            energy,
            exploration,
            Branching::Root,
        )
    }

    pub fn straight(location: Point, direction: Point, energy: i64, exploration: f64) -> Self {
        Self::with_branching(location, direction, energy, exploration, Branching::Straight)
    }

    #[cfg(test)]
    pub fn diagonal(location: Point, direction: Point, energy: i64, exploration: f64) -> Self {
        let branching = Branching::for_direction(direction);
        debug_assert!(matches!(branching, Branching::Diagonal { .. }));
        Self::with_branching(location, direction, energy, exploration, branching)
    }

    /// Straight along an axis, diagonal otherwise.
    pub fn growing_towards(
        location: Point,
        direction: Point,
        energy: i64,
        exploration: f64,
    ) -> Self {
        let branching = Branching::for_direction(direction);
        Self::with_branching(location, direction, energy, exploration, branching)
    }

    /// Age the cell by one tick. `any_child_found_food` carries the state of
    /// the direct children only, so success climbs one generation per tick.
    /// Returns false once energy drops below zero.
    pub fn update_on_tick(&mut self, any_child_found_food: bool) -> bool {
        if any_child_found_food {
            self.found_food = true;
        }

        if !self.found_food {
            self.total_energy -= ENERGY_DECREASE;
            if self.total_energy < 0 {
                return false;
            }
        }
        true
    }

    /// Marks the cell as fed if it sits exactly on a food source.
    pub fn has_found_food(&mut self, food: &[Food]) -> bool {
        if food.iter().any(|f| f.location == self.location) {
            self.found_food = true;
            return true;
        }
        false
    }

    /// Attempt to branch. Returned children are not yet linked to this cell;
    /// the owning colony assigns their ids and records the lineage.
    pub fn create_child<R: Rng>(&mut self, rng: &mut R) -> Vec<Cell> {
        let child_energy = self.total_energy - BRANCH_COST;
        let exploration = self.exploration;
        let location = self.location;
        let direction = self.direction;

        let new_children = match &mut self.branching {
            Branching::Root => Vec::new(),
            Branching::Straight => {
                if self.max_children > 0 && rng.gen::<f64>() < exploration {
                    vec![Cell::straight(
                        location.translate(direction),
                        direction,
                        child_energy,
                        exploration,
                    )]
                } else {
                    Vec::new()
                }
            }
            Branching::Diagonal { candidates } => {
                let mut grown = Vec::new();
                candidates.retain(|&dir| {
                    if rng.gen::<f64>() < exploration {
                        grown.push(Cell::growing_towards(
                            location.translate(dir),
                            dir,
                            child_energy,
                            exploration,
                        ));
                        false
                    } else {
                        true
                    }
                });
                grown
            }
        };

        self.max_children = self
            .max_children
            .saturating_sub(new_children.len() as u32);
        new_children
    }

    pub fn adopt(&mut self, child_id: usize) {
        self.children.push(child_id);
    }

    pub fn color(&self) -> [f32; 4] {
        CELL_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn straight_cell_grows_one_step_along_its_direction() {
        let mut cell = Cell::straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 100, 1.0);
        let children = cell.create_child(&mut rng());

        assert_eq!(children.len(), 1);
        let child = &children[0];
        assert_eq!(child.location, Point::new(10.0, 0.0));
        assert_eq!(child.direction, Point::new(10.0, 0.0));
        assert_eq!(child.total_energy, 90);
        assert_eq!(child.branching, Branching::Straight);
        assert_eq!(cell.max_children, 0);
    }

    #[test]
    fn straight_cell_never_exceeds_one_child() {
        let mut cell = Cell::straight(Point::new(0.0, 0.0), Point::new(0.0, 4.0), 100, 0.5);
        let mut rng = rng();
        let mut total = 0;
        for _ in 0..50 {
            total += cell.create_child(&mut rng).len();
        }
        assert_eq!(total, 1);
        assert_eq!(cell.max_children, 0);
    }

    #[test]
    fn diagonal_cell_splits_three_ways() {
        let mut cell = Cell::diagonal(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 100, 1.0);
        let children = cell.create_child(&mut rng());

        let summary: Vec<_> = children
            .iter()
            .map(|c| (c.location, c.total_energy, c.branching.clone()))
            .collect();
        assert_eq!(summary.len(), 3);
        assert!(matches!(summary[0].2, Branching::Diagonal { .. }));
        assert_eq!(summary[0].0, Point::new(10.0, 10.0));
        assert_eq!(summary[1], (Point::new(0.0, 10.0), 90, Branching::Straight));
        assert_eq!(summary[2], (Point::new(10.0, 0.0), 90, Branching::Straight));
        assert_eq!(summary[0].1, 90);

        assert_eq!(cell.branching, Branching::Diagonal { candidates: vec![] });
        assert_eq!(cell.max_children, 0);
    }

    #[test]
    fn diagonal_cell_never_repeats_a_direction() {
        let mut cell = Cell::diagonal(Point::new(0.0, 0.0), Point::new(-4.0, 4.0), 1000, 0.3);
        let mut rng = rng();
        let mut directions = Vec::new();
        for _ in 0..200 {
            for child in cell.create_child(&mut rng) {
                assert!(!directions.contains(&child.direction));
                directions.push(child.direction);
            }
        }
        assert_eq!(directions.len(), 3);
        assert_eq!(cell.max_children, 0);
    }

    #[test]
    fn zero_exploration_never_branches() {
        let mut rng = rng();
        let mut straight = Cell::straight(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 100, 0.0);
        let mut diagonal = Cell::diagonal(Point::new(0.0, 0.0), Point::new(4.0, 4.0), 100, 0.0);
        for _ in 0..100 {
            assert!(straight.create_child(&mut rng).is_empty());
            assert!(diagonal.create_child(&mut rng).is_empty());
        }
        assert_eq!(straight.max_children, 1);
        assert_eq!(diagonal.max_children, 3);
    }

    #[test]
    fn root_has_no_quota() {
        let mut root = Cell::root(Point::new(0.0, 0.0), 100, 1.0);
        assert_eq!(root.max_children, 0);
        assert!(root.create_child(&mut rng()).is_empty());
    }

    #[test]
    fn energy_decays_until_death() {
        let mut cell = Cell::straight(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 30, 0.0);
        assert!(cell.update_on_tick(false)); // 18
        assert!(cell.update_on_tick(false)); // 6
        assert!(!cell.update_on_tick(false)); // -6
        assert_eq!(cell.total_energy, -6);
    }

    #[test]
    fn fed_cell_stops_decaying() {
        let food = vec![Food::new(Point::new(4.0, 0.0), 500)];
        let mut cell = Cell::straight(Point::new(4.0, 0.0), Point::new(4.0, 0.0), 5, 0.0);
        assert!(cell.has_found_food(&food));
        for _ in 0..10 {
            assert!(cell.update_on_tick(false));
            assert_eq!(cell.total_energy, 5);
        }
    }

    #[test]
    fn child_success_propagates_and_sticks() {
        let mut cell = Cell::root(Point::new(0.0, 0.0), 50, 0.0);
        assert!(cell.update_on_tick(true));
        assert!(cell.found_food);
        assert_eq!(cell.total_energy, 50);
        assert!(cell.update_on_tick(false));
        assert_eq!(cell.total_energy, 50);
    }

    #[test]
    fn food_check_needs_an_exact_match() {
        let food = vec![Food::new(Point::new(8.0, 8.0), 20)];
        let mut cell = Cell::straight(Point::new(8.0, 4.0), Point::new(0.0, 4.0), 50, 0.0);
        assert!(!cell.has_found_food(&food));
        assert!(!cell.found_food);
    }
}
