use ::rand as external_rand;
use external_rand::Rng;
use std::collections::HashSet;

use crate::cell::Cell;
use crate::config::CELL_RADIUS;
use crate::food::Food;
use crate::types::{GridKey, Point};

// Fruiting body layout around the origin, in half-radius steps. The centre
// comes first so it is always the colony's seed cell.
const SEED_OFFSETS: [(f64, f64); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (0.0, 1.0),
    (1.0, 1.0),
    (-1.0, 0.0),
    (0.0, -1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
];

/// A growth structure spreading from one origin.
///
/// Every cell ever grown lives in `cells` and is addressed by index; the
/// population, the leading edge and lineage links all hold indices into it.
/// The fruiting body occupies indices `0..SEED_OFFSETS.len()`.
pub struct Colony {
    origin: Point,
    cells: Vec<Cell>,
    population: Vec<usize>,
    leading_edge: Vec<usize>,
    occupied: HashSet<GridKey>,
}

impl Colony {
    pub fn new(origin: Point, initial_energy: i64, exploration: f64) -> Self {
        let step = CELL_RADIUS / 2.0;
        let mut cells = Vec::with_capacity(SEED_OFFSETS.len());

        for &(dx, dy) in &SEED_OFFSETS {
            let direction = Point::new(dx * step, dy * step);
            let location = origin.translate(direction);
            let cell = if dx == 0.0 && dy == 0.0 {
                Cell::root(location, initial_energy, exploration)
            } else {
                Cell::growing_towards(location, direction, initial_energy, exploration)
            };
            cells.push(cell);
        }

        let population: Vec<usize> = (0..cells.len()).collect();
        let occupied = cells.iter().map(|c| c.location.key()).collect();

        Self {
            origin,
            leading_edge: population.clone(),
            population,
            cells,
            occupied,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The centre of the fruiting body; new colonies inherit from it.
    pub fn seed(&self) -> &Cell {
        &self.cells[0]
    }

    pub fn is_seed(&self, id: usize) -> bool {
        id < SEED_OFFSETS.len()
    }

    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Live cells in creation order.
    pub fn population(&self) -> impl Iterator<Item = &Cell> {
        self.population.iter().map(move |&id| &self.cells[id])
    }

    pub fn population_ids(&self) -> &[usize] {
        &self.population
    }

    pub fn leading_edge(&self) -> &[usize] {
        &self.leading_edge
    }

    pub fn population_len(&self) -> usize {
        self.population.len()
    }

    pub fn occupied_len(&self) -> usize {
        self.occupied.len()
    }

    #[cfg(test)]
    pub fn is_occupied(&self, location: Point) -> bool {
        self.occupied.contains(&location.key())
    }

    pub fn total_energy(&self) -> i64 {
        self.population().map(|c| c.total_energy).sum()
    }

    /// Advance every cell one tick and grow the leading edge.
    ///
    /// Returns the location of a leading-edge cell that reached food this
    /// tick. When several do, only the last one in edge order is reported.
    pub fn update_on_tick<R: Rng>(&mut self, food: &[Food], rng: &mut R) -> Option<Point> {
        let mut dead = HashSet::new();
        for &id in &self.population {
            let any_child_found_food = self.cells[id]
                .children
                .iter()
                .any(|&child| self.cells[child].found_food);
            let alive = self.cells[id].update_on_tick(any_child_found_food);
            if !alive && !self.is_seed(id) {
                dead.insert(id);
            }
        }
        if !dead.is_empty() {
            self.population.retain(|id| !dead.contains(id));
            self.leading_edge.retain(|id| !dead.contains(id));
        }

        let mut next_edge = Vec::new();
        let mut food_found = None;
        for id in std::mem::take(&mut self.leading_edge) {
            if self.cells[id].has_found_food(food) {
                food_found = Some(self.cells[id].location);
                continue;
            }

            for mut child in self.cells[id].create_child(rng) {
                let child_id = self.cells.len();
                child.parent = Some(id);
                self.cells[id].adopt(child_id);

                // A child landing on an occupied spot is kept out of the
                // population and the edge.
                let fresh = self.occupied.insert(child.location.key());
                self.cells.push(child);
                if fresh {
                    self.population.push(child_id);
                    next_edge.push(child_id);
                }
            }

            if self.cells[id].max_children > 0 {
                next_edge.push(id);
            }
        }
        self.leading_edge = next_edge;

        food_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Branching;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn fruiting_body_layout() {
        let colony = Colony::new(Point::new(80.0, -80.0), 2100, 0.09);
        assert_eq!(colony.population_len(), 9);
        assert_eq!(colony.leading_edge().len(), 9);
        assert_eq!(colony.occupied_len(), 9);

        let seed = colony.seed();
        assert_eq!(seed.location, Point::new(80.0, -80.0));
        assert_eq!(seed.branching, Branching::Root);
        assert_eq!(seed.max_children, 0);

        let east = colony.cell(1).unwrap();
        assert_eq!(east.location, Point::new(84.0, -80.0));
        assert_eq!(east.branching, Branching::Straight);

        let north_east = colony.cell(3).unwrap();
        assert_eq!(north_east.location, Point::new(84.0, -76.0));
        assert_eq!(north_east.direction, Point::new(4.0, 4.0));
        assert_eq!(north_east.max_children, 3);
        assert!(matches!(north_east.branching, Branching::Diagonal { .. }));
    }

    #[test]
    fn no_exploration_keeps_the_fruiting_body_only() {
        let mut colony = Colony::new(Point::new(0.0, 0.0), 50, 0.0);
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(colony.update_on_tick(&[], &mut rng), None);
            assert_eq!(colony.population_len(), 9);
        }
        // seeds ran out of energy long ago but stay put
        assert!(colony.population().all(|c| c.total_energy < 0));
    }

    #[test]
    fn full_exploration_grows_and_children_starve() {
        let mut colony = Colony::new(Point::new(0.0, 0.0), 25, 1.0);
        let mut rng = rng();

        colony.update_on_tick(&[], &mut rng);
        // four straight extensions plus three per diagonal seed
        assert_eq!(colony.population_len(), 9 + 4 + 12);
        assert_eq!(colony.leading_edge().len(), 16);
        assert!(colony.population().skip(9).all(|c| c.total_energy == 3));

        colony.update_on_tick(&[], &mut rng);
        assert_eq!(colony.population_len(), 9);
        assert!(colony.leading_edge().is_empty());
        assert!(colony.population().all(|c| c.total_energy == 1));
    }

    #[test]
    fn lineage_is_recorded() {
        let mut colony = Colony::new(Point::new(0.0, 0.0), 500, 1.0);
        colony.update_on_tick(&[], &mut rng());

        let east = colony.cell(1).unwrap();
        assert_eq!(east.children.len(), 1);
        let child = colony.cell(east.children[0]).unwrap();
        assert_eq!(child.parent, Some(1));
        assert_eq!(child.location, Point::new(8.0, 0.0));
    }

    #[test]
    fn occupied_locations_are_never_reused() {
        let mut colony = Colony::new(Point::new(0.0, 0.0), 400, 0.6);
        let mut rng = rng();
        for _ in 0..30 {
            colony.update_on_tick(&[], &mut rng);
            let locations: HashSet<GridKey> =
                colony.population().map(|c| c.location.key()).collect();
            assert_eq!(locations.len(), colony.population_len());
            assert!(colony.population().all(|c| colony.is_occupied(c.location)));
            for &id in colony.leading_edge() {
                assert!(colony.population_ids().contains(&id));
            }
        }
    }

    // Put an extra growing cell on the leading edge
    fn graft(colony: &mut Colony, cell: Cell) -> usize {
        let id = colony.cells.len();
        colony.occupied.insert(cell.location.key());
        colony.cells.push(cell);
        colony.population.push(id);
        colony.leading_edge.push(id);
        id
    }

    #[test]
    fn child_on_an_occupied_spot_is_discarded() {
        let mut colony = Colony::new(Point::new(0.0, 0.0), 500, 1.0);
        // grows west into (8, 0), where the east seed extends first
        let grafted = graft(
            &mut colony,
            Cell::straight(Point::new(12.0, 0.0), Point::new(-4.0, 0.0), 500, 1.0),
        );
        assert_eq!(colony.population_len(), 10);

        colony.update_on_tick(&[], &mut rng());

        // sixteen seed children, the grafted cell's child is dropped
        assert_eq!(colony.population_len(), 10 + 16);
        assert_eq!(colony.occupied_len(), 10 + 16);

        let east_child = colony.cell(1).unwrap().children[0];
        let discarded = colony.cell(grafted).unwrap().children[0];
        assert_ne!(east_child, discarded);
        assert_eq!(
            colony.cell(discarded).unwrap().location,
            colony.cell(east_child).unwrap().location
        );
        assert_eq!(colony.cell(discarded).unwrap().parent, Some(grafted));
        assert!(colony.population_ids().contains(&east_child));
        assert!(!colony.population_ids().contains(&discarded));
        assert!(!colony.leading_edge().contains(&discarded));
        // spent its quota, so it leaves the edge too
        assert!(!colony.leading_edge().contains(&grafted));
    }

    #[test]
    fn reaching_food_is_reported_once_the_tip_sits_on_it() {
        let food = vec![Food::new(Point::new(8.0, 0.0), 300)];
        let mut colony = Colony::new(Point::new(0.0, 0.0), 500, 1.0);
        let mut rng = rng();

        assert_eq!(colony.update_on_tick(&food, &mut rng), None);
        assert_eq!(
            colony.update_on_tick(&food, &mut rng),
            Some(Point::new(8.0, 0.0))
        );

        let tip_id = colony.cell(1).unwrap().children[0];
        assert!(colony.cell(tip_id).unwrap().found_food);
        assert!(!colony.leading_edge().contains(&tip_id));

        // success climbs to the parent on the following tick and freezes it
        let before = colony.cell(1).unwrap().total_energy;
        colony.update_on_tick(&food, &mut rng);
        let parent = colony.cell(1).unwrap();
        assert!(parent.found_food);
        assert_eq!(parent.total_energy, before);
    }

    #[test]
    fn only_the_last_tip_on_food_is_reported() {
        let food = vec![
            Food::new(Point::new(8.0, 0.0), 300),
            Food::new(Point::new(-8.0, 0.0), 300),
        ];
        let mut colony = Colony::new(Point::new(0.0, 0.0), 500, 1.0);
        let mut rng = rng();
        colony.update_on_tick(&food, &mut rng);
        assert_eq!(
            colony.update_on_tick(&food, &mut rng),
            Some(Point::new(-8.0, 0.0))
        );
    }
}
