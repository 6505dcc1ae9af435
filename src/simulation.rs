use ::rand as external_rand;
use external_rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

use crate::colony::Colony;
use crate::config::{SimulationConfig, EXPLORATION_ENERGY_SCALE};
use crate::food::{food_energy_at, Food};
use crate::types::{GridKey, Point};

// Simulation state - everything a tick mutates
pub struct SimulationState {
    pub colonies: Vec<Colony>,
    // Origins in discovery order, plus a set for the duplicate check
    pub origins: Vec<Point>,
    origin_keys: HashSet<GridKey>,
    pub food: Vec<Food>,
    pub time: u64,
}

impl SimulationState {
    pub fn new(config: &SimulationConfig) -> Self {
        let start = config.starting_point();
        Self {
            colonies: vec![Colony::new(
                start,
                config.starting_energy,
                config.exploration,
            )],
            origins: vec![start],
            origin_keys: HashSet::from([start.key()]),
            food: config.food_items(),
            time: 0,
        }
    }

    pub fn is_origin(&self, location: Point) -> bool {
        self.origin_keys.contains(&location.key())
    }

    pub fn colonized_food(&self) -> usize {
        self.food
            .iter()
            .filter(|f| self.is_origin(f.location))
            .count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationStats {
    pub tick: u64,
    pub colony_count: usize,
    pub cell_count: usize,
    pub frontier_count: usize,
    pub total_energy: i64,
    pub food_count: usize,
    pub colonized_food: usize,
}

// Simulation - contains state, config, and control flags
pub struct Simulation {
    pub state: SimulationState,
    pub config: SimulationConfig,
    pub paused: bool,
    pub speed_multiplier: f32,
    pub speed_accumulator: f32,
}

// Implement Deref for convenience - allows sim.colonies instead of sim.state.colonies
impl std::ops::Deref for Simulation {
    type Target = SimulationState;
    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl std::ops::DerefMut for Simulation {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

// A new colony averages its parent's seed energy with the food it was
// founded on, rounding down.
fn next_energy(seed_energy: i64, food_energy: i64) -> i64 {
    (seed_energy + food_energy).div_euclid(2)
}

// Richer food makes a more exploratory colony
fn next_exploration(seed_exploration: f64, food_energy: i64) -> f64 {
    seed_exploration + food_energy as f64 / EXPLORATION_ENERGY_SCALE
}

impl Simulation {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            state: SimulationState::new(&config),
            config,
            paused: false,
            speed_multiplier: 1.0,
            speed_accumulator: 0.0,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
    pub fn increase_speed(&mut self) {
        self.speed_multiplier = (self.speed_multiplier * 1.5).min(10.0);
    }
    pub fn decrease_speed(&mut self) {
        self.speed_multiplier = (self.speed_multiplier / 1.5).max(0.1);
    }
    pub fn reset_speed(&mut self) {
        self.speed_multiplier = 1.0;
    }

    /// Start over from the configured seed colony.
    pub fn reset(&mut self) {
        self.state = SimulationState::new(&self.config);
        tracing::info!("simulation reset");
    }

    /// Advance the world by one step.
    ///
    /// Colonies founded during this tick are appended after every existing
    /// colony has been updated, so they first grow on the next tick.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) {
        let state = &mut self.state;
        state.time += 1;

        let mut new_colonies = Vec::new();
        for colony in &mut state.colonies {
            let Some(location) = colony.update_on_tick(&state.food, rng) else {
                continue;
            };
            if state.origin_keys.contains(&location.key()) {
                continue;
            }

            let Some(food_energy) = food_energy_at(&state.food, location) else {
                unreachable!(
                    "colony reported food at ({}, {}) where there is none",
                    location.x, location.y
                );
            };
            let seed = colony.seed();
            let energy = next_energy(seed.total_energy, food_energy);
            let exploration = next_exploration(seed.exploration, food_energy);

            tracing::info!(
                tick = state.time,
                x = location.x,
                y = location.y,
                energy,
                exploration,
                "new colony founded"
            );

            new_colonies.push(Colony::new(location, energy, exploration));
            state.origins.push(location);
            state.origin_keys.insert(location.key());
        }
        state.colonies.extend(new_colonies);

        tracing::trace!(
            tick = state.time,
            colonies = state.colonies.len(),
            "tick complete"
        );
    }

    /// Run the ticks owed for one driver frame; returns how many ran.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> usize {
        if self.paused || self.is_complete() {
            return 0;
        }

        // Handle speed multiplier with accumulator for fractional speeds
        self.speed_accumulator += self.speed_multiplier;
        let steps = self.speed_accumulator.floor() as usize;
        self.speed_accumulator -= steps as f32;

        for n in 0..steps {
            if self.is_complete() {
                return n;
            }
            self.tick(rng);
        }
        steps
    }

    /// Whether the driver should stop scheduling ticks. Runs forever unless
    /// the config opts into stopping once every food source hosts a colony.
    pub fn is_complete(&self) -> bool {
        self.config.stop_when_all_food_colonized
            && self.state.colonized_food() == self.state.food.len()
    }

    pub fn stats(&self) -> SimulationStats {
        let mut cell_count = 0;
        let mut frontier_count = 0;
        let mut total_energy = 0;
        for colony in &self.state.colonies {
            cell_count += colony.population_len();
            frontier_count += colony.leading_edge().len();
            total_energy += colony.total_energy();
        }
        SimulationStats {
            tick: self.state.time,
            colony_count: self.state.colonies.len(),
            cell_count,
            frontier_count,
            total_energy,
            food_count: self.state.food.len(),
            colonized_food: self.state.colonized_food(),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
