// API module for headless mode - HTTP endpoints to drive and observe the simulation

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::colony::Colony;
use crate::config::SimulationConfig;
use crate::food::FOOD_COLOR;
use crate::simulation::{Simulation, SimulationStats};
use ::rand::rngs::StdRng;

// Serializable snapshot of the model for API responses
#[derive(Serialize, Clone)]
pub struct CellData {
    pub id: usize,
    pub parent: Option<usize>,
    pub x: f64,
    pub y: f64,
    pub energy: i64,
    pub found_food: bool,
    pub color: [f32; 4],
}

#[derive(Serialize, Clone)]
pub struct ColonyData {
    pub origin_x: f64,
    pub origin_y: f64,
    pub seed_energy: i64,
    pub exploration: f64,
    pub frontier: usize,
    pub occupied: usize,
    pub cells: Vec<CellData>,
}

#[derive(Serialize, Clone)]
pub struct FoodData {
    pub x: f64,
    pub y: f64,
    pub energy: i64,
    pub colonized: bool,
    pub color: [f32; 4],
}

#[derive(Serialize, Clone)]
pub struct SimulationStateResponse {
    pub colonies: Vec<ColonyData>,
    pub food: Vec<FoodData>,
    pub stats: SimulationStats,
    pub paused: bool,
    pub complete: bool,
}

#[derive(Deserialize)]
pub struct StepQuery {
    pub steps: Option<usize>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SpeedChange {
    Up,
    Down,
    Reset,
}

#[derive(Deserialize)]
pub struct SpeedQuery {
    pub change: SpeedChange,
}

// Shared state for the API server
#[derive(Clone)]
pub struct ApiState {
    pub simulation: Arc<Mutex<Simulation>>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl ApiState {
    pub fn new(sim: Simulation, rng: StdRng) -> Self {
        Self {
            simulation: Arc::new(Mutex::new(sim)),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

fn colony_to_data(colony: &Colony) -> ColonyData {
    let origin = colony.origin();
    ColonyData {
        origin_x: origin.x,
        origin_y: origin.y,
        seed_energy: colony.seed().total_energy,
        exploration: colony.seed().exploration,
        frontier: colony.leading_edge().len(),
        occupied: colony.occupied_len(),
        cells: colony
            .population_ids()
            .iter()
            .filter_map(|&id| colony.cell(id).map(|c| (id, c)))
            .map(|(id, c)| CellData {
                id,
                parent: c.parent,
                x: c.location.x,
                y: c.location.y,
                energy: c.total_energy,
                found_food: c.found_food,
                color: c.color(),
            })
            .collect(),
    }
}

// Helper function to convert simulation state to API response
fn simulation_to_response(sim: &Simulation) -> SimulationStateResponse {
    SimulationStateResponse {
        colonies: sim.colonies.iter().map(colony_to_data).collect(),
        food: sim
            .food
            .iter()
            .map(|f| FoodData {
                x: f.location.x,
                y: f.location.y,
                energy: f.energy,
                colonized: sim.is_origin(f.location),
                color: FOOD_COLOR,
            })
            .collect(),
        stats: sim.stats(),
        paused: sim.paused,
        complete: sim.is_complete(),
    }
}

// GET /state - Get current simulation state
async fn get_state(
    State(api_state): State<ApiState>,
) -> Result<Json<SimulationStateResponse>, StatusCode> {
    let sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(simulation_to_response(&sim)))
}

// GET /stats - Get simulation statistics
async fn get_stats(
    State(api_state): State<ApiState>,
) -> Result<Json<SimulationStats>, StatusCode> {
    let sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(sim.stats()))
}

// POST /step - Step the simulation forward, stopping early once complete
async fn step_simulation(
    Query(params): Query<StepQuery>,
    State(api_state): State<ApiState>,
) -> Result<Json<SimulationStateResponse>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let steps = params.steps.unwrap_or(1);

    for _ in 0..steps {
        if sim.is_complete() {
            break;
        }
        sim.tick(&mut *rng);
    }

    Ok(Json(simulation_to_response(&sim)))
}

// POST /reset - Reset the simulation
async fn reset_simulation(
    State(api_state): State<ApiState>,
) -> Result<Json<SimulationStateResponse>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    sim.reset();
    Ok(Json(simulation_to_response(&sim)))
}

// POST /pause - Toggle pause
async fn pause_simulation(
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    sim.toggle_pause();
    Ok(Json(serde_json::json!({ "paused": sim.paused })))
}

// POST /speed?change=up|down|reset - Adjust ticks per interval
async fn change_speed(
    Query(params): Query<SpeedQuery>,
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    match params.change {
        SpeedChange::Up => sim.increase_speed(),
        SpeedChange::Down => sim.decrease_speed(),
        SpeedChange::Reset => sim.reset_speed(),
    }
    Ok(Json(
        serde_json::json!({ "speed_multiplier": sim.speed_multiplier }),
    ))
}

// GET /config - Get simulation configuration
async fn get_config(
    State(api_state): State<ApiState>,
) -> Result<Json<SimulationConfig>, StatusCode> {
    let sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(sim.config.clone()))
}

// Create the API router
pub fn create_router(api_state: ApiState) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/stats", get(get_stats))
        .route("/step", post(step_simulation))
        .route("/reset", post(reset_simulation))
        .route("/pause", post(pause_simulation))
        .route("/speed", post(change_speed))
        .route("/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(api_state)
}

// Run the API server with automatic simulation stepping
pub async fn run_server(api_state: ApiState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(api_state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!(port, "slime mold headless API server listening");
    tracing::info!("GET  /state  - full simulation snapshot");
    tracing::info!("GET  /stats  - simulation statistics");
    tracing::info!("POST /step?steps=N - advance N ticks (default: 1)");
    tracing::info!("POST /reset  - start over from the seed colony");
    tracing::info!("POST /pause  - toggle automatic ticking");
    tracing::info!("POST /speed?change=up|down|reset - adjust tick rate");
    tracing::info!("GET  /config - active configuration");

    // Spawn background task to continuously tick the simulation
    let simulation_task = tokio::spawn(simulation_loop(api_state.clone()));

    // Run the server
    let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

    // Wait for either task to complete
    tokio::select! {
        result = server_handle => {
            result??;
        }
        _ = simulation_task => {
            tracing::error!("simulation loop ended unexpectedly");
        }
    }

    Ok(())
}

// Background task that ticks the simulation at the configured cadence
async fn simulation_loop(api_state: ApiState) {
    let interval_ms = match api_state.simulation.lock() {
        Ok(sim) => sim.config.tick_interval_ms.max(1),
        Err(_) => return,
    };
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));

    loop {
        interval.tick().await;

        let mut sim = match api_state.simulation.lock() {
            Ok(sim) => sim,
            Err(_) => break,
        };
        let mut rng = match api_state.rng.lock() {
            Ok(rng) => rng,
            Err(_) => break,
        };
        sim.advance(&mut *rng);
    }
}
