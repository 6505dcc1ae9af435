use macroquad::prelude::*;

use crate::simulation::Simulation;

/// Requests from the keyboard that the frame loop has to carry out itself.
#[derive(Default)]
pub struct FrameRequests {
    pub screenshot: bool,
}

pub fn handle_controls(sim: &mut Simulation) -> FrameRequests {
    let mut requests = FrameRequests::default();

    if is_key_pressed(KeyCode::Space) {
        sim.toggle_pause();
    }

    if is_key_pressed(KeyCode::R) {
        sim.reset();
    }

    if is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::Equal) {
        sim.increase_speed();
    }
    if is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::Minus) {
        sim.decrease_speed();
    }
    if is_key_pressed(KeyCode::Key0) {
        sim.reset_speed();
    }

    // Screenshot (P key), taken once the frame is drawn
    if is_key_pressed(KeyCode::P) {
        requests.screenshot = true;
    }

    requests
}
