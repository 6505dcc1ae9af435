use macroquad::prelude::*;

use crate::colony::Colony;
use crate::config::CELL_RADIUS;
use crate::food::{Food, FOOD_COLOR};
use crate::simulation::SimulationStats;
use crate::types::Point;

fn to_color([r, g, b, a]: [f32; 4]) -> Color {
    Color::new(r, g, b, a)
}

// World origin sits at the window centre with y pointing up
pub fn world_to_screen(p: Point, width: f32, height: f32) -> (f32, f32) {
    (width / 2.0 + p.x as f32, height / 2.0 - p.y as f32)
}

pub fn draw_colonies(colonies: &[Colony]) {
    let (w, h) = (screen_width(), screen_height());
    let radius = CELL_RADIUS as f32 / 2.0;
    for colony in colonies {
        for cell in colony.population() {
            let (x, y) = world_to_screen(cell.location, w, h);
            draw_circle(x, y, radius, to_color(cell.color()));
        }
    }
}

pub fn draw_food(food: &[Food]) {
    let (w, h) = (screen_width(), screen_height());
    let radius = CELL_RADIUS as f32 / 2.0;
    for f in food {
        let (x, y) = world_to_screen(f.location, w, h);
        draw_circle(x, y, radius, to_color(FOOD_COLOR));
    }
}

pub fn draw_stats_and_help(
    stats: &SimulationStats,
    paused: bool,
    speed_multiplier: f32,
    complete: bool,
) {
    let fps = get_fps();
    let stats_part1_text = format!(
        "Tick: {} | Colonies: {} | Cells: {} | Frontier: {} | Food reached: {}/{}",
        stats.tick,
        stats.colony_count,
        stats.cell_count,
        stats.frontier_count,
        stats.colonized_food,
        stats.food_count,
    );
    draw_text(&stats_part1_text, 10.0, 20.0, 20.0, WHITE);
    let stats_part2_text = format!("Speed: {:.1}x | FPS: {:.0}", speed_multiplier, fps);
    draw_text(&stats_part2_text, 10.0, 40.0, 20.0, WHITE);
    if complete {
        draw_text("COMPLETE - every food source colonized", 10.0, 60.0, 20.0, GREEN);
    } else if paused {
        draw_text("PAUSED - Press SPACE to resume", 10.0, 60.0, 20.0, YELLOW);
    }
    let controls_text =
        "Controls: SPACE=Pause | R=Reset | <-/- = Slower | ->/+ = Faster | 0 = 1x | P=Screenshot";
    draw_text(
        controls_text,
        10.0,
        screen_height() - 20.0,
        16.0,
        Color::new(1.0, 1.0, 1.0, 0.7),
    );
}
