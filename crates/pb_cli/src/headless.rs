//! Headless playback: a stdout-backed actor adapter and the tick loop
//! driving it.

use anyhow::{bail, Result};
use nalgebra::Vector3;
use pb_core::{ActorAdapter, ActorId, ActorRoster, Play, PlaybackController};
use std::collections::BTreeMap;

/// Adapter with no scene behind it; positions and flags live in maps so the
/// tick loop can print them.
struct HeadlessAdapter {
    positions: BTreeMap<ActorId, Vector3<f32>>,
    blocks: BTreeMap<ActorId, bool>,
    moving: BTreeMap<ActorId, bool>,
}

impl HeadlessAdapter {
    fn new(roster: &ActorRoster) -> Self {
        let mut adapter = Self {
            positions: BTreeMap::new(),
            blocks: BTreeMap::new(),
            moving: BTreeMap::new(),
        };
        for id in roster.iter() {
            adapter.positions.insert(id, Vector3::zeros());
            adapter.blocks.insert(id, false);
            adapter.moving.insert(id, false);
        }
        adapter
    }

    fn print_frame(&self, label: &str) {
        println!("{}", label);
        for (id, position) in &self.positions {
            let mut markers = String::new();
            if self.moving.get(id).copied().unwrap_or(false) {
                markers.push_str(" [moving]");
            }
            if self.blocks.get(id).copied().unwrap_or(false) {
                markers.push_str(" [block]");
            }
            println!(
                "  {:<10} ({:>7.2}, {:>6.2}, {:>7.2}){}",
                id.to_string(),
                position.x,
                position.y,
                position.z,
                markers
            );
        }
    }
}

impl ActorAdapter for HeadlessAdapter {
    fn position(&self, id: ActorId) -> Vector3<f32> {
        self.positions.get(&id).copied().unwrap_or_else(Vector3::zeros)
    }

    fn block_flag(&self, id: ActorId) -> bool {
        self.blocks.get(&id).copied().unwrap_or(false)
    }

    fn set_position(&mut self, id: ActorId, position: Vector3<f32>) {
        self.positions.insert(id, position);
    }

    fn set_moving(&mut self, id: ActorId, moving: bool) {
        self.moving.insert(id, moving);
    }

    fn set_block(&mut self, id: ActorId, block: bool) {
        self.blocks.insert(id, block);
    }

    fn set_facing(&mut self, _id: ActorId, _direction: Vector3<f32>) {
        // Nothing to orient without a scene.
    }

    fn reset_animations(&mut self) {
        for flag in self.moving.values_mut() {
            *flag = false;
        }
        for flag in self.blocks.values_mut() {
            *flag = false;
        }
    }
}

/// Drive one play to completion at `fps` ticks per second, printing a frame
/// at every segment boundary.
pub fn run(play: &Play, roster: &ActorRoster, fps: u32) -> Result<()> {
    let mut adapter = HeadlessAdapter::new(roster);
    let mut controller = match PlaybackController::new(play, roster) {
        Ok(controller) => controller,
        Err(err) => bail!("cannot play this file: {err}"),
    };

    let dt = 1.0 / fps as f32;
    let mut segment = controller.current_segment();
    let mut elapsed = 0.0f32;

    println!(
        "simulating {} segment(s) at {} fps",
        controller.segment_count(),
        fps
    );
    adapter.print_frame("t=0.00s (start)");

    while controller.is_playing() {
        controller.advance(dt, &mut adapter);
        elapsed += dt;

        if controller.current_segment() != segment {
            segment = controller.current_segment();
            adapter.print_frame(&format!("t={:.2}s (segment {})", elapsed, segment));
        }
    }

    adapter.print_frame(&format!("t={:.2}s (finished)", elapsed));
    Ok(())
}
