//! Conversion between the canonical play model and the flat wire format
//! used for storage and network transport.

use super::types::{ActorId, Play, PlayStep};
use crate::gateway::PlayDetail;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Flattened play as stored remotely and in the local cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirePlay {
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

impl WirePlay {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireStep {
    pub duration: f32,
    #[serde(default)]
    pub positions: Vec<PositionRecord>,
    #[serde(rename = "blockActions", default)]
    pub block_actions: Vec<FlagRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PositionRecord {
    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagRecord {
    pub id: u32,
    pub block: bool,
}

/// Flatten each step's maps into parallel record lists, one record per
/// tracked actor. List order follows map order; readers must not rely on it.
pub fn to_wire(play: &Play) -> WirePlay {
    let steps = play
        .steps()
        .iter()
        .map(|step| WireStep {
            duration: step.duration,
            positions: step
                .positions
                .iter()
                .map(|(id, pos)| PositionRecord {
                    id: id.wire_id(),
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                })
                .collect(),
            block_actions: step
                .block_flags
                .iter()
                .map(|(id, block)| FlagRecord { id: id.wire_id(), block: *block })
                .collect(),
        })
        .collect();

    WirePlay { steps }
}

/// Rebuild the canonical model from wire data.
///
/// Returns `None` (logged) when the step list is empty. Record lists are
/// accepted in any order; on duplicate ids the last record wins.
pub fn from_wire(wire: &WirePlay) -> Option<Play> {
    if wire.steps.is_empty() {
        log::error!("Wire play has no steps, cannot convert");
        return None;
    }

    let mut play = Play::new();
    for wire_step in &wire.steps {
        let mut step = PlayStep::new(wire_step.duration);
        for record in &wire_step.positions {
            step.positions
                .insert(ActorId::from_wire_id(record.id), record.to_vector());
        }
        for record in &wire_step.block_actions {
            step.block_flags
                .insert(ActorId::from_wire_id(record.id), record.block);
        }
        play.add_step(step);
    }

    Some(play)
}

/// Convert a remote detail payload, adopting its metadata.
pub fn play_from_detail(detail: &PlayDetail) -> Option<Play> {
    let mut play = from_wire(&detail.data)?;
    play.id = detail.id;
    play.name = detail.name.clone();
    play.team_id = detail.team_id;
    play.created_at = detail.created_at.clone();
    Some(play)
}
