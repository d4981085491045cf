//! Canonical play model: tracked actors, recorded steps, play metadata.

use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::fmt;

/// Wire id reserved for the ball (players use 0..N-1).
pub const BALL_WIRE_ID: u32 = 99;

/// Sentinel id of a play that has never been persisted remotely.
pub const UNSAVED_ID: i64 = -1;

/// Sentinel team id of a play not yet assigned to a team.
pub const UNASSIGNED_TEAM: i64 = -1;

/// Identity of a tracked actor.
///
/// Kept distinct from raw wire integers so player indices and the ball
/// sentinel cannot be mixed up. Ordering puts players first (ascending),
/// then the ball, which fixes the iteration order of per-actor maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActorId {
    Player(u32),
    Ball,
}

impl ActorId {
    /// Flat integer used by the wire format and the remote store.
    pub fn wire_id(&self) -> u32 {
        match self {
            ActorId::Player(index) => *index,
            ActorId::Ball => BALL_WIRE_ID,
        }
    }

    pub fn from_wire_id(id: u32) -> ActorId {
        if id == BALL_WIRE_ID {
            ActorId::Ball
        } else {
            ActorId::Player(id)
        }
    }

    pub fn is_ball(&self) -> bool {
        matches!(self, ActorId::Ball)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Player(index) => write!(f, "player {}", index),
            ActorId::Ball => write!(f, "ball"),
        }
    }
}

/// Fixed actor id space of a session: `player_count` players plus the ball.
///
/// Ids are never reused while a session lives; steps recorded against one
/// roster are only playable against the same roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorRoster {
    player_count: u32,
}

impl ActorRoster {
    pub fn new(player_count: u32) -> Self {
        Self { player_count }
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    /// Total tracked actors including the ball.
    pub fn len(&self) -> usize {
        self.player_count as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false // the ball is always tracked
    }

    pub fn contains(&self, id: ActorId) -> bool {
        match id {
            ActorId::Player(index) => index < self.player_count,
            ActorId::Ball => true,
        }
    }

    /// Players in ascending order, then the ball.
    pub fn iter(&self) -> impl Iterator<Item = ActorId> {
        (0..self.player_count)
            .map(ActorId::Player)
            .chain(std::iter::once(ActorId::Ball))
    }
}

/// One recorded snapshot of every tracked actor, plus the duration of the
/// interpolation segment that starts at this step.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayStep {
    /// Segment duration in seconds, expected > 0.
    pub duration: f32,
    pub positions: BTreeMap<ActorId, Vector3<f32>>,
    pub block_flags: BTreeMap<ActorId, bool>,
}

impl PlayStep {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            positions: BTreeMap::new(),
            block_flags: BTreeMap::new(),
        }
    }

    /// True when both maps hold exactly one entry per roster id.
    pub fn is_complete_for(&self, roster: &ActorRoster) -> bool {
        self.positions.len() == roster.len()
            && self.block_flags.len() == roster.len()
            && roster
                .iter()
                .all(|id| self.positions.contains_key(&id) && self.block_flags.contains_key(&id))
    }
}

/// An ordered sequence of steps plus remote-store metadata.
///
/// Insertion order is playback order and survives every conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    pub id: i64,
    pub name: String,
    pub team_id: i64,
    /// Opaque timestamp string set by the remote store.
    pub created_at: String,
    steps: Vec<PlayStep>,
}

impl Default for Play {
    fn default() -> Self {
        Self::new()
    }
}

impl Play {
    pub fn new() -> Self {
        Self {
            id: UNSAVED_ID,
            name: String::new(),
            team_id: UNASSIGNED_TEAM,
            created_at: String::new(),
            steps: Vec::new(),
        }
    }

    pub fn add_step(&mut self, step: PlayStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PlayStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_valid(&self) -> bool {
        !self.steps.is_empty()
    }

    /// A single step has no segment to interpolate.
    pub fn has_playable_content(&self) -> bool {
        self.steps.len() >= 2
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "Unnamed" } else { &self.name };
        write!(f, "Play: {} | Steps: {}", name, self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_ids_order_players_before_ball() {
        let roster = ActorRoster::new(3);
        let ids: Vec<ActorId> = roster.iter().collect();
        assert_eq!(
            ids,
            vec![
                ActorId::Player(0),
                ActorId::Player(1),
                ActorId::Player(2),
                ActorId::Ball
            ]
        );
        assert_eq!(roster.len(), 4);
    }

    #[test]
    fn wire_id_roundtrip() {
        assert_eq!(ActorId::Player(4).wire_id(), 4);
        assert_eq!(ActorId::Ball.wire_id(), BALL_WIRE_ID);
        assert_eq!(ActorId::from_wire_id(4), ActorId::Player(4));
        assert_eq!(ActorId::from_wire_id(BALL_WIRE_ID), ActorId::Ball);
    }

    #[test]
    fn roster_membership() {
        let roster = ActorRoster::new(2);
        assert!(roster.contains(ActorId::Player(0)));
        assert!(roster.contains(ActorId::Player(1)));
        assert!(!roster.contains(ActorId::Player(2)));
        assert!(roster.contains(ActorId::Ball));
    }

    #[test]
    fn step_completeness() {
        let roster = ActorRoster::new(1);
        let mut step = PlayStep::new(0.5);
        assert!(!step.is_complete_for(&roster));

        for id in roster.iter() {
            step.positions.insert(id, Vector3::zeros());
            step.block_flags.insert(id, false);
        }
        assert!(step.is_complete_for(&roster));

        // A foreign id disqualifies the step even with all roster ids present.
        step.positions.insert(ActorId::Player(7), Vector3::zeros());
        assert!(!step.is_complete_for(&roster));
    }

    #[test]
    fn playability_thresholds() {
        let mut play = Play::new();
        assert!(!play.is_valid());
        assert!(!play.has_playable_content());

        play.add_step(PlayStep::new(0.5));
        assert!(play.is_valid());
        assert!(!play.has_playable_content());

        play.add_step(PlayStep::new(0.5));
        assert!(play.has_playable_content());
    }

    #[test]
    fn new_play_uses_sentinels() {
        let play = Play::new();
        assert_eq!(play.id, UNSAVED_ID);
        assert_eq!(play.team_id, UNASSIGNED_TEAM);
        assert!(!play.is_persisted());
        assert_eq!(play.to_string(), "Play: Unnamed | Steps: 0");
    }
}
