//! Playback engine: interpolates recorded steps over time and drives the
//! actor adapter once per scheduling tick.

use super::actors::ActorAdapter;
use super::types::{ActorId, ActorRoster, Play, PlayStep};
use crate::error::PlayError;
use nalgebra::Vector3;

/// Start/end distance above which an actor counts as moving for a segment.
pub const MOVE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Interpolation state machine over one play.
///
/// The controller owns a snapshot of the play's steps; an external driver
/// calls [`advance`] once per rendered frame with that frame's delta time.
/// Segments run strictly in order, and the controller returns to idle after
/// the final segment or on an explicit [`stop`].
///
/// [`advance`]: PlaybackController::advance
/// [`stop`]: PlaybackController::stop
pub struct PlaybackController {
    steps: Vec<PlayStep>,
    roster: ActorRoster,
    segment: usize,
    t: f32,
    state: PlaybackState,
}

impl PlaybackController {
    /// Build a controller for `play`.
    ///
    /// Fails when the play has fewer than two steps, or when any step does
    /// not cover every roster actor (an incomplete step would leave stale
    /// positions and flags mid-playback).
    pub fn new(play: &Play, roster: &ActorRoster) -> Result<Self, PlayError> {
        if !play.has_playable_content() {
            return Err(PlayError::NotPlayable { steps: play.step_count() });
        }
        for (index, step) in play.steps().iter().enumerate() {
            if !step.is_complete_for(roster) {
                return Err(PlayError::IncompleteStep { index });
            }
        }

        log::info!("Playback started: {}", play);
        Ok(Self {
            steps: play.steps().to_vec(),
            roster: *roster,
            segment: 0,
            t: 0.0,
            state: PlaybackState::Playing,
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index of the segment currently interpolating.
    pub fn current_segment(&self) -> usize {
        self.segment
    }

    pub fn segment_count(&self) -> usize {
        self.steps.len() - 1
    }

    /// Normalized progress within the current segment.
    pub fn progress(&self) -> f32 {
        self.t.clamp(0.0, 1.0)
    }

    /// Run one scheduling tick.
    ///
    /// Accumulates `dt / duration` into the segment progress, interpolates
    /// every actor at the clamped progress value, and advances to the next
    /// segment once progress reaches 1.
    pub fn advance<A: ActorAdapter>(&mut self, dt: f32, adapter: &mut A) -> PlaybackState {
        if self.state != PlaybackState::Playing {
            return self.state;
        }

        // Zero durations degenerate to a single-tick segment.
        let duration = self.steps[self.segment].duration.max(f32::EPSILON);
        self.t += dt / duration;

        self.apply_segment(adapter);

        if self.t >= 1.0 {
            self.segment += 1;
            self.t = 0.0;
            if self.segment + 1 >= self.steps.len() {
                self.finish(adapter);
            }
        }

        self.state
    }

    /// Abort playback, clearing moving and block state for every actor.
    pub fn stop<A: ActorAdapter>(&mut self, adapter: &mut A) {
        if self.state == PlaybackState::Playing {
            log::info!("Playback stopped at segment {}", self.segment);
        }
        self.clear_actor_state(adapter);
        self.state = PlaybackState::Idle;
    }

    fn apply_segment<A: ActorAdapter>(&self, adapter: &mut A) {
        let start = &self.steps[self.segment];
        let end = &self.steps[self.segment + 1];
        let t = self.t.clamp(0.0, 1.0);

        // Idle actors face the ball, itself interpolating within the segment.
        let focal = match (
            start.positions.get(&ActorId::Ball),
            end.positions.get(&ActorId::Ball),
        ) {
            (Some(from), Some(to)) => Some(from.lerp(to, t)),
            _ => None,
        };

        for id in self.roster.iter() {
            let (from, to) = match (start.positions.get(&id), end.positions.get(&id)) {
                (Some(from), Some(to)) => (*from, *to),
                _ => continue,
            };

            let position = from.lerp(&to, t);
            adapter.set_position(id, position);

            let moving = (to - from).norm() > MOVE_EPSILON;
            adapter.set_moving(id, moving);

            // Block state is a discrete switch taken from the segment's end
            // step, never interpolated.
            let block = end.block_flags.get(&id).copied().unwrap_or(false);
            adapter.set_block(id, block);

            let target = if moving { Some(to) } else { focal };
            if let Some(target) = target {
                let mut direction = target - position;
                direction.y = 0.0;
                if direction != Vector3::zeros() {
                    adapter.set_facing(id, direction);
                }
            }
        }
    }

    fn finish<A: ActorAdapter>(&mut self, adapter: &mut A) {
        self.clear_actor_state(adapter);
        self.state = PlaybackState::Idle;
        log::info!("Playback finished after {} segments", self.segment_count());
    }

    fn clear_actor_state<A: ActorAdapter>(&self, adapter: &mut A) {
        for id in self.roster.iter() {
            adapter.set_moving(id, false);
            adapter.set_block(id, false);
        }
    }
}
