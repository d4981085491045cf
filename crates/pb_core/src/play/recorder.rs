//! Step recorder: captures live actor snapshots into a play.

use super::actors::ActorAdapter;
use super::types::{ActorRoster, Play, PlayStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Captures actor state into steps on demand.
///
/// `start` opens a fresh play and records one initial step, so a playable
/// segment exists as soon as the second step is captured. `stop` freezes the
/// play without discarding it; whether a sub-two-step play is kept is the
/// caller's decision.
pub struct PlayRecorder {
    state: RecorderState,
    step_duration: f32,
    play: Option<Play>,
    steps_recorded: usize,
}

impl PlayRecorder {
    pub fn new(step_duration: f32) -> Self {
        Self {
            state: RecorderState::Idle,
            step_duration,
            play: None,
            steps_recorded: 0,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn step_count(&self) -> usize {
        self.steps_recorded
    }

    pub fn step_duration(&self) -> f32 {
        self.step_duration
    }

    /// Begin a new recording, replacing any previously held play.
    pub fn start<A: ActorAdapter>(&mut self, adapter: &A, roster: &ActorRoster) {
        self.play = Some(Play::new());
        self.steps_recorded = 0;
        self.state = RecorderState::Recording;
        log::info!("Recording started");

        self.record_step(adapter, roster);
    }

    /// Sample every tracked actor and append one step.
    ///
    /// No-op while idle, mirroring an input trigger arriving after stop.
    pub fn record_step<A: ActorAdapter>(&mut self, adapter: &A, roster: &ActorRoster) {
        if self.state != RecorderState::Recording {
            log::warn!("Record trigger ignored, recorder is idle");
            return;
        }

        let mut step = PlayStep::new(self.step_duration);
        for id in roster.iter() {
            step.positions.insert(id, adapter.position(id));
            step.block_flags.insert(id, adapter.block_flag(id));
        }

        if let Some(play) = self.play.as_mut() {
            play.add_step(step);
            self.steps_recorded += 1;
            log::debug!("Recorded step {}", self.steps_recorded);
        }
    }

    /// Freeze the recording. The play stays available via [`take_play`].
    ///
    /// [`take_play`]: PlayRecorder::take_play
    pub fn stop(&mut self) {
        self.state = RecorderState::Idle;
        log::info!("Recording stopped, total steps: {}", self.steps_recorded);
    }

    pub fn play(&self) -> Option<&Play> {
        self.play.as_ref()
    }

    pub fn take_play(&mut self) -> Option<Play> {
        self.play.take()
    }

    /// Drop any held play and return to idle.
    pub fn reset(&mut self) {
        self.play = None;
        self.steps_recorded = 0;
        self.state = RecorderState::Idle;
    }
}
