use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayError {
    #[error("play has no playable content ({steps} steps)")]
    NotPlayable { steps: usize },

    #[error("step {index} does not cover every tracked actor")]
    IncompleteStep { index: usize },

    #[error("a playback is already running")]
    PlaybackBusy,

    #[error("recording is active")]
    RecordingActive,

    #[error("no current play")]
    NoCurrentPlay,
}
