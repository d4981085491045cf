//! # pb_core - Tactics-Board Play Recording & Replay Engine
//!
//! Record spatial snapshots ("steps") of a fixed set of tracked actors
//! (players plus one ball) and replay them later as a smoothly interpolated
//! animation, keeping plays synchronized with a remote store and a local
//! offline cache.
//!
//! ## Features
//! - Canonical play model with a flat wire form for storage and transport
//! - Frame-driven playback with linear interpolation and facing control
//! - Keyed offline cache (MessagePack + LZ4, checksummed)
//! - Async remote gateway contract with local validation and a
//!   user-facing error classifier

pub mod cache;
pub mod error;
pub mod gateway;
pub mod play;
pub mod session;

// Re-export the engine surface
pub use error::PlayError;
pub use play::actors::{ActorAdapter, ActorEvent, ActorEventHub, ActorObserver};
pub use play::converter::{
    from_wire, play_from_detail, to_wire, FlagRecord, PositionRecord, WirePlay, WireStep,
};
pub use play::playback::{PlaybackController, PlaybackState, MOVE_EPSILON};
pub use play::recorder::{PlayRecorder, RecorderState};
pub use play::types::{
    ActorId, ActorRoster, Play, PlayStep, BALL_WIRE_ID, UNASSIGNED_TEAM, UNSAVED_ID,
};

// Re-export the persistence surface
pub use cache::{CacheError, PlayCache};
pub use gateway::{
    classify_error_detail, GatewayError, PlayDetail, PlayGateway, PlaySummary,
};
pub use session::{ActionOutcome, PlaySession};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
