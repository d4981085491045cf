//! Play recording, playback, and model/wire conversion.

pub mod actors;
pub mod converter;
pub mod playback;
pub mod recorder;
pub mod types;

pub use actors::*;
pub use converter::*;
pub use playback::*;
pub use recorder::*;
pub use types::*;
