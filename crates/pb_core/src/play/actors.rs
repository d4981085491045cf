//! Actor adapter contract and input-event observer hub.
//!
//! The engine never touches scene objects directly. Recording samples actor
//! state through [`ActorAdapter`]; playback drives it through the same
//! trait. Pointer-drag glue reports through [`ActorEventHub`] so visual
//! reactions (float animation, highlights) subscribe explicitly instead of
//! hooking ad hoc callbacks.

use super::types::ActorId;
use nalgebra::Vector3;

/// Capability surface of the scene owning the tracked actors.
pub trait ActorAdapter {
    /// Current world position of the actor.
    fn position(&self, id: ActorId) -> Vector3<f32>;

    /// Current block indicator of the actor, sampled while recording.
    fn block_flag(&self, id: ActorId) -> bool;

    fn set_position(&mut self, id: ActorId, position: Vector3<f32>);

    fn set_moving(&mut self, id: ActorId, moving: bool);

    fn set_block(&mut self, id: ActorId, block: bool);

    /// Orient the actor along `direction`. The vector is not necessarily
    /// normalized; callers skip degenerate (zero-length) directions.
    fn set_facing(&mut self, id: ActorId, direction: Vector3<f32>);

    /// Clear animation state (moving/block/drag) for every actor.
    fn reset_animations(&mut self);
}

/// Input events surfaced by the drag glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorEvent {
    DragStarted(ActorId),
    DragEnded(ActorId),
}

pub trait ActorObserver {
    fn on_actor_event(&mut self, event: ActorEvent);
}

/// Subscription registry for actor input events.
///
/// Observers are notified in subscription order.
#[derive(Default)]
pub struct ActorEventHub {
    observers: Vec<Box<dyn ActorObserver>>,
}

impl ActorEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ActorObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn emit(&mut self, event: ActorEvent) {
        log::debug!("Actor event: {:?}", event);
        for observer in &mut self.observers {
            observer.on_actor_event(event);
        }
    }
}
