//! Orchestrating session: owns the current play and wires the recorder,
//! playback engine, cache, and remote gateway together.
//!
//! One session is created at startup and handed its collaborators by the
//! application; nothing here is global. The session is the sole mutator of
//! the current play, and the gateways only ever see serialized snapshots.

use crate::cache::PlayCache;
use crate::error::PlayError;
use crate::gateway::{
    validate_name, validate_play_id, validate_team_id, validate_wire_data, GatewayError,
    PlayGateway, PlaySummary,
};
use crate::play::actors::ActorAdapter;
use crate::play::converter::{from_wire, play_from_detail, to_wire, WirePlay};
use crate::play::playback::{PlaybackController, PlaybackState};
use crate::play::recorder::PlayRecorder;
use crate::play::types::{ActorRoster, Play};

/// Two-part result of an externally triggered action; presentation is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

pub struct PlaySession<A: ActorAdapter, G: PlayGateway> {
    roster: ActorRoster,
    adapter: A,
    gateway: G,
    cache: PlayCache,
    recorder: PlayRecorder,
    current: Option<Play>,
    playback: Option<PlaybackController>,
}

impl<A: ActorAdapter, G: PlayGateway> PlaySession<A, G> {
    pub fn new(
        roster: ActorRoster,
        adapter: A,
        gateway: G,
        cache: PlayCache,
        step_duration: f32,
    ) -> Self {
        Self {
            roster,
            adapter,
            gateway,
            cache,
            recorder: PlayRecorder::new(step_duration),
            current: None,
            playback: None,
        }
    }

    // ------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------

    /// Open a new recording, discarding the current play.
    pub fn start_recording(&mut self) -> Result<(), PlayError> {
        if self.is_playing() {
            return Err(PlayError::PlaybackBusy);
        }
        self.current = None;
        self.recorder.start(&self.adapter, &self.roster);
        Ok(())
    }

    /// Capture one step from the live actor state.
    pub fn record_step(&mut self) {
        self.recorder.record_step(&self.adapter, &self.roster);
    }

    /// Freeze the recording and adopt the result as the current play.
    ///
    /// The play is kept even when it has fewer than two steps; discarding
    /// it is the caller's call ([`discard_current`]).
    ///
    /// [`discard_current`]: PlaySession::discard_current
    pub fn stop_recording(&mut self) -> usize {
        self.recorder.stop();
        self.current = self.recorder.take_play();
        self.step_count()
    }

    /// Drop the current play and reset actor animation state.
    pub fn discard_current(&mut self) {
        self.stop_playback();
        self.recorder.reset();
        self.current = None;
        self.adapter.reset_animations();
    }

    // ------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------

    /// Begin playback of the current play.
    pub fn start_playback(&mut self) -> Result<(), PlayError> {
        if self.recorder.is_recording() {
            return Err(PlayError::RecordingActive);
        }
        if self.is_playing() {
            return Err(PlayError::PlaybackBusy);
        }
        let play = self.current.as_ref().ok_or(PlayError::NoCurrentPlay)?;
        self.playback = Some(PlaybackController::new(play, &self.roster)?);
        Ok(())
    }

    /// Drive the active playback by one frame; returns whether playback is
    /// still running afterwards.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(controller) = self.playback.as_mut() else {
            return false;
        };
        if controller.advance(dt, &mut self.adapter) == PlaybackState::Idle {
            self.playback = None;
            return false;
        }
        true
    }

    /// Cancel any in-progress playback.
    pub fn stop_playback(&mut self) {
        if let Some(mut controller) = self.playback.take() {
            controller.stop(&mut self.adapter);
        }
    }

    // ------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------

    /// Upload the current play as a new remote entry and mirror it into the
    /// local cache.
    pub async fn save_current(&mut self, team_id: i64, name: &str) -> ActionOutcome {
        let Some(play) = self.current.as_ref() else {
            return ActionOutcome::fail("No play to upload");
        };
        if !play.has_playable_content() {
            return ActionOutcome::fail("No play to upload");
        }
        if let Err(err) = validate_team_id(team_id).and_then(|_| validate_name(name)) {
            return ActionOutcome::fail(err.user_message());
        }

        let wire = to_wire(play);
        match self.gateway.create(team_id, name, &wire).await {
            Ok(detail) => {
                if let Some(play) = self.current.as_mut() {
                    play.id = detail.id;
                    play.name = detail.name.clone();
                    play.team_id = detail.team_id;
                    play.created_at = detail.created_at.clone();
                }
                self.mirror_to_cache(detail.id, &wire);
                log::info!("Play uploaded: {} (ID: {})", detail.name, detail.id);
                ActionOutcome::ok("Play uploaded successfully")
            }
            Err(err) => {
                log::error!("Upload play failed: {}", err);
                ActionOutcome::fail(err.user_message())
            }
        }
    }

    /// Fetch a play and replace the current one wholesale.
    ///
    /// When the remote is unreachable the local cache serves as fallback;
    /// other remote failures are reported as-is.
    pub async fn load_play(&mut self, play_id: i64) -> ActionOutcome {
        if validate_play_id(play_id).is_err() {
            return ActionOutcome::fail("Invalid play ID");
        }

        // Clear playback state before swapping plays.
        self.stop_playback();
        self.adapter.reset_animations();

        let fetched = self.gateway.fetch(play_id).await;
        let detail = match fetched {
            Ok(detail) => detail,
            Err(GatewayError::Connection(reason)) => {
                log::warn!(
                    "Remote fetch for play {} failed ({}), trying local cache",
                    play_id,
                    reason
                );
                return self.load_from_cache(play_id);
            }
            Err(err) => {
                log::error!("Load play failed: {}", err);
                return ActionOutcome::fail(err.user_message());
            }
        };

        if detail.data.is_empty() {
            return ActionOutcome::fail("Empty play data");
        }
        let Some(play) = play_from_detail(&detail) else {
            return ActionOutcome::fail("Failed to convert play data");
        };

        self.mirror_to_cache(play_id, &detail.data);
        log::info!("Play loaded: {} ({} steps)", detail.name, play.step_count());
        self.current = Some(play);
        ActionOutcome::ok("Play loaded successfully")
    }

    /// Push name/data changes of an already-persisted play.
    pub async fn update_current(&mut self) -> ActionOutcome {
        let Some(play) = self.current.as_ref() else {
            return ActionOutcome::fail("No play to update");
        };
        if !play.has_playable_content() {
            return ActionOutcome::fail("No play to update");
        }
        if !play.is_persisted() {
            return ActionOutcome::fail("Play has no ID, save it first");
        }

        let wire = to_wire(play);
        if let Err(err) = validate_wire_data(&wire) {
            return ActionOutcome::fail(err.user_message());
        }

        let (id, name) = (play.id, play.name.clone());
        match self.gateway.update(id, &name, &wire).await {
            Ok(()) => {
                self.mirror_to_cache(id, &wire);
                log::info!("Play updated: {}", name);
                ActionOutcome::ok("Play updated successfully")
            }
            Err(err) => {
                log::error!("Update play failed: {}", err);
                ActionOutcome::fail(err.user_message())
            }
        }
    }

    /// Delete the current play from the remote store.
    pub async fn delete_current(&mut self) -> ActionOutcome {
        let Some(play) = self.current.as_ref() else {
            return ActionOutcome::fail("No play to delete");
        };
        if !play.is_persisted() {
            return ActionOutcome::fail("Play has no ID");
        }

        let id = play.id;
        match self.gateway.delete(id).await {
            Ok(()) => {
                if self.current.as_ref().map(|p| p.id) == Some(id) {
                    self.current = None;
                }
                log::info!("Play {} deleted", id);
                ActionOutcome::ok("Play deleted successfully")
            }
            Err(err) => {
                log::error!("Delete play failed: {}", err);
                ActionOutcome::fail(err.user_message())
            }
        }
    }

    /// Server-side copy of an existing play.
    pub async fn duplicate_play(&mut self, play_id: i64) -> ActionOutcome {
        if validate_play_id(play_id).is_err() {
            return ActionOutcome::fail("Invalid play ID");
        }

        match self.gateway.duplicate(play_id).await {
            Ok(detail) => {
                log::info!("Play duplicated: {} (ID: {})", detail.name, detail.id);
                ActionOutcome::ok(format!("Play duplicated: {}", detail.name))
            }
            Err(err) => {
                log::error!("Duplicate play failed: {}", err);
                ActionOutcome::fail(err.user_message())
            }
        }
    }

    pub async fn list_plays(&self, team_id: i64) -> Result<Vec<PlaySummary>, GatewayError> {
        validate_team_id(team_id)?;
        self.gateway.list(team_id).await
    }

    // ------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------

    pub fn roster(&self) -> &ActorRoster {
        &self.roster
    }

    pub fn step_count(&self) -> usize {
        if self.recorder.is_recording() {
            self.recorder.step_count()
        } else {
            self.current.as_ref().map(Play::step_count).unwrap_or(0)
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(PlaybackController::is_playing)
    }

    /// True when the current play holds at least one playable segment.
    pub fn has_play(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(Play::has_playable_content)
    }

    pub fn current_play(&self) -> Option<&Play> {
        self.current.as_ref()
    }

    /// Inject a play directly, bypassing recording (offline flows, tests).
    pub fn set_current_play(&mut self, play: Option<Play>) {
        self.current = play;
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    fn load_from_cache(&mut self, play_id: i64) -> ActionOutcome {
        let Some(wire) = self.cache.try_load(play_id) else {
            return ActionOutcome::fail(GatewayError::CacheMiss(play_id).user_message());
        };
        let Some(mut play) = from_wire(&wire) else {
            return ActionOutcome::fail("Failed to convert play data");
        };
        play.id = play_id;
        log::info!("Play {} loaded from local cache", play_id);
        self.current = Some(play);
        ActionOutcome::ok("Play loaded from local cache")
    }

    fn mirror_to_cache(&self, play_id: i64, wire: &WirePlay) {
        if let Err(err) = self.cache.save(play_id, wire) {
            // Cache errors only cost offline availability.
            log::warn!("Failed to cache play {}: {}", play_id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PlayDetail;
    use crate::play::actors::testing::RigAdapter;
    use crate::play::converter::WirePlay;
    use crate::play::types::ActorId;
    use async_trait::async_trait;
    use nalgebra::Vector3;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Clone, Copy, PartialEq)]
    enum StubMode {
        Healthy,
        Offline,
        Missing,
    }

    struct StubGateway {
        mode: StubMode,
        calls: Mutex<Vec<String>>,
    }

    impl StubGateway {
        fn new(mode: StubMode) -> Self {
            Self { mode, calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn error(&self) -> Option<GatewayError> {
            match self.mode {
                StubMode::Healthy => None,
                StubMode::Offline => {
                    Some(GatewayError::Connection("no route to host".to_string()))
                }
                StubMode::Missing => {
                    Some(GatewayError::NotFound("Play not found".to_string()))
                }
            }
        }

        fn detail(id: i64, name: &str, data: WirePlay) -> PlayDetail {
            PlayDetail {
                id,
                name: name.to_string(),
                team_id: 3,
                created_at: "2026-08-08T09:00:00Z".to_string(),
                data,
            }
        }
    }

    #[async_trait]
    impl PlayGateway for StubGateway {
        async fn create(
            &self,
            _team_id: i64,
            name: &str,
            data: &WirePlay,
        ) -> Result<PlayDetail, GatewayError> {
            self.record("create");
            match self.error() {
                Some(err) => Err(err),
                None => Ok(Self::detail(42, name, data.clone())),
            }
        }

        async fn list(&self, _team_id: i64) -> Result<Vec<PlaySummary>, GatewayError> {
            self.record("list");
            match self.error() {
                Some(err) => Err(err),
                None => Ok(vec![PlaySummary {
                    id: 42,
                    name: "Horns".to_string(),
                    created_at: String::new(),
                }]),
            }
        }

        async fn fetch(&self, play_id: i64) -> Result<PlayDetail, GatewayError> {
            self.record("fetch");
            match self.error() {
                Some(err) => Err(err),
                None => Ok(Self::detail(play_id, "Horns", remote_wire())),
            }
        }

        async fn update(
            &self,
            _play_id: i64,
            _name: &str,
            _data: &WirePlay,
        ) -> Result<(), GatewayError> {
            self.record("update");
            match self.error() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn delete(&self, _play_id: i64) -> Result<(), GatewayError> {
            self.record("delete");
            match self.error() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn duplicate(&self, play_id: i64) -> Result<PlayDetail, GatewayError> {
            self.record("duplicate");
            match self.error() {
                Some(err) => Err(err),
                None => Ok(Self::detail(play_id + 1, "Horns (copy)", remote_wire())),
            }
        }
    }

    fn remote_wire() -> WirePlay {
        let roster = ActorRoster::new(1);
        let mut play = Play::new();
        for x in [0.0f32, 10.0] {
            let mut step = crate::play::types::PlayStep::new(1.0);
            for id in roster.iter() {
                step.positions.insert(id, Vector3::new(x, 0.0, 0.0));
                step.block_flags.insert(id, false);
            }
            play.add_step(step);
        }
        to_wire(&play)
    }

    fn session(
        mode: StubMode,
        temp: &TempDir,
    ) -> PlaySession<RigAdapter, StubGateway> {
        let roster = ActorRoster::new(1);
        PlaySession::new(
            roster,
            RigAdapter::new(&roster),
            StubGateway::new(mode),
            PlayCache::new(temp.path().join("plays")),
            0.5,
        )
    }

    fn record_two_steps(session: &mut PlaySession<RigAdapter, StubGateway>) {
        session.start_recording().unwrap();
        session
            .adapter_mut()
            .place(ActorId::Player(0), Vector3::new(10.0, 0.0, 0.0));
        session.record_step();
        session.stop_recording();
    }

    #[tokio::test]
    async fn recording_lifecycle_produces_current_play() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);

        session.start_recording().unwrap();
        assert!(session.is_recording());
        assert_eq!(session.step_count(), 1);

        session.record_step();
        let total = session.stop_recording();
        assert_eq!(total, 2);
        assert!(session.has_play());
        assert!(!session.is_recording());
    }

    #[tokio::test]
    async fn save_without_play_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);

        let outcome = session.save_current(3, "Horns").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No play to upload");
        assert!(session.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn save_validates_before_any_network_call() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);

        let outcome = session.save_current(0, "Horns").await;
        assert_eq!(outcome.message, "Invalid team ID");

        let outcome = session.save_current(3, "").await;
        assert_eq!(outcome.message, "Play name is required");

        assert!(session.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn save_adopts_server_metadata_and_mirrors_to_cache() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);

        let outcome = session.save_current(3, "Horns").await;
        assert!(outcome.success, "{}", outcome.message);

        let play = session.current_play().unwrap();
        assert_eq!(play.id, 42);
        assert_eq!(play.name, "Horns");
        assert_eq!(play.team_id, 3);
        assert!(!play.created_at.is_empty());

        assert!(session.cache.exists(42));
    }

    #[tokio::test]
    async fn load_replaces_current_play_wholesale() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);

        let outcome = session.load_play(42).await;
        assert!(outcome.success);

        let play = session.current_play().unwrap();
        assert_eq!(play.id, 42);
        assert_eq!(play.name, "Horns");
        assert_eq!(play.step_count(), 2);
    }

    #[tokio::test]
    async fn load_falls_back_to_cache_when_offline() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Offline, &temp);
        session.cache.save(7, &remote_wire()).unwrap();

        let outcome = session.load_play(7).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Play loaded from local cache");
        assert_eq!(session.current_play().unwrap().id, 7);
    }

    #[tokio::test]
    async fn load_reports_connection_error_without_cached_copy() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Offline, &temp);

        let outcome = session.load_play(7).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No offline copy of play 7");
    }

    #[tokio::test]
    async fn load_does_not_use_cache_for_missing_plays() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Missing, &temp);
        session.cache.save(7, &remote_wire()).unwrap();

        let outcome = session.load_play(7).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Play not found");
    }

    #[tokio::test]
    async fn update_requires_a_persisted_id() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);

        let outcome = session.update_current().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Play has no ID, save it first");
        assert!(session.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_clears_the_current_play() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);
        session.save_current(3, "Horns").await;

        let outcome = session.delete_current().await;
        assert!(outcome.success);
        assert!(session.current_play().is_none());
    }

    #[tokio::test]
    async fn playback_runs_to_completion_through_tick() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);

        session.start_playback().unwrap();
        assert!(session.is_playing());

        assert!(session.tick(0.25));
        assert_eq!(
            session.adapter().positions[&ActorId::Player(0)],
            Vector3::new(5.0, 0.0, 0.0)
        );

        assert!(!session.tick(0.25));
        assert!(!session.is_playing());
    }

    #[tokio::test]
    async fn only_one_playback_at_a_time() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);
        record_two_steps(&mut session);

        session.start_playback().unwrap();
        assert!(matches!(
            session.start_playback(),
            Err(PlayError::PlaybackBusy)
        ));
        assert!(matches!(
            session.start_recording(),
            Err(PlayError::PlaybackBusy)
        ));

        session.stop_playback();
        assert!(!session.is_playing());
        session.start_playback().unwrap();
    }

    #[tokio::test]
    async fn playback_requires_playable_content() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);

        assert!(matches!(
            session.start_playback(),
            Err(PlayError::NoCurrentPlay)
        ));

        session.start_recording().unwrap();
        session.stop_recording();
        assert!(matches!(
            session.start_playback(),
            Err(PlayError::NotPlayable { steps: 1 })
        ));
    }

    #[tokio::test]
    async fn duplicate_reports_the_new_name() {
        let temp = TempDir::new().unwrap();
        let mut session = session(StubMode::Healthy, &temp);

        let outcome = session.duplicate_play(42).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Play duplicated: Horns (copy)");
    }

    #[tokio::test]
    async fn list_validates_team_id_locally() {
        let temp = TempDir::new().unwrap();
        let session = session(StubMode::Healthy, &temp);

        assert!(session.list_plays(0).await.is_err());
        assert!(session.gateway.calls().is_empty());

        let summaries = session.list_plays(3).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "Horns");
    }
}
