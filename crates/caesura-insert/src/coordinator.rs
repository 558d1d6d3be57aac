//! The three-axis insertion state machine.
//!
//! Axis 1: SDK ad playback (`None -> Playing <-> Paused -> None`), driven
//! only by SDK `load/play/pause/stop` calls. Axis 2: what the player itself
//! is presenting, driven by position snapshots. Axis 3: the persisted
//! [`AdPlaybackState`], mutated only here in response to the other two.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, warn};
use url::Url;

use caesura_core::{cue_us_from_secs, StreamId, TIME_END_OF_SOURCE};
use caesura_events::{ErrorScope, Event, EventBus, InsertEvent};
use caesura_state::{AdInfo, AdPlaybackState, AdState};

use crate::{
    AdHandle, AdLifecycleSink, AdRenderTarget, HandleMap, InsertConfig, InsertError, InsertResult,
    PodInfo, PositionSnapshot, Progress,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SdkAdState {
    None,
    Playing,
    Paused,
}

/// Content position reported to the SDK while the player has already entered
/// a break the SDK has not started yet. Frozen at the break position and
/// advanced by wall clock; reporting the real (past-the-break) position would
/// make the SDK retroactively skip the break.
#[derive(Clone, Copy, Debug)]
struct FakeClock {
    base_us: i64,
    started: Instant,
}

impl FakeClock {
    fn position_us(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_micros()).unwrap_or(i64::MAX);
        self.base_us.saturating_add(elapsed)
    }
}

/// The load the coordinator is currently waiting on, with its wall-clock
/// deadline. Re-armed whenever the awaited ad changes; firing marks the
/// whole group failed exactly once.
#[derive(Clone, Copy, Debug)]
struct PendingLoad {
    info: AdInfo,
    deadline: Instant,
}

struct Inner {
    config: InsertConfig,
    identity: StreamId,
    events: EventBus,
    render: Arc<dyn AdRenderTarget>,
    sink: Arc<dyn AdLifecycleSink>,

    state: AdPlaybackState,
    handles: HandleMap,

    sdk_state: SdkAdState,
    current: Option<AdHandle>,
    current_errored: bool,

    snapshot: Option<PositionSnapshot>,
    ad_progress: Option<Progress>,
    volume: f64,

    fake_clock: Option<FakeClock>,
    pending_prepare_error: Option<AdInfo>,
    pending_load: Option<PendingLoad>,

    rendering_initialized: bool,
    content_complete_sent: bool,
    released: bool,
}

/// Client-side ad insertion coordinator for one stream.
///
/// Single-writer: the whole coordinator sits behind one mutex per stream id.
/// Callbacks lock, mutate, publish, release; nothing blocks or awaits while
/// holding the lock, so callbacks hopped over from other threads serialize
/// cleanly.
pub struct AdInsertionCoordinator {
    inner: Mutex<Inner>,
    events: EventBus,
}

impl AdInsertionCoordinator {
    /// Create a coordinator for `identity`.
    ///
    /// `restored` carries a persisted schedule from a previous process; when
    /// present it is used verbatim and the SDK's cue points are ignored.
    pub fn new(
        identity: StreamId,
        restored: Option<AdPlaybackState>,
        config: InsertConfig,
        render: Arc<dyn AdRenderTarget>,
        sink: Arc<dyn AdLifecycleSink>,
    ) -> Self {
        let events = EventBus::new(config.events_channel_capacity);
        let state = restored.unwrap_or(AdPlaybackState::NONE);
        Self {
            inner: Mutex::new(Inner {
                config,
                identity,
                events: events.clone(),
                render,
                sink,
                state,
                handles: HandleMap::new(),
                sdk_state: SdkAdState::None,
                current: None,
                current_errored: false,
                snapshot: None,
                ad_progress: None,
                volume: 1.0,
                fake_clock: None,
                pending_prepare_error: None,
                pending_load: None,
                rendering_initialized: false,
                content_complete_sent: false,
                released: false,
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Kick off the ad request. A restored schedule still issues the request
    /// so the SDK session exists, but its cue points will not reset progress.
    pub fn start(&self) {
        let inner = self.inner.lock();
        if inner.released {
            warn!("start after release; ignoring");
            return;
        }
        inner.render.request_ads();
    }

    pub fn current_state(&self) -> AdPlaybackState {
        self.inner.lock().state.clone()
    }

    // -- Inbound SDK callbacks ----------------------------------------------------

    /// The SDK resolved the ad request: cue points are known.
    pub fn on_ads_manager_loaded(&self, cue_points_secs: &[f64]) {
        self.guarded("ads_manager_loaded", |inner| {
            inner.handle_ads_manager_loaded(cue_points_secs)
        });
    }

    /// The ad request itself failed, or the session died: content continues
    /// without ads.
    pub fn on_ad_error(&self, reason: &str) {
        self.guarded("ad_error", |inner| inner.handle_ad_error(reason));
    }

    pub fn load_ad(&self, handle: AdHandle, uri: Url, pod: PodInfo) {
        self.guarded("load_ad", |inner| inner.handle_load_ad(handle, uri, pod));
    }

    pub fn play_ad(&self, handle: AdHandle) {
        self.guarded("play_ad", |inner| inner.handle_play_ad(handle));
    }

    pub fn pause_ad(&self, handle: AdHandle) {
        self.guarded("pause_ad", |inner| inner.handle_pause_ad(handle));
    }

    pub fn stop_ad(&self, handle: AdHandle) {
        self.guarded("stop_ad", |inner| inner.handle_stop_ad(handle));
    }

    pub fn on_ad_clicked(&self) {
        self.events.publish(InsertEvent::AdClicked);
    }

    pub fn on_ad_tapped(&self) {
        self.events.publish(InsertEvent::AdTapped);
    }

    // -- Inbound player notifications ----------------------------------------------

    /// Fired on every discontinuity or timeline refresh.
    pub fn on_position_changed(&self, snapshot: PositionSnapshot) {
        self.guarded("position_changed", |inner| {
            inner.handle_position_changed(snapshot)
        });
    }

    /// The player finished the current ad's media.
    pub fn on_ad_media_ended(&self) {
        self.guarded("ad_media_ended", |inner| inner.handle_ad_media_ended());
    }

    /// The ad's media failed to become ready after being loaded.
    pub fn on_ad_media_error(&self, info: AdInfo) {
        self.guarded("ad_media_error", |inner| inner.handle_ad_media_error(info));
    }

    /// Player-side progress through the current ad; answered back to the SDK
    /// and used as the resume offset on deactivation.
    pub fn on_ad_progress(&self, progress: Progress) {
        self.inner.lock().ad_progress = Some(progress);
    }

    pub fn set_volume(&self, volume: f64) {
        self.inner.lock().volume = volume.clamp(0.0, 1.0);
    }

    // -- Synchronous SDK queries ---------------------------------------------------

    pub fn content_progress(&self) -> Option<Progress> {
        let inner = self.inner.lock();
        if let Some(clock) = &inner.fake_clock {
            return Some(Progress {
                position_us: clock.position_us(),
                duration_us: inner.content_duration_us(),
            });
        }
        inner.snapshot.map(|s| Progress {
            position_us: s.position_us,
            duration_us: s.content_duration_us,
        })
    }

    pub fn ad_progress(&self) -> Option<Progress> {
        self.inner.lock().ad_progress
    }

    pub fn volume(&self) -> f64 {
        self.inner.lock().volume
    }

    // -- Lifecycle -----------------------------------------------------------------

    /// Tear down mid-break without discarding the schedule: stores the resume
    /// offset so a re-activated session can resume inside the ad instead of
    /// from its top.
    pub fn deactivate(&self) {
        self.guarded("deactivate", |inner| inner.handle_deactivate());
    }

    pub fn release(&self) {
        let mut inner = self.inner.lock();
        if inner.released {
            return;
        }
        inner.released = true;
        inner.render.release();
        inner.handles.clear();
        inner.pending_load = None;
        inner.fake_clock = None;
        debug!(identity = %inner.identity, "insertion coordinator released");
    }

    // -- Internal ------------------------------------------------------------------

    /// Every unexpected failure inside a callback handler degrades to "skip
    /// all remaining ads", never to a playback stall.
    fn guarded(&self, op: &'static str, f: impl FnOnce(&mut Inner) -> InsertResult<()>) {
        let mut inner = self.inner.lock();
        if inner.released {
            warn!(op, "callback after release; ignoring");
            return;
        }
        if let Err(e) = f(&mut inner) {
            inner.recover_all_ads(op, &e.to_string());
        }
    }
}

impl Inner {
    fn content_duration_us(&self) -> Option<i64> {
        self.state
            .content_duration_us()
            .or(self.snapshot.and_then(|s| s.content_duration_us))
    }

    fn commit(&mut self) {
        self.events.publish(InsertEvent::StateChanged {
            state: self.state.clone(),
        });
    }

    fn recover_all_ads(&mut self, op: &'static str, reason: &str) {
        warn!(op, reason, "internal error in SDK callback; skipping all remaining ads");
        self.state = self.state.clone().with_all_ads_skipped();
        self.sdk_state = SdkAdState::None;
        self.current = None;
        self.current_errored = false;
        self.fake_clock = None;
        self.pending_load = None;
        self.pending_prepare_error = None;
        self.commit();
        self.events.publish(InsertEvent::LoadError {
            scope: ErrorScope::AllAds,
            reason: reason.to_string(),
        });
    }

    fn handle_ads_manager_loaded(&mut self, cue_points_secs: &[f64]) -> InsertResult<()> {
        if self.state.is_none() {
            let mut times: Vec<i64> = cue_points_secs.iter().copied().map(cue_us_from_secs).collect();
            times.sort_unstable();
            let before = times.len();
            times.dedup();
            if times.len() != before {
                debug!(dropped = before - times.len(), "duplicate cue points ignored");
            }
            self.state = AdPlaybackState::new(self.identity, times)?;
            self.commit();
        } else {
            // A restored schedule already carries progress; the fresh cue
            // points describe the same breaks.
            debug!(identity = %self.identity, "keeping restored schedule over fresh cue points");
        }
        self.maybe_initialize_rendering()
    }

    fn handle_ad_error(&mut self, reason: &str) -> InsertResult<()> {
        if self.state.is_none() {
            // Request failed outright: resolved, zero ads.
            self.state = AdPlaybackState::new(self.identity, [])?;
        } else {
            self.state = self.state.clone().with_all_ads_skipped();
        }
        self.sdk_state = SdkAdState::None;
        self.current = None;
        self.fake_clock = None;
        self.pending_load = None;
        self.commit();
        self.events.publish(InsertEvent::LoadError {
            scope: ErrorScope::AllAds,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Once cue points and a start position are both known, decide which
    /// breaks are still eligible and hand the SDK its starting boundary.
    fn maybe_initialize_rendering(&mut self) -> InsertResult<()> {
        if self.rendering_initialized || self.state.is_none() {
            return Ok(());
        }
        let Some(snapshot) = self.snapshot else {
            return Ok(());
        };
        self.rendering_initialized = true;

        let position_us = snapshot.position_us;
        let duration_us = snapshot.content_duration_us;
        let target = if self.config.play_ads_before_start_position {
            self.state
                .ad_group_index_for_position(position_us, duration_us)
                .or_else(|| self.state.ad_group_index_after_position(position_us, duration_us))
        } else {
            self.state.ad_group_index_after_position(position_us, duration_us)
        };

        let Some(target) = target else {
            debug!(position_us, "no eligible ad groups; abandoning ad rendering");
            let skipped = self.state.clone().with_all_ads_skipped();
            if skipped != self.state {
                self.state = skipped;
                self.commit();
            }
            self.render.release();
            return Ok(());
        };

        let mut state = self.state.clone();
        let mut skipped_any = false;
        for group in 0..target {
            if state.group(group).is_some_and(|g| g.has_unplayed_ads()) {
                state = state.with_skipped_ad_group(group)?;
                skipped_any = true;
            }
        }
        if skipped_any {
            self.state = state;
            self.commit();
        }

        let play_ads_after_us = if target == 0 {
            None
        } else {
            // Any boundary strictly between the last skipped break and the
            // target break works; the midpoint is safely inside the gap.
            let previous = self
                .state
                .group(target - 1)
                .map(|g| g.time_us())
                .unwrap_or(0);
            let upto = match self.state.group(target).map(|g| g.time_us()) {
                Some(TIME_END_OF_SOURCE) | None => position_us,
                Some(time_us) => time_us,
            };
            Some(previous + (upto - previous) / 2)
        };
        debug!(target, ?play_ads_after_us, "ad rendering initialized");
        self.render.init_rendering(play_ads_after_us);
        Ok(())
    }

    fn handle_position_changed(&mut self, snapshot: PositionSnapshot) -> InsertResult<()> {
        let previous = self.snapshot.replace(snapshot);

        if let Some(duration) = snapshot.content_duration_us {
            if !self.state.is_none() && self.state.content_duration_us() != Some(duration) {
                self.state = self.state.clone().with_content_duration_us(duration);
                self.commit();
            }
        }

        self.maybe_initialize_rendering()?;
        self.update_player_axis(previous.and_then(|p| p.playing_ad), snapshot);
        self.check_pending_load(snapshot)?;
        self.maybe_send_content_complete(snapshot)
    }

    fn update_player_axis(&mut self, was_playing: Option<AdInfo>, snapshot: PositionSnapshot) {
        match (was_playing, snapshot.playing_ad) {
            (None, Some(info)) => {
                if self.sdk_state == SdkAdState::None {
                    // Player already entered the break; SDK hasn't issued
                    // play yet. Freeze the reported content position at the
                    // break boundary.
                    let group_time = self
                        .state
                        .group(info.ad_group_index)
                        .map(|g| g.time_us())
                        .unwrap_or(snapshot.position_us);
                    let base_us = if group_time == TIME_END_OF_SOURCE {
                        self.content_duration_us().unwrap_or(snapshot.position_us)
                    } else {
                        group_time
                    };
                    self.fake_clock = Some(FakeClock {
                        base_us,
                        started: Instant::now(),
                    });
                    debug!(base_us, "fake content clock armed");
                }
            }
            (Some(_), None) => {
                self.ad_progress = None;
            }
            _ => {}
        }
    }

    /// Arm, re-arm, cancel, or fire the load deadline. Deadlines are
    /// evaluated here on every snapshot, which keeps the coordinator
    /// single-writer: no timer task ever mutates state.
    fn check_pending_load(&mut self, snapshot: PositionSnapshot) -> InsertResult<()> {
        let expected = self.awaited_load(snapshot);

        match (self.pending_load, expected) {
            (_, None) => {
                self.pending_load = None;
            }
            (None, Some(info)) => {
                self.pending_load = Some(PendingLoad {
                    info,
                    deadline: Instant::now() + self.config.ad_preload_timeout,
                });
            }
            (Some(pending), Some(info)) if pending.info != info => {
                self.pending_load = Some(PendingLoad {
                    info,
                    deadline: Instant::now() + self.config.ad_preload_timeout,
                });
            }
            (Some(pending), Some(info)) => {
                if Instant::now() >= pending.deadline {
                    let group = info.ad_group_index;
                    warn!(group, "ad load timed out; failing ad group");
                    self.state = self.state.clone().with_ad_load_error(group)?;
                    self.pending_load = None;
                    self.fake_clock = None;
                    self.commit();
                    self.events.publish(InsertEvent::LoadError {
                        scope: ErrorScope::AdGroup(group),
                        reason: "ad load timed out".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The ad whose load the coordinator is currently waiting on: either the
    /// ad the player is blocked inside, or the first ad of an upcoming break
    /// within the preload lead.
    fn awaited_load(&self, snapshot: PositionSnapshot) -> Option<AdInfo> {
        if let Some(info) = snapshot.playing_ad {
            // A missing pod entry means the pod itself is still unresolved.
            let unresolved = match self.state.ad(info) {
                Some(AdState::Unavailable) => true,
                None => self
                    .state
                    .group(info.ad_group_index)
                    .is_some_and(|g| !g.is_done()),
                _ => false,
            };
            return unresolved.then_some(info);
        }

        let duration_us = snapshot.content_duration_us;
        let group_index = self
            .state
            .ad_group_index_after_position(snapshot.position_us, duration_us)?;
        let group = self.state.group(group_index)?;
        let lead_us = i64::try_from(self.config.preload_lead_threshold.as_micros()).ok()?;
        let within_lead = if group.time_us() == TIME_END_OF_SOURCE {
            duration_us.is_some_and(|d| snapshot.position_us >= d.saturating_sub(lead_us))
        } else {
            group.time_us().saturating_sub(snapshot.position_us) <= lead_us
        };
        if !within_lead {
            return None;
        }
        let ad_index = group.first_unplayed_index().unwrap_or(0);
        matches!(group.ad(ad_index), Some(AdState::Unavailable) | None)
            .then_some(AdInfo::new(group_index, ad_index))
    }

    fn maybe_send_content_complete(&mut self, snapshot: PositionSnapshot) -> InsertResult<()> {
        if self.content_complete_sent || snapshot.playing_ad.is_some() {
            return Ok(());
        }
        let Some(duration_us) = snapshot.content_duration_us else {
            return Ok(());
        };
        let threshold_us =
            i64::try_from(self.config.end_of_content_threshold.as_micros()).unwrap_or(i64::MAX);
        if snapshot.position_us < duration_us.saturating_sub(threshold_us) {
            return Ok(());
        }
        if self
            .state
            .ad_group_index_for_position(snapshot.position_us, Some(duration_us))
            .is_some()
        {
            // A break is still due here; completion waits for it.
            return Ok(());
        }

        self.content_complete_sent = true;
        self.sink.on_content_complete();

        // Nothing before the postroll can load anymore.
        let mut state = self.state.clone();
        let mut changed = false;
        for group in 0..state.group_count() {
            let skippable = state
                .group(group)
                .is_some_and(|g| g.time_us() != TIME_END_OF_SOURCE && g.has_unplayed_ads());
            if skippable {
                state = state.with_skipped_ad_group(group)?;
                changed = true;
            }
        }
        if changed {
            self.state = state;
            self.commit();
        }
        self.events.publish(InsertEvent::ContentCompleted);
        Ok(())
    }

    fn handle_load_ad(&mut self, handle: AdHandle, uri: Url, pod: PodInfo) -> InsertResult<()> {
        if self.state.is_none() {
            return Err(InsertError::NoSchedule);
        }
        let cue_us = cue_us_from_secs(pod.cue_time_secs);
        let Some(group) = self
            .state
            .ad_group_index_for_cue_us(cue_us, self.config.cue_match_epsilon_us)
        else {
            warn!(cue_us, "load for unknown cue point; ignoring");
            return Ok(());
        };
        if self.state.group(group).is_some_and(|g| g.is_done()) {
            // The tracked operation for this break was abandoned (timeout or
            // skip); a late result must not be applied.
            warn!(group, "late load for abandoned ad group; ignoring");
            return Ok(());
        }
        if pod.ad_position == 0 {
            warn!("pod position is 1-based; ignoring load at position 0");
            return Ok(());
        }
        let ad_index = pod.ad_position - 1;

        let known = self.state.group(group).map_or(0, |g| g.ads().len());
        let count = pod.total_ads.max(known).max(ad_index + 1);
        let mut state = self.state.clone().with_ad_count(group, count)?;

        // Pods load in order: an unresolved entry before a loaded one has
        // silently timed out inside the SDK.
        for earlier in 0..ad_index {
            if matches!(
                state.group(group).and_then(|g| g.ad(earlier)),
                Some(AdState::Unavailable)
            ) {
                state = state.with_error_ad(group, earlier)?;
            }
        }

        state = state.with_available_ad_uri(group, ad_index, uri)?;
        self.state = state;

        let info = AdInfo::new(group, ad_index);
        self.handles.force_put(handle, info);
        if self
            .pending_load
            .is_some_and(|p| p.info.ad_group_index == group)
        {
            self.pending_load = None;
        }
        self.commit();
        Ok(())
    }

    fn handle_play_ad(&mut self, handle: AdHandle) -> InsertResult<()> {
        let Some(info) = self.handles.info_for(handle) else {
            warn!(?handle, "play for unknown handle; ignoring");
            return Ok(());
        };
        match self.sdk_state {
            SdkAdState::None => {
                self.sdk_state = SdkAdState::Playing;
                self.current = Some(handle);
                self.fake_clock = None;
                if self.pending_prepare_error == Some(info) {
                    // The deferred prepare failure surfaces as a play-time
                    // error, so the SDK's own retry/skip semantics apply.
                    self.pending_prepare_error = None;
                    self.current_errored = true;
                    self.sink.on_error(handle);
                } else {
                    self.current_errored = false;
                    self.sink.on_play(handle);
                }
            }
            SdkAdState::Paused if self.current == Some(handle) => {
                self.sdk_state = SdkAdState::Playing;
                self.sink.on_resume(handle);
            }
            state => {
                warn!(?handle, ?state, "unexpected play; ignoring");
            }
        }
        Ok(())
    }

    fn handle_pause_ad(&mut self, handle: AdHandle) -> InsertResult<()> {
        if self.sdk_state == SdkAdState::Playing && self.current == Some(handle) {
            self.sdk_state = SdkAdState::Paused;
            self.sink.on_pause(handle);
        } else {
            warn!(?handle, state = ?self.sdk_state, "unexpected pause; ignoring");
        }
        Ok(())
    }

    fn handle_stop_ad(&mut self, handle: AdHandle) -> InsertResult<()> {
        let Some(info) = self.handles.info_for(handle) else {
            warn!(?handle, "stop for unknown handle; ignoring");
            return Ok(());
        };
        match self.sdk_state {
            SdkAdState::Playing | SdkAdState::Paused if self.current == Some(handle) => {
                let errored = self.current_errored;
                self.sdk_state = SdkAdState::None;
                self.current = None;
                self.current_errored = false;
                self.ad_progress = None;
                let playable = self.state.ad(info).is_some_and(AdState::is_playable);
                if playable {
                    self.state = if errored {
                        self.state
                            .clone()
                            .with_error_ad(info.ad_group_index, info.ad_index_in_ad_group)?
                    } else {
                        self.state
                            .clone()
                            .with_played_ad(info.ad_group_index, info.ad_index_in_ad_group)?
                    };
                    self.commit();
                }
            }
            SdkAdState::None => {
                // Preloaded speculatively, position moved away before it
                // played: this stop is a load cancellation, not a playback.
                debug!(?handle, "speculative load cancelled; marking ad skipped");
                if self.state.ad(info).is_some_and(AdState::is_playable) {
                    self.state = self
                        .state
                        .clone()
                        .with_skipped_ad(info.ad_group_index, info.ad_index_in_ad_group)?;
                    self.commit();
                }
            }
            state => {
                warn!(?handle, ?state, "stop for non-current ad; ignoring");
            }
        }
        Ok(())
    }

    fn handle_ad_media_ended(&mut self) -> InsertResult<()> {
        if let (SdkAdState::Playing | SdkAdState::Paused, Some(handle)) =
            (self.sdk_state, self.current)
        {
            self.sink.on_ended(handle);
        } else {
            debug!("media ended with no current ad; ignoring");
        }
        Ok(())
    }

    fn handle_ad_media_error(&mut self, info: AdInfo) -> InsertResult<()> {
        let current_info = self.current.and_then(|h| self.handles.info_for(h));
        let playing_later_in_pod = self.sdk_state != SdkAdState::None
            && current_info.is_some_and(|cur| {
                cur.ad_group_index == info.ad_group_index
                    && cur.ad_index_in_ad_group > info.ad_index_in_ad_group
            });

        if playing_later_in_pod {
            // A later pod ad is already playing; the stuck one is finalized
            // right away.
            if self.state.ad(info).is_some_and(AdState::is_playable) {
                self.state = self
                    .state
                    .clone()
                    .with_error_ad(info.ad_group_index, info.ad_index_in_ad_group)?;
                self.commit();
            }
            if let Some(handle) = self.handles.handle_for(info) {
                self.sink.on_ended(handle);
                self.sink.on_error(handle);
            }
        } else {
            // Defer: keep reporting a plausible content position until the
            // SDK attempts to play this ad.
            self.pending_prepare_error = Some(info);
            if self.fake_clock.is_none() {
                let group_time = self
                    .state
                    .group(info.ad_group_index)
                    .map(|g| g.time_us())
                    .unwrap_or(0);
                let base_us = if group_time == TIME_END_OF_SOURCE {
                    self.content_duration_us().unwrap_or(0)
                } else {
                    group_time
                };
                self.fake_clock = Some(FakeClock {
                    base_us,
                    started: Instant::now(),
                });
            }
            debug!(?info, "ad prepare failure deferred until SDK play");
        }
        Ok(())
    }

    fn handle_deactivate(&mut self) -> InsertResult<()> {
        if let (Some(info), Some(progress)) = (
            self.snapshot.and_then(|s| s.playing_ad),
            self.ad_progress,
        ) {
            self.state = self
                .state
                .clone()
                .with_ad_resume_position_us(info.ad_group_index, progress.position_us)?;
            self.commit();
            debug!(
                group = info.ad_group_index,
                resume_us = progress.position_us,
                "resume position stored on deactivation"
            );
        }
        self.sdk_state = SdkAdState::None;
        self.current = None;
        self.current_errored = false;
        self.fake_clock = None;
        self.pending_load = None;
        Ok(())
    }
}
