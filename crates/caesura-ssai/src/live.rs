use tracing::{debug, info, warn};

use caesura_core::{StreamId, Timeline, MICROS_PER_SECOND, TIME_END_OF_SOURCE};
use caesura_events::{EventBus, SsaiEvent};
use caesura_state::AdPlaybackState;

use crate::{AdDescriptor, SsaiResult};

/// Reconciles a live decisioning session into the shared schedule.
///
/// A live stream carries exactly one open ad group, anchored at the postroll
/// sentinel and refined continuously as ads start. Events can arrive late —
/// after the player has already moved past the break back into content — so
/// an ad that shows up beyond the last known ad of a completed break must
/// open a new group rather than be merged into the finished one (the
/// late-event split).
pub struct LiveReconciler {
    state: AdPlaybackState,
    events: EventBus,
    timeline: Timeline,
    /// Index of the open, sentinel-anchored group.
    open_group: usize,
    /// Ad index in the open group the session last started.
    last_started: Option<usize>,
    /// Highest ad index the session reported complete.
    finished_up_to: Option<usize>,
    /// Window position at which the open group's first ad started.
    group_start_position_us: Option<i64>,
    dirty: bool,
}

impl LiveReconciler {
    pub fn new(identity: StreamId, events: EventBus) -> SsaiResult<Self> {
        let state = AdPlaybackState::new(identity, [TIME_END_OF_SOURCE])?
            .with_is_server_side_inserted(0, true)?;
        Ok(Self {
            state,
            events,
            timeline: Timeline::single_period(None),
            open_group: 0,
            last_started: None,
            finished_up_to: None,
            group_start_position_us: None,
            dirty: false,
        })
    }

    pub fn state(&self) -> &AdPlaybackState {
        &self.state
    }

    /// Refresh the window/period structure. Period-relative indices are
    /// derived per event from the current timeline, never cached, so every
    /// discontinuity must come through here.
    pub fn update_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.maybe_publish();
    }

    /// The session started an ad at `window_position_us`.
    pub fn on_ad_started(
        &mut self,
        descriptor: &AdDescriptor,
        window_position_us: i64,
    ) -> SsaiResult<()> {
        if descriptor.position_in_pod == 0 {
            warn!("pod position is 1-based; ignoring start at position 0");
            return Ok(());
        }
        let mut target = descriptor.position_in_pod - 1;

        let known = self
            .state
            .group(self.open_group)
            .map(|g| g.ads().len())
            .unwrap_or(0);
        let break_finished = known > 0 && self.finished_up_to == Some(known - 1);
        let mut did_split = false;

        if break_finished {
            if target == 0 {
                // Pod position 1 after a finished break: the next break
                // begins.
                debug!(group = self.open_group, "new break after finished break");
            } else if target >= known {
                // Best-effort heuristic: a trailing ad adjacent to the last
                // known ad of a completed break belongs to a new break, not
                // the finished one.
                info!(
                    group = self.open_group,
                    ads = known,
                    position_in_pod = descriptor.position_in_pod,
                    "late ad after completed break; splitting ad group"
                );
            } else {
                warn!(
                    group = self.open_group,
                    position_in_pod = descriptor.position_in_pod,
                    "start for an ad of a finished break; ignoring"
                );
                return Ok(());
            }
            let closed_time_us = self
                .group_start_position_us
                .unwrap_or_else(|| window_position_us.saturating_sub(1));
            self.state = self
                .state
                .clone()
                .with_split_live_ad_group(self.open_group, closed_time_us)?;
            self.events.publish(SsaiEvent::GroupSplit {
                group_index: self.open_group,
            });
            self.open_group += 1;
            self.last_started = None;
            self.finished_up_to = None;
            self.group_start_position_us = None;
            target = 0;
            did_split = true;
        }

        let mut state = self.state.clone();
        let mut len = state
            .group(self.open_group)
            .map(|g| g.ads().len())
            .unwrap_or(0);
        // Inside an announced pod the advertised size pre-opens the trailing
        // slots; after a split the stale pod metadata is not trusted.
        let grow_to = if did_split {
            target + 1
        } else {
            (target + 1).max(descriptor.total_ads)
        };
        while len < grow_to {
            state = state.with_appended_ad(self.open_group)?;
            len += 1;
        }

        let duration_us =
            (descriptor.duration_secs * MICROS_PER_SECOND as f64).round() as i64;
        state = state.with_ad_duration_us(self.open_group, target, duration_us)?;
        if let Some(uri) = &descriptor.media_uri {
            state = state.with_available_ad_uri(self.open_group, target, uri.clone())?;
        }
        self.state = state;
        self.dirty = true;

        if self.group_start_position_us.is_none() {
            self.group_start_position_us = Some(window_position_us);
        }
        self.last_started = Some(target);
        debug!(group = self.open_group, ad = target, "live ad started");
        self.maybe_publish();
        Ok(())
    }

    /// The session finished the ad it last started. Bookkeeping only: the
    /// played mark comes from the player passing the ad, not from the
    /// session.
    pub fn on_ad_completed(&mut self) {
        if let Some(last) = self.last_started {
            self.finished_up_to = Some(self.finished_up_to.map_or(last, |f| f.max(last)));
        }
    }

    /// The player moved past an ad of the open group: the authoritative
    /// played mark.
    pub fn mark_played(&mut self, ad_in_group: usize) -> SsaiResult<()> {
        self.state = self
            .state
            .clone()
            .with_played_ad(self.open_group, ad_in_group)?;
        self.dirty = true;
        self.maybe_publish();
        Ok(())
    }

    /// The session failed the ad it last started.
    pub fn on_ad_error(&mut self) -> SsaiResult<()> {
        let Some(last) = self.last_started else {
            debug!("ad error with no started ad; ignoring");
            return Ok(());
        };
        self.state = self.state.clone().with_error_ad(self.open_group, last)?;
        self.dirty = true;
        self.finished_up_to = Some(self.finished_up_to.map_or(last, |f| f.max(last)));
        self.maybe_publish();
        Ok(())
    }

    /// Live single-period windows publish immediately; a multi-period window
    /// defers to [`LiveReconciler::publish_pending`] exactly like VOD, since
    /// moving boundaries mid-read is not safe there.
    fn maybe_publish(&mut self) {
        if !self.timeline.is_multi_period() {
            let _ = self.publish_pending();
        }
    }

    pub fn publish_pending(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.events.publish(SsaiEvent::StateChanged {
            state: self.state.clone(),
        });
        true
    }
}
