use tracing::{debug, warn};

use caesura_core::{cue_us_from_secs, StreamId, CUE_MATCH_EPSILON_US, MICROS_PER_SECOND};
use caesura_events::{EventBus, SsaiEvent};
use caesura_state::{AdInfo, AdPlaybackState};

use crate::{AdDescriptor, CuePoint, SsaiError, SsaiResult};

/// Reconciles a VOD decisioning session into the shared schedule.
///
/// Cue points arrive once, up front; each becomes a placeholder group holding
/// a single unresolved ad. Ad descriptors then expand and refine the
/// placeholders in place — already-resolved ads are never discarded.
///
/// Publication is deferred: mutations accumulate in a pending state that is
/// published only when the content source explicitly asks, so period
/// boundaries never shift in the middle of a read.
pub struct VodReconciler {
    state: AdPlaybackState,
    events: EventBus,
    cue_match_epsilon_us: i64,
    dirty: bool,
}

impl VodReconciler {
    pub fn new(
        identity: StreamId,
        cue_points: &[CuePoint],
        events: EventBus,
    ) -> SsaiResult<Self> {
        let mut state = AdPlaybackState::new(identity, [])?;
        for cue in cue_points {
            let time_us = cue_us_from_secs(cue.start_secs);
            state = match state.clone().with_placeholder_ad_group(time_us) {
                Ok(next) => next,
                Err(e) => {
                    debug!(time_us, error = %e, "duplicate cue point ignored");
                    continue;
                }
            };
            // The cue pair bounds the whole break; until the pod resolves,
            // the placeholder ad carries the break duration.
            let group = state
                .ad_group_index_for_cue_us(time_us, 0)
                .expect("group was just inserted");
            let duration_us = (cue.duration_secs() * MICROS_PER_SECOND as f64).round() as i64;
            state = state.with_ad_duration_us(group, 0, duration_us)?;
        }
        Ok(Self {
            state,
            events,
            cue_match_epsilon_us: CUE_MATCH_EPSILON_US,
            dirty: true,
        })
    }

    pub fn with_cue_match_epsilon_us(mut self, epsilon_us: i64) -> Self {
        self.cue_match_epsilon_us = epsilon_us;
        self
    }

    /// The pending (not necessarily published) schedule.
    pub fn state(&self) -> &AdPlaybackState {
        &self.state
    }

    pub fn set_content_duration_us(&mut self, duration_us: i64) {
        if self.state.content_duration_us() != Some(duration_us) {
            self.state = self.state.clone().with_content_duration_us(duration_us);
            self.dirty = true;
        }
    }

    /// Fold one ad descriptor into its placeholder group: grow the pod to
    /// the reported size, record the ad's duration, and record its URI when
    /// the session exposes one.
    pub fn on_ad_descriptor(&mut self, descriptor: &AdDescriptor) -> SsaiResult<()> {
        let group = self.group_for(descriptor)?;
        if descriptor.position_in_pod == 0 {
            warn!("pod position is 1-based; ignoring descriptor at position 0");
            return Ok(());
        }
        let ad_index = descriptor.position_in_pod - 1;

        let known = self.state.group(group).map_or(0, |g| g.ads().len());
        let count = descriptor.total_ads.max(known).max(ad_index + 1);
        let mut state = self.state.clone();
        if state.group(group).is_some_and(|g| g.count() != Some(count)) {
            state = state.with_ad_count(group, count)?;
        }

        let duration_us =
            (descriptor.duration_secs * MICROS_PER_SECOND as f64).round() as i64;
        state = state.with_ad_duration_us(group, ad_index, duration_us)?;
        if let Some(uri) = &descriptor.media_uri {
            state = state.with_available_ad_uri(group, ad_index, uri.clone())?;
        }

        self.state = state;
        self.dirty = true;
        debug!(group, ad_index, count, "vod placeholder refined");
        Ok(())
    }

    /// Player-driven annotations: the stream already contains the ad media,
    /// so played/skipped/error marks come from playback, not the session.
    pub fn mark_played(&mut self, info: AdInfo) -> SsaiResult<()> {
        self.state = self
            .state
            .clone()
            .with_played_ad(info.ad_group_index, info.ad_index_in_ad_group)?;
        self.dirty = true;
        Ok(())
    }

    pub fn mark_skipped(&mut self, info: AdInfo) -> SsaiResult<()> {
        self.state = self
            .state
            .clone()
            .with_skipped_ad(info.ad_group_index, info.ad_index_in_ad_group)?;
        self.dirty = true;
        Ok(())
    }

    pub fn mark_error(&mut self, info: AdInfo) -> SsaiResult<()> {
        self.state = self
            .state
            .clone()
            .with_error_ad(info.ad_group_index, info.ad_index_in_ad_group)?;
        self.dirty = true;
        Ok(())
    }

    /// Publish the pending schedule if it changed since the last request.
    ///
    /// Called by the content source when it is safe to move period
    /// boundaries. Returns whether anything was published.
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

    fn group_for(&self, descriptor: &AdDescriptor) -> SsaiResult<usize> {
        let cue_us = cue_us_from_secs(descriptor.time_offset_secs);
        if let Some(group) = self
            .state
            .ad_group_index_for_cue_us(cue_us, self.cue_match_epsilon_us)
        {
            return Ok(group);
        }
        // Low-precision time offsets can miss the epsilon window; the pod
        // ordinal is the fallback.
        if let Some(pod) = descriptor.pod_index {
            if pod < self.state.group_count() {
                return Ok(pod);
            }
        }
        Err(SsaiError::UnknownBreak {
            time_offset_secs: descriptor.time_offset_secs,
        })
    }
}
