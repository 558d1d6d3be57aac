use std::time::Duration;

use caesura_core::CUE_MATCH_EPSILON_US;

/// Configuration for one insertion coordinator.
///
/// Timing thresholds are per-coordinator fields rather than process-wide
/// constants, so streams can run different policies and tests can inject
/// tiny timeouts.
#[derive(Clone, Debug)]
pub struct InsertConfig {
    /// How long the SDK gets to resolve an ad the player is blocked on (or
    /// an upcoming break inside the preload lead) before the whole group is
    /// failed. Default: 10 s.
    pub ad_preload_timeout: Duration,
    /// How far ahead of a break the SDK is expected to begin loading it.
    /// Default: 4 s.
    pub preload_lead_threshold: Duration,
    /// Distance from the content end within which content counts as
    /// complete. Default: 5 s.
    pub end_of_content_threshold: Duration,
    /// Tolerance when matching SDK cue times against stored group times.
    /// Default: 1 ms.
    pub cue_match_epsilon_us: i64,
    /// Whether a break at/before the start position is played on startup
    /// (catch-up) or skipped. When `false`, a break exactly at the start
    /// boundary is skipped too. Default: `true`.
    pub play_ads_before_start_position: bool,
    /// Capacity of the events broadcast channel. Default: 32.
    pub events_channel_capacity: usize,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            ad_preload_timeout: Duration::from_secs(10),
            preload_lead_threshold: Duration::from_secs(4),
            end_of_content_threshold: Duration::from_secs(5),
            cue_match_epsilon_us: CUE_MATCH_EPSILON_US,
            play_ads_before_start_position: true,
            events_channel_capacity: 32,
        }
    }
}

impl InsertConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ad_preload_timeout(mut self, timeout: Duration) -> Self {
        self.ad_preload_timeout = timeout;
        self
    }

    pub fn with_preload_lead_threshold(mut self, threshold: Duration) -> Self {
        self.preload_lead_threshold = threshold;
        self
    }

    pub fn with_end_of_content_threshold(mut self, threshold: Duration) -> Self {
        self.end_of_content_threshold = threshold;
        self
    }

    pub fn with_cue_match_epsilon_us(mut self, epsilon_us: i64) -> Self {
        self.cue_match_epsilon_us = epsilon_us;
        self
    }

    pub fn with_play_ads_before_start_position(mut self, play: bool) -> Self {
        self.play_ads_before_start_position = play;
        self
    }

    pub fn with_events_channel_capacity(mut self, capacity: usize) -> Self {
        self.events_channel_capacity = capacity;
        self
    }
}
