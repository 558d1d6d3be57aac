//! Trait seams toward the ad SDK adapter.
//!
//! The SDK's many callback interfaces are decomposed into small
//! single-responsibility traits instead of one object implementing N
//! unrelated contracts. Inbound SDK calls are plain methods on
//! [`crate::AdInsertionCoordinator`]; these traits carry the outbound half.

use crate::AdHandle;

/// Pod metadata delivered with `load_ad`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PodInfo {
    /// Cue time of the break in seconds; `-1.0` means postroll.
    pub cue_time_secs: f64,
    /// 1-based position of this ad within the pod.
    pub ad_position: usize,
    /// Total ads in the pod as currently known by the SDK.
    pub total_ads: usize,
}

/// Outbound rendering commands to the SDK adapter.
pub trait AdRenderTarget: Send + Sync {
    /// Issue the ad request for this stream's tag/session. Eventually
    /// answered with `on_ads_manager_loaded` or `on_ad_error`.
    fn request_ads(&self);

    /// Begin rendering, presenting only breaks after the given content
    /// position (`None` = from the beginning).
    fn init_rendering(&self, play_ads_after_us: Option<i64>);

    /// Tear down the SDK session; no further callbacks are expected.
    fn release(&self);
}

/// Outbound per-ad progress notifications to the SDK adapter.
///
/// Mirrors what the SDK needs to advance its own pod state machine; the
/// coordinator drives these from player notifications.
pub trait AdLifecycleSink: Send + Sync {
    fn on_play(&self, handle: AdHandle);
    fn on_pause(&self, handle: AdHandle);
    fn on_resume(&self, handle: AdHandle);
    fn on_ended(&self, handle: AdHandle);
    fn on_error(&self, handle: AdHandle);
    fn on_content_complete(&self);
}
