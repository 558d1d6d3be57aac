#![forbid(unsafe_code)]

//! Server-side ad insertion reconciliation.
//!
//! With server-stitched streams the player never switches sources at break
//! boundaries — ad and content media arrive multiplexed in one stream. The
//! reconcilers here only keep the shared [`caesura_state::AdPlaybackState`]
//! accurate (for UI and analytics) by folding cue metadata and per-ad
//! lifecycle events from the stream-level decisioning session into it.

mod ad_event;
mod error;
mod live;
mod period_map;
mod resolve;
mod vod;

pub use ad_event::{AdDescriptor, CuePoint};
pub use error::{SsaiError, SsaiResult};
pub use live::LiveReconciler;
pub use period_map::{ad_group_for_window_position, period_relative_position};
pub use resolve::StreamManifestResolver;
pub use vod::VodReconciler;
