#![forbid(unsafe_code)]

//! Client-side ad insertion coordinator.
//!
//! [`AdInsertionCoordinator`] owns one [`caesura_state::AdPlaybackState`] and
//! reconciles three event streams into it: player position/timeline
//! snapshots, ad-SDK lifecycle callbacks, and progressively arriving cue
//! points. Ads are an enhancement to content — every failure path degrades to
//! "play content without further ads", never to a stall.

mod config;
mod coordinator;
mod error;
mod handle;
mod position;
mod sdk;

pub use config::InsertConfig;
pub use coordinator::AdInsertionCoordinator;
pub use error::{InsertError, InsertResult};
pub use handle::{AdHandle, HandleMap};
pub use position::{PositionSnapshot, Progress};
pub use sdk::{AdLifecycleSink, AdRenderTarget, PodInfo};
