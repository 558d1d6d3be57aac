#![forbid(unsafe_code)]

//! Immutable ad playback schedule.
//!
//! [`AdPlaybackState`] records where ad breaks sit on the content timeline
//! and how far each ad has progressed. All mutation is copy-on-write: every
//! `with_*` operation consumes the value and returns a new one, so a state
//! reference held across a callback boundary can never change underneath the
//! holder. Per-ad states are monotonic — once an ad is played, skipped, or
//! errored it never becomes playable again.

mod ad_state;
mod error;
mod group;
mod state;
mod store;

pub use ad_state::AdState;
pub use error::{StateError, StateResult, StoreError, StoreResult};
pub use group::AdGroup;
pub use state::{AdInfo, AdPlaybackState};
pub use store::StateStore;
