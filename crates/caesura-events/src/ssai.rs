#![forbid(unsafe_code)]

use caesura_state::AdPlaybackState;
use url::Url;

/// Server-side reconciliation events.
#[derive(Clone, Debug)]
pub enum SsaiEvent {
    /// A reconciled schedule was published to the player.
    StateChanged { state: AdPlaybackState },
    /// The late-event heuristic split a completed live break.
    GroupSplit { group_index: usize },
    /// The blocking resolve worker produced the stream manifest URI.
    StreamManifestResolved { uri: Url },
    /// The resolve worker timed out or the session reported an error.
    StreamManifestFailed { reason: String },
}
