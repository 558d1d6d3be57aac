#![forbid(unsafe_code)]

use caesura_state::AdPlaybackState;

/// How much of the schedule an ad load failure affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorScope {
    /// One break failed; the rest of the schedule is intact.
    AdGroup(usize),
    /// The whole ad session failed; content continues without ads.
    AllAds,
}

/// Client-side insertion coordinator events.
#[derive(Clone, Debug)]
pub enum InsertEvent {
    /// A mutation of the schedule was committed.
    StateChanged { state: AdPlaybackState },
    /// An ad load failed. Informational — content playback is unaffected.
    LoadError { scope: ErrorScope, reason: String },
    /// Content reached its end with no further breaks pending.
    ContentCompleted,
    /// UI pass-through signals; they never affect state.
    AdClicked,
    AdTapped,
}
