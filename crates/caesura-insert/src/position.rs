use caesura_state::AdInfo;

/// What the player reports on every discontinuity or timeline refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionSnapshot {
    /// Current position on the content timeline, microseconds.
    pub position_us: i64,
    /// Content duration, if known.
    pub content_duration_us: Option<i64>,
    /// The ad the player itself is presenting, if any.
    pub playing_ad: Option<AdInfo>,
}

impl PositionSnapshot {
    pub fn content(position_us: i64, content_duration_us: Option<i64>) -> Self {
        Self {
            position_us,
            content_duration_us,
            playing_ad: None,
        }
    }

    pub fn in_ad(position_us: i64, content_duration_us: Option<i64>, ad: AdInfo) -> Self {
        Self {
            position_us,
            content_duration_us,
            playing_ad: Some(ad),
        }
    }
}

/// A progress sample answered synchronously to the SDK.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub position_us: i64,
    pub duration_us: Option<i64>,
}
