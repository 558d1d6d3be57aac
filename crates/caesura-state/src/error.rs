use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("ad group {group} out of range ({groups} groups)")]
    GroupOutOfRange { group: usize, groups: usize },

    #[error("ad {ad_in_group} out of range in group {group} ({ads} ads)")]
    AdOutOfRange {
        group: usize,
        ad_in_group: usize,
        ads: usize,
    },

    #[error("invalid transition for ad {ad_in_group} in group {group}: {from} -> {to}")]
    InvalidTransition {
        group: usize,
        ad_in_group: usize,
        from: &'static str,
        to: &'static str,
    },

    #[error("ad count for group {group} cannot shrink from {have} to {requested}")]
    AdCountShrunk {
        group: usize,
        have: usize,
        requested: usize,
    },

    #[error("ad count for group {group} is already resolved")]
    AdCountFrozen { group: usize },

    #[error("ad group time {time_us}us already present")]
    DuplicateGroupTime { time_us: i64 },
}

pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
