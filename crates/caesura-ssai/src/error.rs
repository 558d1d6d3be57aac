use thiserror::Error;

use caesura_state::StateError;

#[derive(Debug, Error)]
pub enum SsaiError {
    #[error("schedule error: {0}")]
    State(#[from] StateError),

    #[error("ad event matches no known break (time offset {time_offset_secs}s)")]
    UnknownBreak { time_offset_secs: f64 },

    #[error("stream manifest was not resolved in time")]
    ResolveTimeout,

    #[error("stream session failed: {0}")]
    Session(String),

    #[error("resolve cancelled")]
    Cancelled,
}

pub type SsaiResult<T> = Result<T, SsaiError>;
