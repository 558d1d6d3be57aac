use thiserror::Error;

use caesura_state::StateError;

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("schedule error: {0}")]
    State(#[from] StateError),

    #[error("no ad schedule loaded")]
    NoSchedule,
}

pub type InsertResult<T> = Result<T, InsertError>;
