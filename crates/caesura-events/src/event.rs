#![forbid(unsafe_code)]

use crate::{InsertEvent, SsaiEvent};

/// Unified event for the ad-insertion engine.
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug)]
pub enum Event {
    /// Client-side insertion coordinator event.
    Insert(InsertEvent),
    /// Server-side reconciliation event.
    Ssai(SsaiEvent),
}

impl From<InsertEvent> for Event {
    fn from(e: InsertEvent) -> Self {
        Self::Insert(e)
    }
}

impl From<SsaiEvent> for Event {
    fn from(e: SsaiEvent) -> Self {
        Self::Ssai(e)
    }
}
