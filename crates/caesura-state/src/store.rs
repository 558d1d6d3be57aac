use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use caesura_core::StreamId;

use crate::{AdPlaybackState, StoreResult};

/// Minimal persisted representation of the state store.
///
/// Kept private so the on-disk JSON schema stays an implementation detail of
/// this crate. Entries are stored as a list for stable JSON output.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
struct StateStoreFile {
    version: u32,
    entries: Vec<StateStoreEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StateStoreEntry {
    stream_id: StreamId,
    state: AdPlaybackState,
}

/// Map from stream identity to its last committed [`AdPlaybackState`],
/// snapshotable across process restarts.
///
/// Loading is best-effort: empty, missing, or invalid bytes produce an empty
/// store. Saving writes the whole object through a temp file + rename so a
/// crash never leaves a half-written snapshot behind.
#[derive(Debug, Default)]
pub struct StateStore {
    states: HashMap<StreamId, AdPlaybackState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, stream_id: &StreamId) -> Option<&AdPlaybackState> {
        self.states.get(stream_id)
    }

    pub fn insert(&mut self, stream_id: StreamId, state: AdPlaybackState) {
        self.states.insert(stream_id, state);
    }

    pub fn remove(&mut self, stream_id: &StreamId) -> Option<AdPlaybackState> {
        self.states.remove(stream_id)
    }

    /// Serialize the full store.
    pub fn snapshot(&self) -> StoreResult<Vec<u8>> {
        let mut entries: Vec<StateStoreEntry> = self
            .states
            .iter()
            .map(|(stream_id, state)| StateStoreEntry {
                stream_id: *stream_id,
                state: state.clone(),
            })
            .collect();
        // Stable output for diffable snapshots.
        entries.sort_by_key(|e| e.stream_id);
        let file = StateStoreFile {
            version: 1,
            entries,
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    /// Rebuild a store from snapshot bytes.
    ///
    /// Empty or invalid input yields an empty store; persisted ad state is an
    /// enhancement, never a reason to fail playback.
    pub fn restore(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::new();
        }
        let file: StateStoreFile = match serde_json::from_slice(bytes) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "discarding unreadable state store snapshot");
                return Self::new();
            }
        };
        let states = file
            .entries
            .into_iter()
            .map(|e| (e.stream_id, e.state))
            .collect();
        Self { states }
    }

    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        let bytes = self.snapshot()?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, path)?;
        debug!(path = %path.display(), entries = self.states.len(), "state store saved");
        Ok(())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::restore(&bytes),
            Err(_) => Self::new(),
        }
    }
}
