use serde::{Deserialize, Serialize};
use url::Url;

/// Playback state of a single ad within a pod.
///
/// States are monotonic: the three terminal states never transition back to
/// `Unavailable` or `Available`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdState {
    /// Cue point known, media not yet resolved.
    Unavailable,
    /// Media resolved; the URI may still be revised before playback.
    Available { uri: Url },
    Played,
    Skipped,
    Error,
}

impl AdState {
    /// True for `Played`, `Skipped`, and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdState::Played | AdState::Skipped | AdState::Error)
    }

    /// True when the ad can still be presented.
    pub fn is_playable(&self) -> bool {
        !self.is_terminal()
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            AdState::Unavailable => "unavailable",
            AdState::Available { .. } => "available",
            AdState::Played => "played",
            AdState::Skipped => "skipped",
            AdState::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!AdState::Unavailable.is_terminal());
        assert!(!AdState::Available {
            uri: Url::parse("https://ads.example.com/a.mp4").unwrap()
        }
        .is_terminal());
        assert!(AdState::Played.is_terminal());
        assert!(AdState::Skipped.is_terminal());
        assert!(AdState::Error.is_terminal());
    }
}
