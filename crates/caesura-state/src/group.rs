use serde::{Deserialize, Serialize};

use crate::AdState;

/// One ad break: a position on the content timeline plus the pod of ads
/// scheduled there.
///
/// The pod size may be unknown at first (cue point seen, pod not yet
/// resolved); `count` stays `None` until the SDK reports it. Entries only
/// ever grow — a pod never shrinks, it can only have entries marked failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdGroup {
    pub(crate) time_us: i64,
    pub(crate) count: Option<usize>,
    pub(crate) ads: Vec<AdState>,
    pub(crate) durations_us: Vec<i64>,
    pub(crate) is_server_side_inserted: bool,
    pub(crate) resume_position_us: i64,
}

impl AdGroup {
    pub(crate) fn new(time_us: i64) -> Self {
        Self {
            time_us,
            count: None,
            ads: Vec::new(),
            durations_us: Vec::new(),
            is_server_side_inserted: false,
            resume_position_us: 0,
        }
    }

    /// Placeholder group holding a single unresolved ad, used by server-side
    /// reconciliation before pod metadata arrives.
    pub(crate) fn placeholder(time_us: i64) -> Self {
        let mut group = Self::new(time_us);
        group.ads.push(AdState::Unavailable);
        group.durations_us.push(0);
        group.is_server_side_inserted = true;
        group
    }

    pub fn time_us(&self) -> i64 {
        self.time_us
    }

    /// Resolved pod size, `None` while unknown.
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn ads(&self) -> &[AdState] {
        &self.ads
    }

    pub fn ad(&self, ad_in_group: usize) -> Option<&AdState> {
        self.ads.get(ad_in_group)
    }

    pub fn durations_us(&self) -> &[i64] {
        &self.durations_us
    }

    pub fn is_server_side_inserted(&self) -> bool {
        self.is_server_side_inserted
    }

    pub fn resume_position_us(&self) -> i64 {
        self.resume_position_us
    }

    /// True while this break can still present at least one ad.
    ///
    /// An unresolved pod counts as unplayed: the break may still produce ads.
    pub fn has_unplayed_ads(&self) -> bool {
        self.count.is_none() || self.ads.iter().any(AdState::is_playable)
    }

    /// True once the pod is resolved and every ad is terminal.
    pub fn is_done(&self) -> bool {
        !self.has_unplayed_ads()
    }

    /// Index of the first ad that can still be presented.
    pub fn first_unplayed_index(&self) -> Option<usize> {
        self.ads.iter().position(AdState::is_playable)
    }

    pub(crate) fn grow_to(&mut self, count: usize) {
        while self.ads.len() < count {
            self.ads.push(AdState::Unavailable);
            self.durations_us.push(0);
        }
        self.count = Some(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_pod_counts_as_unplayed() {
        let group = AdGroup::new(0);
        assert!(group.has_unplayed_ads());
        assert!(!group.is_done());
        assert_eq!(group.first_unplayed_index(), None);
    }

    #[test]
    fn resolved_terminal_pod_is_done() {
        let mut group = AdGroup::new(0);
        group.grow_to(2);
        group.ads[0] = AdState::Played;
        group.ads[1] = AdState::Error;
        assert!(group.is_done());
        assert_eq!(group.first_unplayed_index(), None);
    }

    #[test]
    fn first_unplayed_skips_terminal_ads() {
        let mut group = AdGroup::new(0);
        group.grow_to(3);
        group.ads[0] = AdState::Played;
        assert_eq!(group.first_unplayed_index(), Some(1));
    }

    #[test]
    fn grow_keeps_existing_entries() {
        let mut group = AdGroup::new(0);
        group.grow_to(1);
        group.ads[0] = AdState::Played;
        group.grow_to(3);
        assert_eq!(group.ads.len(), 3);
        assert_eq!(group.ads[0], AdState::Played);
        assert_eq!(group.ads[2], AdState::Unavailable);
        assert_eq!(group.durations_us.len(), 3);
    }
}
