use serde::{Deserialize, Serialize};
use url::Url;

use caesura_core::{us_within_epsilon, StreamId, TIME_END_OF_SOURCE};

use crate::{AdGroup, AdState, StateError, StateResult};

/// Correlation key for one ad inside one break. Transient — never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdInfo {
    pub ad_group_index: usize,
    pub ad_index_in_ad_group: usize,
}

impl AdInfo {
    pub fn new(ad_group_index: usize, ad_index_in_ad_group: usize) -> Self {
        Self {
            ad_group_index,
            ad_index_in_ad_group,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Target {
    Played,
    Skipped,
    Error,
}

impl Target {
    fn name(self) -> &'static str {
        match self {
            Target::Played => "played",
            Target::Skipped => "skipped",
            Target::Error => "error",
        }
    }

    fn state(self) -> AdState {
        match self {
            Target::Played => AdState::Played,
            Target::Skipped => AdState::Skipped,
            Target::Error => AdState::Error,
        }
    }
}

/// The full ad schedule for one content stream.
///
/// Groups are ordered by `time_us` ascending, with the postroll sentinel
/// (if present) always last; group times are unique. The value is immutable —
/// every mutator consumes `self` and returns a new state.
///
/// [`AdPlaybackState::NONE`] ("no ads known yet") is distinguishable from a
/// state whose identity is known but whose schedule resolved to zero groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdPlaybackState {
    identity: Option<StreamId>,
    content_duration_us: Option<i64>,
    groups: Vec<AdGroup>,
}

impl AdPlaybackState {
    /// "No ads known yet."
    pub const NONE: AdPlaybackState = AdPlaybackState {
        identity: None,
        content_duration_us: None,
        groups: Vec::new(),
    };

    /// Schedule for `identity` with breaks at the given microsecond times.
    ///
    /// Times are sorted (sentinel last) and must be unique.
    pub fn new(
        identity: StreamId,
        cue_times_us: impl IntoIterator<Item = i64>,
    ) -> StateResult<Self> {
        let mut state = AdPlaybackState {
            identity: Some(identity),
            content_duration_us: None,
            groups: Vec::new(),
        };
        for time_us in cue_times_us {
            state = state.with_new_ad_group(time_us)?;
        }
        Ok(state)
    }

    pub fn is_none(&self) -> bool {
        self.identity.is_none()
    }

    pub fn identity(&self) -> Option<StreamId> {
        self.identity
    }

    pub fn content_duration_us(&self) -> Option<i64> {
        self.content_duration_us
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, index: usize) -> Option<&AdGroup> {
        self.groups.get(index)
    }

    pub fn groups(&self) -> &[AdGroup] {
        &self.groups
    }

    pub fn ad(&self, info: AdInfo) -> Option<&AdState> {
        self.groups
            .get(info.ad_group_index)
            .and_then(|g| g.ad(info.ad_index_in_ad_group))
    }

    // -- Queries ------------------------------------------------------------------

    /// Index of the last group at/before `position_us` that can still present
    /// an ad. The postroll only matches at/after the content duration.
    pub fn ad_group_index_for_position(
        &self,
        position_us: i64,
        content_duration_us: Option<i64>,
    ) -> Option<usize> {
        self.groups.iter().enumerate().rev().find_map(|(i, g)| {
            let reached = if g.time_us == TIME_END_OF_SOURCE {
                matches!(content_duration_us, Some(d) if position_us >= d)
            } else {
                g.time_us <= position_us
            };
            (reached && g.has_unplayed_ads()).then_some(i)
        })
    }

    /// Index of the first group strictly after `position_us` that can still
    /// present an ad — the forward lookup used for preloading. The postroll
    /// qualifies while the position is before the content end (or while the
    /// duration is unknown).
    pub fn ad_group_index_after_position(
        &self,
        position_us: i64,
        content_duration_us: Option<i64>,
    ) -> Option<usize> {
        self.groups.iter().enumerate().find_map(|(i, g)| {
            let upcoming = if g.time_us == TIME_END_OF_SOURCE {
                content_duration_us.is_none_or(|d| position_us < d)
            } else {
                g.time_us > position_us
            };
            (upcoming && g.has_unplayed_ads()).then_some(i)
        })
    }

    /// Match an SDK-reported cue time against stored group times: nearest
    /// group within `epsilon_us`. The sentinel only matches exactly.
    ///
    /// Cues arrive as rounded floating-point seconds while stored times carry
    /// microsecond precision, so exact equality is the exception.
    pub fn ad_group_index_for_cue_us(&self, cue_us: i64, epsilon_us: i64) -> Option<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| us_within_epsilon(g.time_us, cue_us, epsilon_us))
            .min_by_key(|(_, g)| {
                if g.time_us == TIME_END_OF_SOURCE {
                    0
                } else {
                    g.time_us.abs_diff(cue_us)
                }
            })
            .map(|(i, _)| i)
    }

    // -- Mutators -----------------------------------------------------------------

    /// Insert a new, empty ad group at `time_us`, keeping groups ordered
    /// (sentinel last) and times unique.
    #[must_use = "mutators return a new state"]
    pub fn with_new_ad_group(mut self, time_us: i64) -> StateResult<Self> {
        if self.groups.iter().any(|g| g.time_us == time_us) {
            return Err(StateError::DuplicateGroupTime { time_us });
        }
        let index = self
            .groups
            .iter()
            .position(|g| Self::sort_key(g.time_us) > Self::sort_key(time_us))
            .unwrap_or(self.groups.len());
        self.groups.insert(index, AdGroup::new(time_us));
        Ok(self)
    }

    /// Insert a server-side placeholder group: one unresolved ad, pod size
    /// unknown.
    #[must_use = "mutators return a new state"]
    pub fn with_placeholder_ad_group(mut self, time_us: i64) -> StateResult<Self> {
        if self.groups.iter().any(|g| g.time_us == time_us) {
            return Err(StateError::DuplicateGroupTime { time_us });
        }
        let index = self
            .groups
            .iter()
            .position(|g| Self::sort_key(g.time_us) > Self::sort_key(time_us))
            .unwrap_or(self.groups.len());
        self.groups.insert(index, AdGroup::placeholder(time_us));
        Ok(self)
    }

    /// Resolve (or grow) the pod size of a group. Shrinking is never allowed,
    /// and a fully terminal group no longer accepts growth.
    #[must_use = "mutators return a new state"]
    pub fn with_ad_count(mut self, group: usize, count: usize) -> StateResult<Self> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get_mut(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        if g.is_done() {
            return Err(StateError::AdCountFrozen { group });
        }
        if count < g.ads.len() || g.count.is_some_and(|have| count < have) {
            return Err(StateError::AdCountShrunk {
                group,
                have: g.count.unwrap_or(g.ads.len()),
                requested: count,
            });
        }
        g.grow_to(count);
        Ok(self)
    }

    /// Append one unresolved ad to an open pod (`count` still unknown). Used
    /// by live reconciliation, where the pod never closes.
    #[must_use = "mutators return a new state"]
    pub fn with_appended_ad(mut self, group: usize) -> StateResult<Self> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get_mut(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        if g.count.is_some() {
            return Err(StateError::AdCountFrozen { group });
        }
        g.ads.push(AdState::Unavailable);
        g.durations_us.push(0);
        Ok(self)
    }

    /// Record (or revise) the resolved media URI of an ad.
    #[must_use = "mutators return a new state"]
    pub fn with_available_ad_uri(
        mut self,
        group: usize,
        ad_in_group: usize,
        uri: Url,
    ) -> StateResult<Self> {
        let current = self.checked_ad(group, ad_in_group)?;
        if current.is_terminal() {
            return Err(StateError::InvalidTransition {
                group,
                ad_in_group,
                from: current.name(),
                to: "available",
            });
        }
        self.groups[group].ads[ad_in_group] = AdState::Available { uri };
        Ok(self)
    }

    #[must_use = "mutators return a new state"]
    pub fn with_played_ad(self, group: usize, ad_in_group: usize) -> StateResult<Self> {
        self.with_transition(group, ad_in_group, Target::Played)
    }

    #[must_use = "mutators return a new state"]
    pub fn with_skipped_ad(self, group: usize, ad_in_group: usize) -> StateResult<Self> {
        self.with_transition(group, ad_in_group, Target::Skipped)
    }

    #[must_use = "mutators return a new state"]
    pub fn with_error_ad(self, group: usize, ad_in_group: usize) -> StateResult<Self> {
        self.with_transition(group, ad_in_group, Target::Error)
    }

    /// Skip every still-playable ad in the group and resolve its pod size.
    /// Idempotent.
    #[must_use = "mutators return a new state"]
    pub fn with_skipped_ad_group(mut self, group: usize) -> StateResult<Self> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get_mut(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        for ad in &mut g.ads {
            if ad.is_playable() {
                *ad = AdState::Skipped;
            }
        }
        g.count = Some(g.ads.len());
        Ok(self)
    }

    /// A break-level load failure: every still-unresolved ad in the group
    /// becomes `Error`. Ads whose media already resolved are untouched.
    ///
    /// A group whose pod never resolved at all is grown to a single entry
    /// first, so the failure is visible in the schedule.
    #[must_use = "mutators return a new state"]
    pub fn with_ad_load_error(mut self, group: usize) -> StateResult<Self> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get_mut(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        if g.count.is_none() && g.ads.is_empty() {
            g.grow_to(1);
        }
        for ad in &mut g.ads {
            if matches!(ad, AdState::Unavailable) {
                *ad = AdState::Error;
            }
        }
        g.count = Some(g.ads.len());
        Ok(self)
    }

    /// Skip every still-playable ad in every group. The all-ads failure path.
    #[must_use = "mutators return a new state"]
    pub fn with_all_ads_skipped(mut self) -> Self {
        for group in &mut self.groups {
            for ad in &mut group.ads {
                if ad.is_playable() {
                    *ad = AdState::Skipped;
                }
            }
            group.count = Some(group.ads.len());
        }
        self
    }

    #[must_use = "mutators return a new state"]
    pub fn with_ad_duration_us(
        mut self,
        group: usize,
        ad_in_group: usize,
        duration_us: i64,
    ) -> StateResult<Self> {
        self.checked_ad(group, ad_in_group)?;
        self.groups[group].durations_us[ad_in_group] = duration_us;
        Ok(self)
    }

    /// Offset into the current ad at which playback should resume after the
    /// coordinator is torn down mid-break.
    #[must_use = "mutators return a new state"]
    pub fn with_ad_resume_position_us(
        mut self,
        group: usize,
        resume_position_us: i64,
    ) -> StateResult<Self> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get_mut(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        g.resume_position_us = resume_position_us;
        Ok(self)
    }

    #[must_use = "mutators return a new state"]
    pub fn with_content_duration_us(mut self, duration_us: i64) -> Self {
        self.content_duration_us = Some(duration_us);
        self
    }

    #[must_use = "mutators return a new state"]
    pub fn with_is_server_side_inserted(
        mut self,
        group: usize,
        is_server_side_inserted: bool,
    ) -> StateResult<Self> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get_mut(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        g.is_server_side_inserted = is_server_side_inserted;
        Ok(self)
    }

    /// Close a live (sentinel-anchored) group at `closed_time_us` and open a
    /// fresh sentinel group after it.
    ///
    /// The closed group keeps all its ads and has its pod size resolved; the
    /// new group starts empty with an open pod. This is the late-event split:
    /// ads discovered after a break completed must not be merged into it.
    #[must_use = "mutators return a new state"]
    pub fn with_split_live_ad_group(
        mut self,
        group: usize,
        closed_time_us: i64,
    ) -> StateResult<Self> {
        let groups = self.groups.len();
        {
            let g = self
                .groups
                .get(group)
                .ok_or(StateError::GroupOutOfRange { group, groups })?;
            if g.time_us != TIME_END_OF_SOURCE || closed_time_us == TIME_END_OF_SOURCE {
                return Err(StateError::DuplicateGroupTime {
                    time_us: closed_time_us,
                });
            }
        }
        if self.groups.iter().any(|g| g.time_us == closed_time_us) {
            return Err(StateError::DuplicateGroupTime {
                time_us: closed_time_us,
            });
        }

        let open = AdGroup {
            time_us: TIME_END_OF_SOURCE,
            count: None,
            ads: Vec::new(),
            durations_us: Vec::new(),
            is_server_side_inserted: true,
            resume_position_us: 0,
        };
        let closed = &mut self.groups[group];
        closed.time_us = closed_time_us;
        closed.count = Some(closed.ads.len());
        self.groups.insert(group + 1, open);
        Ok(self)
    }

    // -- Internal -----------------------------------------------------------------

    fn sort_key(time_us: i64) -> (bool, i64) {
        (time_us == TIME_END_OF_SOURCE, time_us)
    }

    fn checked_ad(&self, group: usize, ad_in_group: usize) -> StateResult<&AdState> {
        let groups = self.groups.len();
        let g = self
            .groups
            .get(group)
            .ok_or(StateError::GroupOutOfRange { group, groups })?;
        g.ad(ad_in_group).ok_or(StateError::AdOutOfRange {
            group,
            ad_in_group,
            ads: g.ads.len(),
        })
    }

    fn with_transition(
        mut self,
        group: usize,
        ad_in_group: usize,
        target: Target,
    ) -> StateResult<Self> {
        let current = self.checked_ad(group, ad_in_group)?;
        if *current == target.state() {
            return Ok(self); // already there; no-op
        }
        if current.is_terminal() {
            return Err(StateError::InvalidTransition {
                group,
                ad_in_group,
                from: current.name(),
                to: target.name(),
            });
        }
        self.groups[group].ads[ad_in_group] = target.state();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn id() -> StreamId {
        let content = Url::parse("https://cdn.example.com/feature.m3u8").unwrap();
        let tag = Url::parse("https://ads.example.com/vast?pod=1").unwrap();
        StreamId::from_urls(&content, &tag).unwrap()
    }

    fn uri() -> Url {
        Url::parse("https://ads.example.com/creative.mp4").unwrap()
    }

    fn state_with_groups(times: &[i64]) -> AdPlaybackState {
        AdPlaybackState::new(id(), times.iter().copied()).unwrap()
    }

    #[test]
    fn none_is_distinguishable_from_empty_schedule() {
        let resolved_empty = state_with_groups(&[]);
        assert!(AdPlaybackState::NONE.is_none());
        assert!(!resolved_empty.is_none());
        assert_ne!(AdPlaybackState::NONE, resolved_empty);
    }

    #[test]
    fn groups_sorted_with_postroll_last() {
        let state = state_with_groups(&[50_000_000, TIME_END_OF_SOURCE, 0, 100_000_000]);
        let times: Vec<i64> = state.groups().iter().map(AdGroup::time_us).collect();
        assert_eq!(
            times,
            vec![0, 50_000_000, 100_000_000, TIME_END_OF_SOURCE]
        );
    }

    #[test]
    fn duplicate_group_time_rejected() {
        let result = state_with_groups(&[0]).with_new_ad_group(0);
        assert!(matches!(
            result,
            Err(StateError::DuplicateGroupTime { time_us: 0 })
        ));
    }

    #[test]
    fn pod_growth_from_unknown() {
        let state = state_with_groups(&[0])
            .with_ad_count(0, 3)
            .unwrap()
            .with_available_ad_uri(0, 0, uri())
            .unwrap();
        let group = state.group(0).unwrap();
        assert_eq!(group.count(), Some(3));
        assert_eq!(group.ads().len(), 3);
        assert!(matches!(group.ads()[0], AdState::Available { .. }));
        assert_eq!(group.ads()[1], AdState::Unavailable);
    }

    #[test]
    fn pod_never_shrinks() {
        let state = state_with_groups(&[0]).with_ad_count(0, 3).unwrap();
        assert!(matches!(
            state.with_ad_count(0, 2),
            Err(StateError::AdCountShrunk { .. })
        ));
    }

    #[test]
    fn terminal_group_freezes_pod_size() {
        let state = state_with_groups(&[0])
            .with_ad_count(0, 1)
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap();
        assert!(matches!(
            state.with_ad_count(0, 2),
            Err(StateError::AdCountFrozen { group: 0 })
        ));
    }

    #[rstest]
    #[case(AdState::Played)]
    #[case(AdState::Skipped)]
    #[case(AdState::Error)]
    fn terminal_states_are_monotonic(#[case] terminal: AdState) {
        let state = state_with_groups(&[0]).with_ad_count(0, 1).unwrap();
        let state = match terminal {
            AdState::Played => state.with_played_ad(0, 0),
            AdState::Skipped => state.with_skipped_ad(0, 0),
            _ => state.with_error_ad(0, 0),
        }
        .unwrap();

        // No way back to available.
        assert!(state
            .clone()
            .with_available_ad_uri(0, 0, uri())
            .is_err());

        // No sideways moves between distinct terminal states.
        let others: Vec<StateResult<AdPlaybackState>> = match terminal {
            AdState::Played => vec![
                state.clone().with_skipped_ad(0, 0),
                state.clone().with_error_ad(0, 0),
            ],
            AdState::Skipped => vec![
                state.clone().with_played_ad(0, 0),
                state.clone().with_error_ad(0, 0),
            ],
            _ => vec![
                state.clone().with_played_ad(0, 0),
                state.clone().with_skipped_ad(0, 0),
            ],
        };
        for result in others {
            assert!(matches!(
                result,
                Err(StateError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn played_is_idempotent() {
        let state = state_with_groups(&[0])
            .with_ad_count(0, 1)
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap();
        let again = state.clone().with_played_ad(0, 0).unwrap();
        assert_eq!(state, again);
    }

    #[test]
    fn skip_group_is_idempotent() {
        let state = state_with_groups(&[0, 10_000_000])
            .with_ad_count(0, 2)
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap();
        let once = state.with_skipped_ad_group(0).unwrap();
        let twice = once.clone().with_skipped_ad_group(0).unwrap();
        assert_eq!(once, twice);
        // The already-played ad is untouched.
        assert_eq!(once.group(0).unwrap().ads()[0], AdState::Played);
        assert_eq!(once.group(0).unwrap().ads()[1], AdState::Skipped);
    }

    #[test]
    fn load_error_on_unresolved_group_grows_one_errored_entry() {
        let state = state_with_groups(&[0]).with_ad_load_error(0).unwrap();
        let group = state.group(0).unwrap();
        assert_eq!(group.ads(), &[AdState::Error]);
        assert_eq!(group.count(), Some(1));
        assert!(group.is_done());
    }

    #[test]
    fn load_error_spares_resolved_ads() {
        let state = state_with_groups(&[0])
            .with_ad_count(0, 3)
            .unwrap()
            .with_available_ad_uri(0, 0, uri())
            .unwrap()
            .with_ad_load_error(0)
            .unwrap();
        let ads = state.group(0).unwrap().ads();
        assert!(matches!(ads[0], AdState::Available { .. }));
        assert_eq!(ads[1], AdState::Error);
        assert_eq!(ads[2], AdState::Error);
    }

    #[test]
    fn all_ads_skipped_resolves_every_group() {
        let state = state_with_groups(&[0, 10_000_000, TIME_END_OF_SOURCE])
            .with_ad_count(0, 1)
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap()
            .with_all_ads_skipped();
        assert_eq!(state.group(0).unwrap().ads()[0], AdState::Played);
        for group in state.groups() {
            assert!(group.is_done());
        }
    }

    // -- Position queries ---------------------------------------------------------

    #[test]
    fn group_for_position_picks_last_reached_with_unplayed_ads() {
        let state = state_with_groups(&[0, 10_000_000, 20_000_000])
            .with_ad_count(0, 1)
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap();
        // Group 0 is played out, so position 15s resolves to group 1.
        assert_eq!(
            state.ad_group_index_for_position(15_000_000, Some(60_000_000)),
            Some(1)
        );
        assert_eq!(
            state.ad_group_index_for_position(25_000_000, Some(60_000_000)),
            Some(2)
        );
    }

    #[test]
    fn group_for_position_ignores_future_groups() {
        let state = state_with_groups(&[10_000_000]);
        assert_eq!(
            state.ad_group_index_for_position(5_000_000, Some(60_000_000)),
            None
        );
    }

    #[test]
    fn postroll_matches_only_at_content_end() {
        let state = state_with_groups(&[TIME_END_OF_SOURCE]);
        assert_eq!(
            state.ad_group_index_for_position(59_000_000, Some(60_000_000)),
            None
        );
        assert_eq!(
            state.ad_group_index_for_position(60_000_000, Some(60_000_000)),
            Some(0)
        );
        // Unknown duration: the postroll is never "reached".
        assert_eq!(state.ad_group_index_for_position(60_000_000, None), None);
    }

    #[test]
    fn group_after_position_is_forward_lookup() {
        let state = state_with_groups(&[0, 10_000_000, TIME_END_OF_SOURCE]);
        assert_eq!(
            state.ad_group_index_after_position(0, Some(60_000_000)),
            Some(1)
        );
        assert_eq!(
            state.ad_group_index_after_position(10_000_000, Some(60_000_000)),
            Some(2)
        );
        // At the content end, nothing is ahead anymore.
        assert_eq!(
            state.ad_group_index_after_position(60_000_000, Some(60_000_000)),
            None
        );
    }

    #[test]
    fn group_after_position_skips_done_groups() {
        let state = state_with_groups(&[10_000_000, 20_000_000])
            .with_ad_count(0, 1)
            .unwrap()
            .with_skipped_ad(0, 0)
            .unwrap();
        assert_eq!(
            state.ad_group_index_after_position(0, Some(60_000_000)),
            Some(1)
        );
    }

    #[rstest]
    #[case(10_000_400, Some(0))] // within 1ms of the stored 10.0s group
    #[case(10_002_000, None)] // 2ms off: no match
    #[case(TIME_END_OF_SOURCE, Some(1))] // sentinel matches exactly
    fn cue_matching_with_epsilon(#[case] cue_us: i64, #[case] expected: Option<usize>) {
        let state = state_with_groups(&[10_000_000, TIME_END_OF_SOURCE]);
        assert_eq!(state.ad_group_index_for_cue_us(cue_us, 1_000), expected);
    }

    #[test]
    fn cue_matching_picks_nearest_group() {
        let state = state_with_groups(&[10_000_000, 10_001_500]);
        assert_eq!(
            state.ad_group_index_for_cue_us(10_001_000, 1_000),
            Some(1)
        );
    }

    // -- Live split ---------------------------------------------------------------

    #[test]
    fn live_split_closes_group_and_opens_sentinel() {
        let state = state_with_groups(&[TIME_END_OF_SOURCE])
            .with_appended_ad(0)
            .unwrap()
            .with_appended_ad(0)
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap()
            .with_played_ad(0, 1)
            .unwrap()
            .with_split_live_ad_group(0, 30_000_000)
            .unwrap();

        assert_eq!(state.group_count(), 2);
        let closed = state.group(0).unwrap();
        assert_eq!(closed.time_us(), 30_000_000);
        assert_eq!(closed.count(), Some(2));
        assert!(closed.is_done());

        let open = state.group(1).unwrap();
        assert_eq!(open.time_us(), TIME_END_OF_SOURCE);
        assert_eq!(open.count(), None);
        assert!(open.ads().is_empty());
    }

    #[test]
    fn live_split_rejects_non_sentinel_group() {
        let state = state_with_groups(&[10_000_000]);
        assert!(state.with_split_live_ad_group(0, 5_000_000).is_err());
    }

    // -- Serialization ------------------------------------------------------------

    #[test]
    fn serde_round_trip_reproduces_equal_value() {
        let state = state_with_groups(&[0, 10_000_000, TIME_END_OF_SOURCE])
            .with_content_duration_us(600_000_000)
            .with_ad_count(0, 2)
            .unwrap()
            .with_available_ad_uri(0, 0, uri())
            .unwrap()
            .with_played_ad(0, 0)
            .unwrap()
            .with_skipped_ad_group(1)
            .unwrap()
            .with_ad_resume_position_us(2, 1_500_000)
            .unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let back: AdPlaybackState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn serde_round_trip_of_none() {
        let json = serde_json::to_string(&AdPlaybackState::NONE).unwrap();
        let back: AdPlaybackState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AdPlaybackState::NONE);
    }
}
