//! Window-to-period remapping for multi-period live windows.
//!
//! Ad group and ad indices are period-relative, but event positions arrive
//! in window coordinates. These helpers are pure: they re-derive the mapping
//! from the current [`Timeline`] on every call, so a discontinuity only
//! needs a fresh `Timeline` — there is no cached mapping to invalidate.

use caesura_core::{PeriodPosition, Timeline};
use caesura_state::AdPlaybackState;

/// Period-relative position for a window position, derived from the current
/// timeline.
pub fn period_relative_position(
    timeline: &Timeline,
    window_position_us: i64,
) -> Option<PeriodPosition> {
    timeline.locate(window_position_us)
}

/// The ad group covering a window position, after remapping the position
/// into its period.
pub fn ad_group_for_window_position(
    state: &AdPlaybackState,
    timeline: &Timeline,
    window_position_us: i64,
) -> Option<usize> {
    let period = timeline.locate(window_position_us)?;
    state.ad_group_index_for_position(period.position_in_period_us, state.content_duration_us())
}
