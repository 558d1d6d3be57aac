#![forbid(unsafe_code)]

mod canonicalization;
mod errors;
mod stream_id;
mod time;
mod timeline;

pub use canonicalization::{canonicalize_content_url, canonicalize_tag_url};
pub use errors::{CoreError, CoreResult};
pub use stream_id::StreamId;
pub use time::{
    cue_us_from_secs, secs_from_us, us_within_epsilon, CUE_MATCH_EPSILON_US, MICROS_PER_SECOND,
    TIME_END_OF_SOURCE,
};
pub use timeline::{PeriodInfo, PeriodPosition, Timeline};
