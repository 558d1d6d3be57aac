use url::Url;

/// One ad break boundary as advertised by the decisioning session:
/// start/end in seconds on the content timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CuePoint {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl CuePoint {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Per-ad metadata reported by the decisioning session as ads load/start.
#[derive(Clone, Debug, PartialEq)]
pub struct AdDescriptor {
    /// Ordinal of the break this ad belongs to; live sessions do not number
    /// their single open break.
    pub pod_index: Option<usize>,
    /// Break position in seconds; used to match against stored cue times.
    pub time_offset_secs: f64,
    /// 1-based position of this ad within the pod.
    pub position_in_pod: usize,
    /// Total ads in the pod as currently known.
    pub total_ads: usize,
    pub duration_secs: f64,
    /// Creative URI when the session exposes one; server-stitched sessions
    /// usually do not.
    pub media_uri: Option<Url>,
}
