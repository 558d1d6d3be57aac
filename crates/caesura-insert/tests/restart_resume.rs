//! Persistence across a simulated process restart: a schedule with played
//! progress is snapshotted, restored verbatim, and the re-activated
//! coordinator does not replay the finished break.

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use caesura_insert::{
    AdHandle, AdInsertionCoordinator, AdLifecycleSink, AdRenderTarget, InsertConfig, PodInfo,
    PositionSnapshot,
};
use caesura_state::{AdState, StateStore};

#[derive(Default)]
struct NullSink;

impl AdLifecycleSink for NullSink {
    fn on_play(&self, _handle: AdHandle) {}
    fn on_pause(&self, _handle: AdHandle) {}
    fn on_resume(&self, _handle: AdHandle) {}
    fn on_ended(&self, _handle: AdHandle) {}
    fn on_error(&self, _handle: AdHandle) {}
    fn on_content_complete(&self) {}
}

#[derive(Default)]
struct RecordingRender {
    init: Mutex<Vec<Option<i64>>>,
}

impl AdRenderTarget for RecordingRender {
    fn request_ads(&self) {}
    fn init_rendering(&self, play_ads_after_us: Option<i64>) {
        self.init.lock().push(play_ads_after_us);
    }
    fn release(&self) {}
}

fn identity() -> caesura_core::StreamId {
    let content = Url::parse("https://cdn.example.com/feature.m3u8").unwrap();
    let tag = Url::parse("https://ads.example.com/vast?pod=1").unwrap();
    caesura_core::StreamId::from_urls(&content, &tag).unwrap()
}

fn coordinator(
    restored: Option<caesura_state::AdPlaybackState>,
) -> (AdInsertionCoordinator, Arc<RecordingRender>) {
    let render = Arc::new(RecordingRender::default());
    let coordinator = AdInsertionCoordinator::new(
        identity(),
        restored,
        InsertConfig::default(),
        Arc::clone(&render) as Arc<dyn AdRenderTarget>,
        Arc::new(NullSink) as Arc<dyn AdLifecycleSink>,
    );
    (coordinator, render)
}

const SECS: i64 = 1_000_000;

#[test]
fn played_progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ads.json");

    // First session: play the preroll to completion.
    let (first, _) = coordinator(None);
    first.on_ads_manager_loaded(&[0.0, 300.0]);
    first.on_position_changed(PositionSnapshot::content(0, Some(600 * SECS)));
    let handle = AdHandle(1);
    first.load_ad(
        handle,
        Url::parse("https://ads.example.com/creative.mp4").unwrap(),
        PodInfo {
            cue_time_secs: 0.0,
            ad_position: 1,
            total_ads: 1,
        },
    );
    first.play_ad(handle);
    first.stop_ad(handle);
    first.deactivate();

    let mut store = StateStore::new();
    store.insert(identity(), first.current_state());
    store.save_to(&path).unwrap();

    // Restart: the snapshot restores verbatim.
    let restored = StateStore::load_from(&path);
    let state = restored.get(&identity()).cloned().unwrap();
    assert_eq!(state, first.current_state());
    assert_eq!(state.group(0).unwrap().ads()[0], AdState::Played);

    // Second session resumes from the restored schedule: the fresh cue
    // points do not reset played progress, and rendering starts after the
    // finished break.
    let (second, render) = coordinator(Some(state));
    second.on_ads_manager_loaded(&[0.0, 300.0]);
    second.on_position_changed(PositionSnapshot::content(0, Some(600 * SECS)));

    let resumed = second.current_state();
    assert_eq!(resumed.group(0).unwrap().ads()[0], AdState::Played);
    assert!(resumed.group(1).unwrap().has_unplayed_ads());

    let init = render.init.lock().clone();
    assert_eq!(init.len(), 1);
    let boundary = init[0].expect("rendering starts after the finished preroll");
    assert!(boundary > 0 && boundary < 300 * SECS);
}
