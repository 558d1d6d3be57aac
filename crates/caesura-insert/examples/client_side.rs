//! Scripted walk through a client-stitched session: one preroll pod of two
//! ads, loaded, played, and committed to the schedule.
//!
//! Run with `RUST_LOG=caesura_insert=debug cargo run --example client_side`.

use std::sync::Arc;

use url::Url;

use caesura_core::StreamId;
use caesura_insert::{
    AdHandle, AdInsertionCoordinator, AdLifecycleSink, AdRenderTarget, InsertConfig, PodInfo,
    PositionSnapshot, Progress,
};
use caesura_state::AdInfo;

struct LoggingRender;

impl AdRenderTarget for LoggingRender {
    fn request_ads(&self) {
        println!("sdk <- request ads");
    }
    fn init_rendering(&self, play_ads_after_us: Option<i64>) {
        println!("sdk <- init rendering, play ads after {play_ads_after_us:?}");
    }
    fn release(&self) {
        println!("sdk <- release");
    }
}

struct LoggingSink;

impl AdLifecycleSink for LoggingSink {
    fn on_play(&self, handle: AdHandle) {
        println!("sdk <- play {handle:?}");
    }
    fn on_pause(&self, handle: AdHandle) {
        println!("sdk <- pause {handle:?}");
    }
    fn on_resume(&self, handle: AdHandle) {
        println!("sdk <- resume {handle:?}");
    }
    fn on_ended(&self, handle: AdHandle) {
        println!("sdk <- ended {handle:?}");
    }
    fn on_error(&self, handle: AdHandle) {
        println!("sdk <- error {handle:?}");
    }
    fn on_content_complete(&self) {
        println!("sdk <- content complete");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caesura_insert=debug".into()),
        )
        .init();

    let content = Url::parse("https://cdn.example.com/feature.m3u8")?;
    let tag = Url::parse("https://ads.example.com/vast?pod=demo")?;
    let identity = StreamId::from_urls(&content, &tag)?;

    let coordinator = AdInsertionCoordinator::new(
        identity,
        None,
        InsertConfig::default(),
        Arc::new(LoggingRender),
        Arc::new(LoggingSink),
    );

    const SECS: i64 = 1_000_000;

    // The SDK answers the ad request with one preroll cue.
    coordinator.start();
    coordinator.on_ads_manager_loaded(&[0.0]);
    coordinator.on_position_changed(PositionSnapshot::content(0, Some(600 * SECS)));

    // The pod resolves two ads.
    for position in 1..=2usize {
        coordinator.load_ad(
            AdHandle(position as u64),
            Url::parse(&format!("https://ads.example.com/creative-{position}.mp4"))?,
            PodInfo {
                cue_time_secs: 0.0,
                ad_position: position,
                total_ads: 2,
            },
        );
    }

    // Both ads play through.
    for position in 1..=2u64 {
        let handle = AdHandle(position);
        coordinator.on_position_changed(PositionSnapshot::in_ad(
            0,
            Some(600 * SECS),
            AdInfo::new(0, (position - 1) as usize),
        ));
        coordinator.play_ad(handle);
        coordinator.on_ad_progress(Progress {
            position_us: 10 * SECS,
            duration_us: Some(10 * SECS),
        });
        coordinator.on_ad_media_ended();
        coordinator.stop_ad(handle);
    }

    println!(
        "final schedule: {}",
        serde_json::to_string_pretty(&coordinator.current_state())?
    );
    Ok(())
}
