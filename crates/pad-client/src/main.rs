//! Phonepad Link client entry point.
//!
//! Wires the gesture classifier, scroll momentum engine, pointer pump,
//! and app-sync session together over an in-memory loopback link, then
//! runs a short scripted exchange. The loopback "host" task decodes and
//! logs everything it receives; on real hardware the loopback is
//! replaced by a binding to the platform radio API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pad_client::application::app_sync::{AppRegistrySink, AppSyncSession};
use pad_client::application::{send_text, spawn_pointer_pump};
use pad_client::infrastructure::link::loopback::{LoopbackFrame, LoopbackLink};
use pad_client::infrastructure::link::PadLink;
use pad_client::infrastructure::storage::config::load_config;
use pad_core::{
    decode_trackpad_frame, encode_app_record, make_chunks, AppEntry, AppRecord, GestureClassifier,
    PointerSample, ScrollMomentumEngine, StreamIndexAllocator, TrackpadFrame,
};

/// Logs catalog changes as the demo host streams its app list.
struct LoggingSink;

impl AppRegistrySink for LoggingSink {
    fn app_added(&self, entry: &AppEntry) {
        info!(
            bundle = %entry.bundle_identifier,
            name = %entry.display_name,
            icon_bytes = entry.icon.len(),
            "catalog: app added"
        );
    }

    fn app_updated(&self, entry: &AppEntry) {
        info!(bundle = %entry.bundle_identifier, "catalog: app updated");
    }

    fn app_removed(&self, bundle_identifier: &str) {
        info!(bundle = bundle_identifier, "catalog: app removed");
    }
}

// Write size of a typical minimum-MTU BLE characteristic.
const DEMO_MAX_WRITE_LEN: usize = 23;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Phonepad Link client starting");

    let config = load_config()?;
    config.validate()?;
    info!(device_name = %config.client.device_name, "configuration loaded");

    let (link, mut host_rx) = LoopbackLink::new(DEMO_MAX_WRITE_LEN);
    let link: Arc<dyn PadLink> = Arc::new(link);

    // ── Demo host ─────────────────────────────────────────────────────────────
    // Consumes frames the client writes and logs what a real host would do.
    let host = tokio::spawn(async move {
        while let Some(LoopbackFrame { bytes, .. }) = host_rx.recv().await {
            match decode_trackpad_frame(&bytes) {
                Ok(TrackpadFrame { delta_x, delta_y, gesture }) => {
                    info!(?gesture, delta_x, delta_y, "host received pointer frame");
                }
                Err(_) if bytes.len() == 2 => {
                    info!(stream = bytes[0], chunk = bytes[1], "host received chunk ack");
                }
                Err(_) => {
                    info!(len = bytes.len(), "host received bulk frame");
                }
            }
        }
    });

    // ── Pointer pipeline ──────────────────────────────────────────────────────
    let (pump, pump_task) =
        spawn_pointer_pump(Arc::clone(&link), config.link.move_sends_per_second)?;

    // A tap: touch down, tiny motion, lift before the tap threshold.
    let mut classifier = GestureClassifier::new(config.gesture)?;
    let start = Instant::now();
    classifier.sample(PointerSample { x: 100.0, y: 100.0, at: start });
    classifier.sample(PointerSample { x: 100.5, y: 100.2, at: start + Duration::from_millis(40) });
    if let Some(event) = classifier.end(start + Duration::from_millis(90)) {
        pump.send(event);
    }

    // A drag: motion past the move threshold streams move events.
    let drag_start = Instant::now();
    classifier.sample(PointerSample { x: 0.0, y: 0.0, at: drag_start });
    for i in 1..=5 {
        let sample = PointerSample {
            x: i as f32 * 4.0,
            y: i as f32 * 3.0,
            at: drag_start + Duration::from_millis(i * 16),
        };
        if let Some(event) = classifier.sample(sample) {
            pump.send(event);
        }
    }
    let _ = classifier.end(drag_start + Duration::from_millis(120));

    // A flick scroll: drag samples, release, then momentum decay ticks.
    let mut momentum = ScrollMomentumEngine::new(config.scroll)?;
    let scroll_start = Instant::now();
    for i in 0..6 {
        let at = scroll_start + Duration::from_millis(i * 16);
        if let Some(event) = momentum.drag_sample(i as f32 * -8.0, at) {
            pump.send(event);
        }
    }
    if let Some(event) = momentum.end_drag() {
        pump.send(event);
    }
    let mut decay = tokio::time::interval(Duration::from_millis(16));
    while momentum.velocity() != 0.0 {
        decay.tick().await;
        if let Some(event) = momentum.tick() {
            pump.send(event);
        }
    }

    // ── Bulk transfer and app sync ────────────────────────────────────────────
    let allocator = StreamIndexAllocator::new();
    send_text(link.as_ref(), &allocator, "hello from the pad").await?;

    let mut session = AppSyncSession::new(Arc::clone(&link), Arc::new(LoggingSink));
    session.request_sync().await?;

    // Simulate the host's reply: two app records arriving chunk by chunk.
    let records = [
        AppRecord {
            bundle_identifier: "com.apple.Safari".to_string(),
            display_name: "Safari".to_string(),
            icon: vec![0x42; 64],
            removed: false,
        },
        AppRecord {
            bundle_identifier: "com.apple.Music".to_string(),
            display_name: "Music".to_string(),
            icon: vec![0x17; 64],
            removed: false,
        },
    ];
    for (i, record) in records.iter().enumerate() {
        let chunks = make_chunks(i as u8, &encode_app_record(record), DEMO_MAX_WRITE_LEN)?;
        for chunk in &chunks {
            session.handle_notification(&chunk.to_bytes()).await;
        }
    }
    info!(apps = session.directory().len(), "app catalog synchronized");

    // ── Shutdown ──────────────────────────────────────────────────────────────
    drop(pump);
    if let Err(e) = pump_task.await {
        warn!("pointer pump task failed: {e}");
    }
    drop(link);
    drop(session);
    host.await.ok();

    info!("Phonepad Link client stopped");
    Ok(())
}
