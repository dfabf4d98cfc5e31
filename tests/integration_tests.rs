//! Integration tests for cross-crate interactions.
//!
//! Exercises the full delivery pipeline the way the mobile client sees it:
//! session start, advertisement scan, chunked fetch, reassembly, and reload
//! of a replaced current alert through the file-backed store.

use std::time::Duration;

use amber_gatt::{BroadcastSession, LoopbackHost, ReloadWatcher, SessionConfig};
use amber_integration_tests::{fetch_all, sample_record};
use amber_proto::{
    AlertRecord, DEFAULT_CHUNK_SIZE, Frame, METADATA_LEN, legacy_string_hash,
};
use amber_store::AlertStore;

// ============================================================================
// End-to-End Delivery
// ============================================================================

#[tokio::test]
async fn test_full_delivery_roundtrip() {
    let host = LoopbackHost::new();
    let session = BroadcastSession::start(host.clone(), sample_record())
        .await
        .unwrap();

    let bytes = fetch_all(&host).await.unwrap();
    let record = AlertRecord::from_json(&bytes).unwrap();
    assert_eq!(record, sample_record());

    session.stop().await;
}

#[tokio::test]
async fn test_frame_table_shape_matches_canonical_length() {
    let record = sample_record();
    let canonical = record.canonical_bytes().unwrap();
    let frames = amber_proto::build_frames(&record, DEFAULT_CHUNK_SIZE).unwrap();

    assert_eq!(frames.len(), canonical.len().div_ceil(DEFAULT_CHUNK_SIZE));
    for raw in &frames {
        let frame = Frame::parse(raw).unwrap();
        assert_eq!(frame.total() as usize, frames.len());
        assert!(frame.payload().len() <= DEFAULT_CHUNK_SIZE);
    }
}

#[tokio::test]
async fn test_delivery_with_single_byte_chunks() {
    let host = LoopbackHost::new();
    let config = SessionConfig {
        chunk_size: 1,
        ..SessionConfig::default()
    };
    let session = BroadcastSession::start_with_config(host.clone(), sample_record(), config)
        .await
        .unwrap();

    let bytes = fetch_all(&host).await.unwrap();
    assert_eq!(AlertRecord::from_json(&bytes).unwrap(), sample_record());

    session.stop().await;
}

// ============================================================================
// Advertisement Metadata
// ============================================================================

#[tokio::test]
async fn test_advertisement_metadata_on_air() {
    let host = LoopbackHost::new();
    let _session = BroadcastSession::start(host.clone(), sample_record())
        .await
        .unwrap();

    let adv = host.advertisement().await.unwrap();
    assert_eq!(adv.manufacturer_data.len(), METADATA_LEN);
    assert_eq!(adv.manufacturer_data[0], 3);
    assert_eq!(
        adv.manufacturer_data[1..5],
        (legacy_string_hash("abc12345") as u32).to_le_bytes()
    );
    assert_eq!(adv.manufacturer_data[5..9], 1735680000i32.to_be_bytes());
}

// ============================================================================
// Reload Semantics
// ============================================================================

#[tokio::test]
async fn test_adopt_mid_transfer_resets_selection() {
    let host = LoopbackHost::new();
    let session = BroadcastSession::start(host.clone(), sample_record())
        .await
        .unwrap();

    // Client is mid-transfer on chunk 2 when the alert is replaced.
    host.client_write(&2u16.to_be_bytes()).await.unwrap();

    let replacement = AlertRecord {
        headline: "Flood warning extended".to_string(),
        fetched_at: 1735690000,
        ..sample_record()
    };
    session.adopt(replacement.clone()).await.unwrap();

    // The very next read serves frame 0 of the new table.
    let frame = Frame::parse(&host.client_read().await.unwrap()).unwrap();
    assert_eq!(frame.index(), 0);
    assert_eq!(host.advertisement_registrations().await, 2);

    // A fresh fetch yields the replacement record.
    let bytes = fetch_all(&host).await.unwrap();
    assert_eq!(AlertRecord::from_json(&bytes).unwrap(), replacement);
}

#[tokio::test]
async fn test_watcher_reloads_published_alert_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = AlertStore::open(dir.path()).await.unwrap();
    store.upsert_alert(sample_record()).await.unwrap();
    store.publish("abc12345").await.unwrap();

    let host = LoopbackHost::new();
    let record = store.current_alert().await.unwrap().unwrap();
    let session = BroadcastSession::start(host.clone(), record).await.unwrap();

    let watcher = ReloadWatcher::new(store.clone(), Duration::from_millis(20));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let replacement = AlertRecord {
        headline: "Updated flood warning".to_string(),
        fetched_at: 1735690000,
        ..sample_record()
    };

    let driver = async {
        tokio::time::sleep(Duration::from_millis(60)).await;
        store.upsert_alert(replacement.clone()).await.unwrap();
        store.publish("abc12345").await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();
    };
    tokio::join!(watcher.run(&session, shutdown_rx), driver);

    let bytes = fetch_all(&host).await.unwrap();
    let adopted = AlertRecord::from_json(&bytes).unwrap();
    assert_eq!(adopted.headline, "Updated flood warning");

    // Scanners see the refreshed fetch time without connecting.
    let adv = host.advertisement().await.unwrap();
    assert_eq!(adv.manufacturer_data[5..9], 1735690000i32.to_be_bytes());

    session.stop().await;
}

// ============================================================================
// Degraded Paths
// ============================================================================

#[tokio::test]
async fn test_out_of_range_selection_reads_empty() {
    let host = LoopbackHost::new();
    let _session = BroadcastSession::start(host.clone(), sample_record())
        .await
        .unwrap();

    host.client_write(&u16::MAX.to_be_bytes()).await.unwrap();
    assert!(host.client_read().await.unwrap().is_empty());

    // Selecting back in range recovers without any reset.
    host.client_write(&0u16.to_be_bytes()).await.unwrap();
    assert!(!host.client_read().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_short_control_write_is_ignored() {
    let host = LoopbackHost::new();
    let _session = BroadcastSession::start(host.clone(), sample_record())
        .await
        .unwrap();

    host.client_write(&1u16.to_be_bytes()).await.unwrap();
    host.client_write(&[]).await.unwrap();
    host.client_write(&[0xFF]).await.unwrap();

    let frame = Frame::parse(&host.client_read().await.unwrap()).unwrap();
    assert_eq!(frame.index(), 1);
}
