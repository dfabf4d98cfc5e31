//! Broadcast session lifecycle.
//!
//! The session owns the peripheral-host registrations and the shared
//! transfer state: start registers everything, adopt swaps the alert and
//! refreshes the advertisement, stop withdraws best-effort.

use std::time::Duration;

use amber_proto::{AlertRecord, DEFAULT_CHUNK_SIZE};

use crate::advertisement::Advertisement;
use crate::error::SessionError;
use crate::peripheral::{AdapterInfo, GattApplication, PeripheralHost};
use crate::state::{SharedState, TransferState};

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Max payload bytes per frame.
    pub chunk_size: usize,
    /// Local name included in the advertisement.
    pub local_name: String,
    /// Pause between advertisement withdraw and republish.
    ///
    /// Back-to-back unregister/register races some radio stacks; the pair
    /// must go out strictly in order with a short settle in between.
    pub readvertise_pause: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            local_name: "Amber".to_string(),
            readvertise_pause: Duration::from_millis(50),
        }
    }
}

/// An active broadcasting session over one adapter.
#[derive(Debug)]
pub struct BroadcastSession<H: PeripheralHost> {
    host: H,
    adapter: AdapterInfo,
    state: SharedState,
    config: SessionConfig,
}

impl<H: PeripheralHost> BroadcastSession<H> {
    /// Start broadcasting `record` with the default configuration.
    pub async fn start(host: H, record: AlertRecord) -> Result<Self, SessionError> {
        Self::start_with_config(host, record, SessionConfig::default()).await
    }

    /// Start broadcasting `record`.
    ///
    /// Discovers a capable adapter, powers it on, registers the GATT
    /// application and puts the initial advertisement on the air.
    pub async fn start_with_config(
        host: H,
        record: AlertRecord,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let state = SharedState::new(TransferState::new(record.clone(), config.chunk_size)?);

        let adapter = host.discover_adapter().await?;
        host.set_powered(&adapter, true).await?;
        host.register_application(&adapter, GattApplication::new(state.clone()))
            .await?;
        host.register_advertisement(&adapter, Advertisement::for_record(&record, &config.local_name))
            .await?;

        let session = Self {
            host,
            adapter,
            state,
            config,
        };
        tracing::info!(
            "broadcast started adapter={} alert={} headline={} chunks={}",
            session.adapter.id,
            record.alert_id,
            record.headline,
            session.state.total_frames().await
        );
        Ok(session)
    }

    /// Adopt a replacement record and refresh the advertisement.
    ///
    /// The state swap is atomic; the advertisement withdraw/republish pair
    /// is not, leaving a brief bounded gap with nothing on the air.
    pub async fn adopt(&self, record: AlertRecord) -> Result<(), SessionError> {
        self.state.adopt(record.clone()).await?;
        tracing::info!(
            "adopted alert={} severity={} chunks={}",
            record.alert_id,
            record.severity,
            self.state.total_frames().await
        );

        self.host.unregister_advertisement(&self.adapter).await?;
        tokio::time::sleep(self.config.readvertise_pause).await;
        self.host
            .register_advertisement(
                &self.adapter,
                Advertisement::for_record(&record, &self.config.local_name),
            )
            .await?;
        tracing::info!("advertisement metadata refreshed for alert={}", record.alert_id);
        Ok(())
    }

    /// Withdraw from the air, best-effort.
    ///
    /// Each failure is logged and swallowed: partial teardown must never
    /// block process exit.
    pub async fn stop(&self) {
        if let Err(e) = self.host.unregister_advertisement(&self.adapter).await {
            tracing::warn!("unregister advertisement failed: {}", e);
        }
        if let Err(e) = self.host.unregister_application(&self.adapter).await {
            tracing::warn!("unregister application failed: {}", e);
        }
        tracing::info!("broadcast stopped");
    }

    /// Handle to the shared transfer state.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }
}
