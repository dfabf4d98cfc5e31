//! In-process peripheral host.
//!
//! Stands in for a platform radio stack: registrations land in memory and a
//! co-located "client" can drive the characteristics directly. Used by the
//! CLI foreground loop on hosts without a radio backend and by the
//! integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::advertisement::Advertisement;
use crate::error::HostError;
use crate::peripheral::{AdapterInfo, GattApplication, PeripheralHost};

#[derive(Debug, Default)]
struct LoopbackInner {
    powered: bool,
    application: Option<GattApplication>,
    advertisement: Option<Advertisement>,
    advertisement_registrations: u32,
}

/// Peripheral host keeping registrations in process memory.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHost {
    inner: Arc<RwLock<LoopbackInner>>,
}

impl LoopbackHost {
    /// Create an idle loopback host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive the control characteristic as a connected client would.
    pub async fn client_write(&self, value: &[u8]) -> Result<(), HostError> {
        let guard = self.inner.read().await;
        let app = guard.application.as_ref().ok_or(HostError::NotRegistered)?;
        app.control.write_value(value).await;
        Ok(())
    }

    /// Read the alert characteristic as a connected client would.
    pub async fn client_read(&self) -> Result<Vec<u8>, HostError> {
        let guard = self.inner.read().await;
        let app = guard.application.as_ref().ok_or(HostError::NotRegistered)?;
        Ok(app.alert.read_value().await)
    }

    /// Advertisement currently on the air, if any.
    pub async fn advertisement(&self) -> Option<Advertisement> {
        self.inner.read().await.advertisement.clone()
    }

    /// How many times an advertisement has been registered so far.
    pub async fn advertisement_registrations(&self) -> u32 {
        self.inner.read().await.advertisement_registrations
    }

    /// Whether the adapter has been powered on.
    pub async fn powered(&self) -> bool {
        self.inner.read().await.powered
    }
}

#[async_trait]
impl PeripheralHost for LoopbackHost {
    async fn discover_adapter(&self) -> Result<AdapterInfo, HostError> {
        Ok(AdapterInfo {
            id: "loopback0".to_string(),
        })
    }

    async fn set_powered(&self, _adapter: &AdapterInfo, powered: bool) -> Result<(), HostError> {
        self.inner.write().await.powered = powered;
        Ok(())
    }

    async fn register_application(
        &self,
        _adapter: &AdapterInfo,
        app: GattApplication,
    ) -> Result<(), HostError> {
        self.inner.write().await.application = Some(app);
        Ok(())
    }

    async fn unregister_application(&self, _adapter: &AdapterInfo) -> Result<(), HostError> {
        if self.inner.write().await.application.take().is_none() {
            return Err(HostError::NotRegistered);
        }
        Ok(())
    }

    async fn register_advertisement(
        &self,
        _adapter: &AdapterInfo,
        advertisement: Advertisement,
    ) -> Result<(), HostError> {
        let mut guard = self.inner.write().await;
        guard.advertisement = Some(advertisement);
        guard.advertisement_registrations += 1;
        Ok(())
    }

    async fn unregister_advertisement(&self, _adapter: &AdapterInfo) -> Result<(), HostError> {
        if self.inner.write().await.advertisement.take().is_none() {
            return Err(HostError::NotRegistered);
        }
        Ok(())
    }
}
