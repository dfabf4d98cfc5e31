//! Abstract peripheral-host collaborator.
//!
//! Registering as a radio peripheral (adapter discovery, power control,
//! application and advertisement registration) belongs to the platform radio
//! stack. This module pins down the operations the broadcast session needs
//! from it; a concrete backend implements [`PeripheralHost`] against the
//! real stack, and [`crate::loopback::LoopbackHost`] implements it in
//! process.

use async_trait::async_trait;

use amber_proto::{ALERT_CHAR_UUID, CONTROL_CHAR_UUID, SERVICE_UUID};

use crate::advertisement::Advertisement;
use crate::characteristic::{AlertCharacteristic, ControlCharacteristic};
use crate::error::HostError;
use crate::state::SharedState;

/// Identifies one radio adapter on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// Host-specific adapter identifier (e.g. `hci0`).
    pub id: String,
}

/// The GATT application registered with the host: one primary service
/// exposing the alert (read) and control (write) characteristics, both wired
/// to one shared transfer state.
#[derive(Debug, Clone)]
pub struct GattApplication {
    /// Primary service UUID.
    pub service_uuid: String,
    /// Read characteristic UUID.
    pub alert_uuid: String,
    /// Write characteristic UUID.
    pub control_uuid: String,
    /// Read handler.
    pub alert: AlertCharacteristic,
    /// Write handler.
    pub control: ControlCharacteristic,
}

impl GattApplication {
    /// Wire both characteristics to `state`.
    pub fn new(state: SharedState) -> Self {
        Self {
            service_uuid: SERVICE_UUID.to_string(),
            alert_uuid: ALERT_CHAR_UUID.to_string(),
            control_uuid: CONTROL_CHAR_UUID.to_string(),
            alert: AlertCharacteristic::new(state.clone()),
            control: ControlCharacteristic::new(state),
        }
    }
}

/// Operations the broadcast session requires from the platform radio stack.
#[async_trait]
pub trait PeripheralHost: Send + Sync {
    /// First adapter offering both GATT server and advertising capability.
    async fn discover_adapter(&self) -> Result<AdapterInfo, HostError>;

    /// Power the adapter on or off.
    async fn set_powered(&self, adapter: &AdapterInfo, powered: bool) -> Result<(), HostError>;

    /// Register the GATT application on the adapter.
    async fn register_application(
        &self,
        adapter: &AdapterInfo,
        app: GattApplication,
    ) -> Result<(), HostError>;

    /// Unregister the GATT application.
    async fn unregister_application(&self, adapter: &AdapterInfo) -> Result<(), HostError>;

    /// Register (or re-register) the advertisement.
    async fn register_advertisement(
        &self,
        adapter: &AdapterInfo,
        advertisement: Advertisement,
    ) -> Result<(), HostError>;

    /// Withdraw the advertisement.
    async fn unregister_advertisement(&self, adapter: &AdapterInfo) -> Result<(), HostError>;
}
