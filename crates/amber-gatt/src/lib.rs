//! # AMBER GATT
//!
//! The broadcasting session for the AMBER protocol: the shared transfer
//! state behind the single "currently selected chunk", the two attribute
//! handlers mapped onto it, advertisement construction and refresh, the
//! abstract peripheral-host and alert-catalogue collaborators, and the
//! reload watcher that keeps the broadcast in step with the published alert.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      BroadcastSession                           │
//! │   (adapter lifecycle, registration, adopt, best-effort stop)    │
//! ├────────────────────────────┬────────────────────────────────────┤
//! │   AlertCharacteristic      │      ControlCharacteristic         │
//! │   (read: current frame)    │      (write: select index)         │
//! ├────────────────────────────┴────────────────────────────────────┤
//! │                        SharedState                              │
//! │   (one record + frame table + selected index, one lock)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The radio stack itself is a collaborator behind [`PeripheralHost`];
//! [`LoopbackHost`] implements it in process for development and tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod advertisement;
pub mod catalogue;
pub mod characteristic;
pub mod error;
pub mod loopback;
pub mod peripheral;
pub mod session;
pub mod state;
pub mod watcher;

pub use advertisement::Advertisement;
pub use catalogue::AlertCatalogue;
pub use characteristic::{AlertCharacteristic, ControlCharacteristic};
pub use error::{CatalogueError, HostError, SessionError};
pub use loopback::LoopbackHost;
pub use peripheral::{AdapterInfo, GattApplication, PeripheralHost};
pub use session::{BroadcastSession, SessionConfig};
pub use state::{SharedState, TransferState};
pub use watcher::ReloadWatcher;
