//! # AMBER Protocol
//!
//! Wire protocol for AMBER (Alert Metadata Broadcast over Emergency Radio).
//!
//! This crate provides:
//! - The alert record model with validation and canonical serialization
//! - Chunk splitting and self-describing frame encoding/decoding
//! - The 9-byte advertisement metadata summary and its legacy string hash
//! - Error types and handling
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       AlertRecord                               │
//! │   (validated domain object, canonical byte serialization)       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                         Frames                                  │
//! │   (indexed chunks of the serialization, 4-byte headers)         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                        Metadata                                 │
//! │   (9-byte out-of-band summary for scanning clients)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: no I/O, no async, deterministic output for
//! deterministic input. The receiving client reassembles frame payloads in
//! index order and parses the exact canonical byte stream, so determinism is
//! part of the wire contract.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alert;
pub mod error;
pub mod frame;
pub mod metadata;

pub use alert::{AlertBuilder, AlertRecord, Severity, generate_alert_id, now_epoch, parse_epoch};
pub use error::{FrameError, ProtocolError, ValidationError};
pub use frame::{Frame, build_frames, chunk_split, reassemble};
pub use metadata::{METADATA_LEN, legacy_string_hash, pack_metadata, severity_byte};

/// Primary GATT service UUID advertised by the broadcaster.
pub const SERVICE_UUID: &str = "0000AB10-0000-1000-8000-00805F9B34FB";

/// Read characteristic serving the currently selected frame.
pub const ALERT_CHAR_UUID: &str = "0000AB11-0000-1000-8000-00805F9B34FB";

/// Write characteristic selecting the chunk index.
pub const CONTROL_CHAR_UUID: &str = "0000AB12-0000-1000-8000-00805F9B34FB";

/// Company identifier keying the manufacturer-data slot of the advertisement.
pub const MANUFACTURER_ID: u16 = 0x1234;

/// Fixed frame header size in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Default max payload bytes per frame, sized for very small link-layer
/// packets.
pub const DEFAULT_CHUNK_SIZE: usize = 17;
