//! Error types for the broadcasting session.

use amber_proto::ProtocolError;
use thiserror::Error;

/// Radio-stack collaborator errors
#[derive(Debug, Error)]
pub enum HostError {
    /// No adapter offers both GATT server and advertising capability
    #[error("no adapter with GATT and advertising capability")]
    NoAdapter,

    /// Nothing registered to serve the request
    #[error("no application registered")]
    NotRegistered,

    /// Failure reported by the radio-stack backend
    #[error("host backend error: {0}")]
    Backend(String),
}

/// Session lifecycle errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Collaborator failure
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Wire protocol failure while building the frame table
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Alert catalogue errors
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Underlying storage failure
    #[error("catalogue I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record failed to parse or validate
    #[error("catalogue record error: {0}")]
    Record(#[from] ProtocolError),
}
