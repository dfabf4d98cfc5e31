//! Abstract alert-catalogue collaborator.

use std::time::SystemTime;

use async_trait::async_trait;

use amber_proto::AlertRecord;

use crate::error::CatalogueError;

/// Source of the currently published alert.
///
/// The broadcast core only reads it; ownership of the backing artifacts
/// (files, databases) lives with the implementation.
#[async_trait]
pub trait AlertCatalogue: Send + Sync {
    /// Currently published record, if any.
    async fn current_alert(&self) -> Result<Option<AlertRecord>, CatalogueError>;

    /// Last-modified timestamp of the published record, if any.
    async fn last_modified(&self) -> Result<Option<SystemTime>, CatalogueError>;
}
