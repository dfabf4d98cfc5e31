//! Reload watcher: polls the catalogue and drives session adoption.

use std::time::{Duration, SystemTime};

use tokio::sync::watch;

use crate::catalogue::AlertCatalogue;
use crate::peripheral::PeripheralHost;
use crate::session::BroadcastSession;

/// Polls an alert catalogue for a replaced current alert.
///
/// Change detection is by last-modified timestamp, not content hash: a
/// touched-but-identical artifact re-triggers adoption, an accepted harmless
/// over-trigger.
#[derive(Debug)]
pub struct ReloadWatcher<C> {
    catalogue: C,
    poll_interval: Duration,
}

impl<C: AlertCatalogue> ReloadWatcher<C> {
    /// Watch `catalogue` every `poll_interval`.
    pub fn new(catalogue: C, poll_interval: Duration) -> Self {
        Self {
            catalogue,
            poll_interval,
        }
    }

    /// Poll until `shutdown` flips to true.
    ///
    /// An unreadable catalogue never tears the session down: the prior
    /// in-memory record keeps broadcasting and the next tick retries.
    pub async fn run<H: PeripheralHost>(
        &self,
        session: &BroadcastSession<H>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut watermark = match self.catalogue.last_modified().await {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("catalogue unreadable at startup: {}", e);
                None
            }
        };

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the loop
        // starts with a full interval.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    watermark = self.poll_once(session, watermark).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("reload watcher stopping");
                        break;
                    }
                }
            }
        }
    }

    async fn poll_once<H: PeripheralHost>(
        &self,
        session: &BroadcastSession<H>,
        watermark: Option<SystemTime>,
    ) -> Option<SystemTime> {
        let modified = match self.catalogue.last_modified().await {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("catalogue unreadable, keeping current alert: {}", e);
                return watermark;
            }
        };
        let Some(modified) = modified else {
            return watermark;
        };
        if Some(modified) == watermark {
            return watermark;
        }

        let record = match self.catalogue.current_alert().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!("current alert disappeared, keeping previous in memory");
                return watermark;
            }
            Err(e) => {
                tracing::warn!("current alert unreadable, keeping previous in memory: {}", e);
                return watermark;
            }
        };

        if let Err(e) = session.adopt(record).await {
            // The watermark does not advance, so the next tick retries the
            // adoption against the same artifact version.
            tracing::warn!("alert adoption failed: {}", e);
            return watermark;
        }
        Some(modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::AlertCatalogue;
    use crate::error::CatalogueError;
    use crate::loopback::LoopbackHost;
    use amber_proto::{AlertRecord, Severity};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn record(headline: &str) -> AlertRecord {
        AlertRecord::builder()
            .headline(headline)
            .severity(Severity::Moderate)
            .expires(1735689600)
            .instructions("Stay indoors")
            .source_url("https://example.com")
            .verified(false)
            .fetched_at(1735680000)
            .build()
            .unwrap()
    }

    fn stamp(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[derive(Debug, Clone, Default)]
    struct MemoryCatalogue {
        inner: Arc<RwLock<CatalogueState>>,
    }

    #[derive(Debug, Default)]
    struct CatalogueState {
        record: Option<AlertRecord>,
        modified: Option<SystemTime>,
        unreadable: bool,
    }

    impl MemoryCatalogue {
        async fn set(&self, record: AlertRecord, modified: SystemTime) {
            let mut guard = self.inner.write().await;
            guard.record = Some(record);
            guard.modified = Some(modified);
        }

        async fn set_unreadable(&self, unreadable: bool) {
            self.inner.write().await.unreadable = unreadable;
        }
    }

    #[async_trait]
    impl AlertCatalogue for MemoryCatalogue {
        async fn current_alert(&self) -> Result<Option<AlertRecord>, CatalogueError> {
            let guard = self.inner.read().await;
            if guard.unreadable {
                return Err(CatalogueError::Io(std::io::Error::other("disk gone")));
            }
            Ok(guard.record.clone())
        }

        async fn last_modified(&self) -> Result<Option<SystemTime>, CatalogueError> {
            let guard = self.inner.read().await;
            if guard.unreadable {
                return Err(CatalogueError::Io(std::io::Error::other("disk gone")));
            }
            Ok(guard.modified)
        }
    }

    #[tokio::test]
    async fn test_watcher_adopts_on_modification() {
        let host = LoopbackHost::new();
        let session = BroadcastSession::start(host, record("Flood warning"))
            .await
            .unwrap();

        let catalogue = MemoryCatalogue::default();
        catalogue.set(record("Flood warning"), stamp(100)).await;

        let watcher = ReloadWatcher::new(catalogue.clone(), Duration::from_millis(10));
        let (tx, rx) = watch::channel(false);

        let driver = async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            catalogue.set(record("Heat warning"), stamp(200)).await;
            tokio::time::sleep(Duration::from_millis(60)).await;
            tx.send(true).unwrap();
        };
        tokio::join!(watcher.run(&session, rx), driver);

        assert_eq!(session.state().record().await.headline, "Heat warning");
    }

    #[tokio::test]
    async fn test_watcher_keeps_previous_alert_when_unreadable() {
        let host = LoopbackHost::new();
        let session = BroadcastSession::start(host, record("Flood warning"))
            .await
            .unwrap();

        let catalogue = MemoryCatalogue::default();
        catalogue.set(record("Flood warning"), stamp(100)).await;

        let watcher = ReloadWatcher::new(catalogue.clone(), Duration::from_millis(10));
        let (tx, rx) = watch::channel(false);

        let driver = async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            catalogue.set_unreadable(true).await;
            tokio::time::sleep(Duration::from_millis(60)).await;
            tx.send(true).unwrap();
        };
        tokio::join!(watcher.run(&session, rx), driver);

        assert_eq!(session.state().record().await.headline, "Flood warning");
    }

    #[tokio::test]
    async fn test_watcher_recovers_after_unreadable_window() {
        let host = LoopbackHost::new();
        let session = BroadcastSession::start(host, record("Flood warning"))
            .await
            .unwrap();

        let catalogue = MemoryCatalogue::default();
        catalogue.set(record("Flood warning"), stamp(100)).await;

        let watcher = ReloadWatcher::new(catalogue.clone(), Duration::from_millis(10));
        let (tx, rx) = watch::channel(false);

        let driver = async {
            catalogue.set_unreadable(true).await;
            tokio::time::sleep(Duration::from_millis(30)).await;
            catalogue.set(record("Heat warning"), stamp(200)).await;
            catalogue.set_unreadable(false).await;
            tokio::time::sleep(Duration::from_millis(60)).await;
            tx.send(true).unwrap();
        };
        tokio::join!(watcher.run(&session, rx), driver);

        assert_eq!(session.state().record().await.headline, "Heat warning");
    }

    #[tokio::test]
    async fn test_watcher_unchanged_timestamp_is_quiet() {
        let host = LoopbackHost::new();
        let session = BroadcastSession::start(host, record("Flood warning"))
            .await
            .unwrap();

        let catalogue = MemoryCatalogue::default();
        catalogue.set(record("Heat warning"), stamp(100)).await;
        // Same timestamp as the startup watermark: never adopted.

        let watcher = ReloadWatcher::new(catalogue.clone(), Duration::from_millis(10));
        let (tx, rx) = watch::channel(false);

        let driver = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(true).unwrap();
        };
        tokio::join!(watcher.run(&session, rx), driver);

        assert_eq!(session.state().record().await.headline, "Flood warning");
    }
}
