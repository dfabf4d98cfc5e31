//! Owned transfer state: the current record, its derived frame table and the
//! single selected chunk index.
//!
//! The selection is shared by every connected client. The attribute model
//! has no per-request session context addressable by the remote side, so one
//! mutable index is the protocol, not an implementation shortcut.

use std::sync::Arc;

use tokio::sync::RwLock;

use amber_proto::{AlertRecord, ProtocolError, build_frames};

/// The single owned `{record, frame table, selected index}` instance.
#[derive(Debug)]
pub struct TransferState {
    record: AlertRecord,
    frames: Vec<Vec<u8>>,
    selected: u16,
    chunk_size: usize,
}

impl TransferState {
    /// Build the initial state for `record`, deriving its frame table.
    pub fn new(record: AlertRecord, chunk_size: usize) -> Result<Self, ProtocolError> {
        let frames = build_frames(&record, chunk_size)?;
        Ok(Self {
            record,
            frames,
            selected: 0,
            chunk_size,
        })
    }

    /// Replace record, frame table and selection in one step.
    ///
    /// The replacement table is built before anything is swapped, so a
    /// failed build leaves the previous state fully intact.
    pub fn adopt(&mut self, record: AlertRecord) -> Result<(), ProtocolError> {
        let frames = build_frames(&record, self.chunk_size)?;
        self.record = record;
        self.frames = frames;
        self.selected = 0;
        Ok(())
    }

    /// Set the selected chunk index.
    ///
    /// Out-of-range values are a valid quiescent state, not an error; reads
    /// against them serve empty bytes until a client selects back in range.
    pub fn select_index(&mut self, index: u16) {
        self.selected = index;
    }

    /// Frame bytes at the selected index, or empty bytes when out of bounds.
    pub fn current_frame(&self) -> Vec<u8> {
        self.frames
            .get(self.selected as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Currently broadcast record.
    pub fn record(&self) -> &AlertRecord {
        &self.record
    }

    /// Number of frames in the current table.
    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    /// Currently selected index.
    pub fn selected_index(&self) -> u16 {
        self.selected
    }
}

/// Cloneable handle serializing all access to one [`TransferState`].
///
/// Adoption holds the write lock across the whole record + table + index
/// swap, so no reader can observe an index selected against the old table
/// paired with frames from the new one.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<TransferState>>,
}

impl SharedState {
    /// Wrap freshly built state.
    pub fn new(state: TransferState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Atomically adopt a replacement record.
    pub async fn adopt(&self, record: AlertRecord) -> Result<(), ProtocolError> {
        self.inner.write().await.adopt(record)
    }

    /// Set the selected chunk index.
    pub async fn select_index(&self, index: u16) {
        self.inner.write().await.select_index(index);
    }

    /// Frame bytes at the selected index, or empty bytes when out of bounds.
    pub async fn current_frame(&self) -> Vec<u8> {
        self.inner.read().await.current_frame()
    }

    /// Clone of the current record, for advertisement rebuilds.
    pub async fn record(&self) -> AlertRecord {
        self.inner.read().await.record().clone()
    }

    /// Number of frames in the current table.
    pub async fn total_frames(&self) -> usize {
        self.inner.read().await.total_frames()
    }

    /// Currently selected index.
    pub async fn selected_index(&self) -> u16 {
        self.inner.read().await.selected_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amber_proto::{Frame, Severity};

    fn record(headline: &str) -> AlertRecord {
        AlertRecord::builder()
            .headline(headline)
            .severity(Severity::Severe)
            .expires(1735689600)
            .instructions("Take shelter")
            .source_url("https://example.com")
            .verified(true)
            .fetched_at(1735680000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_builds_full_table() {
        let rec = record("Flood warning");
        let canonical = rec.canonical_bytes().unwrap();
        let state = TransferState::new(rec, 17).unwrap();
        assert_eq!(state.total_frames(), canonical.len().div_ceil(17));
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn test_current_frame_out_of_range_is_empty() {
        let mut state = TransferState::new(record("Flood warning"), 17).unwrap();
        state.select_index(u16::MAX);
        assert!(state.current_frame().is_empty());
    }

    #[test]
    fn test_adopt_resets_selection() {
        let mut state = TransferState::new(record("Flood warning"), 17).unwrap();
        state.select_index(3);
        state.adopt(record("Heat warning")).unwrap();
        assert_eq!(state.selected_index(), 0);

        let frame = Frame::parse(&state.current_frame()).unwrap();
        assert_eq!(frame.index(), 0);
        assert_eq!(frame.total() as usize, state.total_frames());
    }

    #[test]
    fn test_failed_adopt_keeps_previous_state() {
        let mut state = TransferState::new(record("Flood warning"), 1).unwrap();
        state.select_index(2);

        let mut oversized = record("Heat warning");
        oversized.headline = "x".repeat(70000);
        assert!(state.adopt(oversized).is_err());

        assert_eq!(state.record().headline, "Flood warning");
        assert_eq!(state.selected_index(), 2);
    }

    #[tokio::test]
    async fn test_shared_state_adopt_is_atomic_under_readers() {
        let state = SharedState::new(TransferState::new(record("Flood warning"), 4).unwrap());

        let mut readers = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let state = state.clone();
            readers.spawn(async move {
                for _ in 0..200 {
                    let frame = state.current_frame().await;
                    if frame.is_empty() {
                        continue;
                    }
                    let parsed = Frame::parse(&frame).unwrap();
                    // A frame from any table must carry that table's total;
                    // a mixed old-index/new-table read would break this.
                    assert!(parsed.index() < parsed.total());
                }
            });
        }

        for i in 0..50 {
            let headline = if i % 2 == 0 { "Flood warning" } else { "A much longer replacement headline" };
            state.adopt(record(headline)).await.unwrap();
        }
        while let Some(res) = readers.join_next().await {
            res.unwrap();
        }
    }
}
