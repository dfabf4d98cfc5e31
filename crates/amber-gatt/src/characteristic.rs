//! Read/write attribute handlers mapped onto the transfer state.
//!
//! Neither handler has an error channel toward the remote client, so nothing
//! here returns a `Result`: malformed input degrades to a logged no-op and
//! an out-of-range read to an empty response.

use crate::state::SharedState;

/// Read-only attribute serving the currently selected frame.
#[derive(Debug, Clone)]
pub struct AlertCharacteristic {
    state: SharedState,
}

impl AlertCharacteristic {
    /// Wire the handler to `state`.
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Serve the frame at the selected index; side effect limited to
    /// diagnostics.
    pub async fn read_value(&self) -> Vec<u8> {
        let frame = self.state.current_frame().await;
        tracing::debug!(
            "served chunk index={} total={} bytes={}",
            self.state.selected_index().await,
            self.state.total_frames().await,
            frame.len()
        );
        frame
    }
}

/// Write-only attribute selecting the chunk served by subsequent reads.
#[derive(Debug, Clone)]
pub struct ControlCharacteristic {
    state: SharedState,
}

impl ControlCharacteristic {
    /// Wire the handler to `state`.
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Interpret the first two bytes as a big-endian chunk index.
    ///
    /// Writes shorter than two bytes are logged and ignored; bytes beyond
    /// the first two are ignored. Any index is accepted, including past the
    /// current table, relying on the empty-read contract of the state.
    pub async fn write_value(&self, value: &[u8]) {
        if value.len() < 2 {
            tracing::warn!("control write too short ({} bytes), ignoring", value.len());
            return;
        }
        let index = u16::from_be_bytes([value[0], value[1]]);
        self.state.select_index(index).await;
        tracing::debug!(
            "chunk request received index={} total={}",
            index,
            self.state.total_frames().await
        );
    }
}
