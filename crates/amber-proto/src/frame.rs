//! Chunk splitting and frame encoding for the alert delivery link.
//!
//! Every frame is self-describing: a 4-byte header carrying (index, total)
//! followed by at most `chunk_size` payload bytes. All multi-byte fields are
//! big-endian (network byte order). The u16 header fields are a legacy width
//! shared with the companion mobile decoder.

use crate::FRAME_HEADER_SIZE;
use crate::alert::AlertRecord;
use crate::error::{FrameError, ProtocolError};

/// One indexed slice of a serialized alert record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    index: u16,
    total: u16,
    payload: Vec<u8>,
}

impl Frame {
    /// Create a frame from its parts.
    pub fn new(index: u16, total: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            total,
            payload: payload.into(),
        }
    }

    /// Parse a frame from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < FRAME_HEADER_SIZE {
            return Err(FrameError::TooShort {
                expected: FRAME_HEADER_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self {
            index: u16::from_be_bytes([data[0], data[1]]),
            total: u16::from_be_bytes([data[2], data[3]]),
            payload: data[FRAME_HEADER_SIZE..].to_vec(),
        })
    }

    /// Encode as header + payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        buf.extend_from_slice(&self.index.to_be_bytes());
        buf.extend_from_slice(&self.total.to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Get the chunk index.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Get the chunk count of the table this frame belongs to.
    pub fn total(&self) -> u16 {
        self.total
    }

    /// Get the payload slice.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Split `data` into ordered chunks of at most `chunk_size` bytes.
///
/// The chunks cover the input exactly once; empty input yields an empty
/// list. A zero chunk size violates the input contract.
pub fn chunk_split(data: &[u8], chunk_size: usize) -> Result<Vec<Vec<u8>>, FrameError> {
    if chunk_size == 0 {
        return Err(FrameError::InvalidChunkSize(chunk_size));
    }
    Ok(data.chunks(chunk_size).map(<[u8]>::to_vec).collect())
}

/// Concatenate chunk payloads in index order back into the original stream.
pub fn reassemble(payloads: &[Vec<u8>]) -> Vec<u8> {
    payloads.concat()
}

/// Build the complete encoded frame table for a record.
///
/// Deterministic: identical (record, chunk_size) yields an identical table,
/// and concatenating the payloads for index 0..total-1 reconstructs exactly
/// [`AlertRecord::canonical_bytes`].
pub fn build_frames(record: &AlertRecord, chunk_size: usize) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let encoded = record.canonical_bytes()?;
    let chunks = chunk_split(&encoded, chunk_size)?;
    let total =
        u16::try_from(chunks.len()).map_err(|_| FrameError::TooManyChunks(chunks.len()))?;
    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(i, payload)| Frame::new(i as u16, total, payload).encode())
        .collect())
}
