//! Chunked transfer framing for payloads larger than one link write.
//!
//! Wire format of a chunk frame:
//!
//! ```text
//! [stream_index: u8][chunk_index: u8][total_chunks: u8][payload...]
//! ```
//!
//! `stream_index` distinguishes concurrently transferring logical messages
//! sharing the channel (two apps' icon data may interleave). `chunk_index` is
//! zero-based and strictly increasing per stream. `total_chunks` is fixed for
//! the life of a stream and must match on every chunk of that stream.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::PadError;

/// Size of the chunk frame header in bytes.
pub const CHUNK_HEADER_LEN: usize = 3;

/// Header prepended to every chunk frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Which logical transfer this chunk belongs to.
    pub stream_index: u8,
    /// Zero-based position of this chunk within the transfer.
    pub chunk_index: u8,
    /// Total number of chunks in the transfer; constant per stream.
    pub total_chunks: u8,
}

impl ChunkHeader {
    /// Encodes the header into its 3-byte wire form.
    pub fn to_bytes(self) -> [u8; CHUNK_HEADER_LEN] {
        [self.stream_index, self.chunk_index, self.total_chunks]
    }

    /// Decodes a header from the start of a chunk frame.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::MalformedPayload`] if fewer than three bytes are
    /// available or `total_chunks` is zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PadError> {
        if bytes.len() < CHUNK_HEADER_LEN {
            return Err(PadError::MalformedPayload(format!(
                "chunk header: need {CHUNK_HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let header = ChunkHeader {
            stream_index: bytes[0],
            chunk_index: bytes[1],
            total_chunks: bytes[2],
        };
        if header.total_chunks == 0 {
            return Err(PadError::MalformedPayload(
                "chunk header: total_chunks is zero".to_string(),
            ));
        }
        Ok(header)
    }
}

/// One bounded-size fragment of a larger logical payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Serializes the chunk into a single link write.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(CHUNK_HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parses a chunk frame as received from the link.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::MalformedPayload`] if the header is invalid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PadError> {
        let header = ChunkHeader::from_bytes(bytes)?;
        Ok(Chunk {
            header,
            payload: bytes[CHUNK_HEADER_LEN..].to_vec(),
        })
    }
}

/// Splits `payload` into in-order slices of at most `max_chunk_len` bytes.
///
/// The final slice carries the remainder (`payload.len() % max_chunk_len`,
/// or a full slice when evenly divisible). An empty payload yields one empty
/// slice so that a transfer always consists of at least one chunk.
///
/// # Errors
///
/// Returns [`PadError::InvalidConfiguration`] when `max_chunk_len` is zero.
pub fn split_payload(payload: &[u8], max_chunk_len: usize) -> Result<Vec<&[u8]>, PadError> {
    if max_chunk_len == 0 {
        return Err(PadError::InvalidConfiguration(
            "max_chunk_len must be greater than zero".to_string(),
        ));
    }
    if payload.is_empty() {
        return Ok(vec![&payload[..0]]);
    }
    Ok(payload.chunks(max_chunk_len).collect())
}

/// Frames `payload` as an ordered chunk sequence for one logical transfer.
///
/// `max_write_len` is the link's maximum single-write size; each chunk's
/// payload is budgeted at `max_write_len - CHUNK_HEADER_LEN` so the whole
/// frame fits in one write. Chunks must be handed to the link in the order
/// returned; the caller aborts the remaining sends if any single write fails.
///
/// # Errors
///
/// - [`PadError::InvalidConfiguration`] if `max_write_len` leaves no room
///   for payload after the header.
/// - [`PadError::OversizedTransfer`] if more than 255 chunks would be
///   required (`total_chunks` is a u8).
pub fn make_chunks(
    stream_index: u8,
    payload: &[u8],
    max_write_len: usize,
) -> Result<Vec<Chunk>, PadError> {
    if max_write_len <= CHUNK_HEADER_LEN {
        return Err(PadError::InvalidConfiguration(format!(
            "max_write_len {max_write_len} leaves no payload room after {CHUNK_HEADER_LEN}-byte header"
        )));
    }

    let slices = split_payload(payload, max_write_len - CHUNK_HEADER_LEN)?;
    if slices.len() > u8::MAX as usize {
        return Err(PadError::OversizedTransfer {
            chunks: slices.len(),
        });
    }

    let total_chunks = slices.len() as u8;
    Ok(slices
        .into_iter()
        .enumerate()
        .map(|(i, slice)| Chunk {
            header: ChunkHeader {
                stream_index,
                chunk_index: i as u8,
                total_chunks,
            },
            payload: slice.to_vec(),
        })
        .collect())
}

/// Hands out stream indices for outbound transfers.
///
/// Indices wrap at 255. A stream index must not be reused while a prior
/// transfer under it is still in flight, else the receiver's buffers
/// interleave; with 256 indices and short-lived transfers the wrap is safe
/// in practice.
#[derive(Debug, Default)]
pub struct StreamIndexAllocator {
    next: AtomicU8,
}

impl StreamIndexAllocator {
    /// Creates an allocator starting at stream index 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next stream index, wrapping from 255 back to 0.
    pub fn next(&self) -> u8 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── split_payload ─────────────────────────────────────────────────────────

    #[test]
    fn test_split_payload_concatenation_reproduces_input() {
        // Arrange
        let payload: Vec<u8> = (0u8..=250).collect();

        for size in [1usize, 7, 100, 250, 300] {
            // Act
            let slices = split_payload(&payload, size).expect("split");

            // Assert – in-order concatenation is the original payload
            let joined: Vec<u8> = slices.concat();
            assert_eq!(joined, payload, "chunk size {size}");
            assert!(slices.iter().all(|s| s.len() <= size));
        }
    }

    #[test]
    fn test_split_payload_final_chunk_is_remainder() {
        let payload = [0u8; 25];
        let slices = split_payload(&payload, 10).expect("split");

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].len(), 10);
        assert_eq!(slices[1].len(), 10);
        assert_eq!(slices[2].len(), 5, "final chunk is len % size");
    }

    #[test]
    fn test_split_payload_evenly_divisible_has_full_final_chunk() {
        let payload = [0u8; 30];
        let slices = split_payload(&payload, 10).expect("split");
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].len(), 10);
    }

    #[test]
    fn test_split_payload_zero_chunk_size_fails() {
        let result = split_payload(&[1, 2, 3], 0);
        assert!(matches!(result, Err(PadError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_split_payload_empty_yields_one_empty_chunk() {
        let slices = split_payload(&[], 16).expect("split");
        assert_eq!(slices.len(), 1);
        assert!(slices[0].is_empty());
    }

    // ── make_chunks ───────────────────────────────────────────────────────────

    #[test]
    fn test_make_chunks_headers_are_ordered_and_consistent() {
        // Arrange: 25 payload bytes, 13-byte writes → 10-byte chunk payloads
        let payload: Vec<u8> = (0u8..25).collect();

        // Act
        let chunks = make_chunks(9, &payload, 13).expect("make_chunks");

        // Assert
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.header.stream_index, 9);
            assert_eq!(chunk.header.chunk_index, i as u8);
            assert_eq!(chunk.header.total_chunks, 3);
        }
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.payload.clone()).collect();
        assert_eq!(joined, payload);
    }

    #[test]
    fn test_make_chunks_frames_fit_in_max_write_len() {
        let payload = [0xAB; 100];
        let chunks = make_chunks(0, &payload, 20).expect("make_chunks");
        assert!(chunks.iter().all(|c| c.to_bytes().len() <= 20));
    }

    #[test]
    fn test_make_chunks_rejects_header_only_write_budget() {
        assert!(matches!(
            make_chunks(0, &[1, 2, 3], CHUNK_HEADER_LEN),
            Err(PadError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_make_chunks_rejects_oversized_transfer() {
        // 4-byte writes leave 1 payload byte per chunk → 300 chunks needed
        let payload = [0u8; 300];
        let result = make_chunks(0, &payload, 4);
        assert_eq!(result, Err(PadError::OversizedTransfer { chunks: 300 }));
    }

    // ── Chunk frame codec ─────────────────────────────────────────────────────

    #[test]
    fn test_chunk_frame_round_trips() {
        let chunk = Chunk {
            header: ChunkHeader {
                stream_index: 3,
                chunk_index: 1,
                total_chunks: 2,
            },
            payload: vec![10, 20, 30],
        };
        let restored = Chunk::from_bytes(&chunk.to_bytes()).expect("decode");
        assert_eq!(restored, chunk);
    }

    #[test]
    fn test_chunk_header_rejects_short_buffer() {
        assert!(ChunkHeader::from_bytes(&[1, 2]).is_err());
    }

    #[test]
    fn test_chunk_header_rejects_zero_total() {
        assert!(matches!(
            ChunkHeader::from_bytes(&[0, 0, 0]),
            Err(PadError::MalformedPayload(_))
        ));
    }

    // ── StreamIndexAllocator ──────────────────────────────────────────────────

    #[test]
    fn test_stream_index_allocator_increments_and_wraps() {
        let alloc = StreamIndexAllocator::new();
        assert_eq!(alloc.next(), 0);
        assert_eq!(alloc.next(), 1);

        for _ in 2..256 {
            alloc.next();
        }
        assert_eq!(alloc.next(), 0, "wraps back to 0 after 255");
    }
}
