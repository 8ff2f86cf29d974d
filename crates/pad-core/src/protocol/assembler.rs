//! Reassembly of chunked transfers arriving from the link.
//!
//! Each in-flight logical message is tracked by its `stream_index` in a map
//! owned exclusively by the [`ChunkAssembler`]; a buffer is created on the
//! first chunk for a new stream and destroyed when the final chunk arrives.
//!
//! # Known limitation
//!
//! Arrival order is trusted to equal `chunk_index` order. There is no gap
//! detection and no reordering: a dropped or reordered chunk silently
//! corrupts the reassembled payload, and the downstream decoder's
//! `MalformedPayload` is the only backstop. The transports this runs over
//! deliver writes in order, so sequence validation would only change which
//! acks a misbehaving sender sees.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::protocol::chunk::ChunkHeader;
use crate::protocol::wire::ChunkAck;

/// Accumulates payload bytes for one in-flight stream.
#[derive(Debug)]
struct AssemblyBuffer {
    /// `total_chunks` declared by the first chunk of the stream.
    declared_total: u8,
    data: Vec<u8>,
}

/// Reassembles tagged chunks into complete logical messages.
///
/// State machine per stream index: Empty → Accumulating → Complete
/// (terminal; the buffer is removed). Streams are independent and may
/// accumulate concurrently; the assembler never blocks.
#[derive(Debug, Default)]
pub struct ChunkAssembler {
    buffers: HashMap<u8, AssemblyBuffer>,
}

impl ChunkAssembler {
    /// Creates an assembler with no streams in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one received chunk into the assembler.
    ///
    /// Always returns an acknowledgment for the chunk. When the chunk is the
    /// last of its stream (`chunk_index == total_chunks - 1`), the fully
    /// concatenated payload is returned as well and the stream's buffer is
    /// removed.
    pub fn on_chunk(&mut self, header: ChunkHeader, payload: &[u8]) -> (ChunkAck, Option<Vec<u8>>) {
        let buffer = self
            .buffers
            .entry(header.stream_index)
            .or_insert_with(|| AssemblyBuffer {
                declared_total: header.total_chunks,
                data: Vec::new(),
            });

        if buffer.declared_total != header.total_chunks {
            // total_chunks is fixed for the life of a stream; a mismatch means
            // the sender reused the index mid-flight. Keep the declared value
            // and let the decoder reject the corrupt result.
            warn!(
                stream = header.stream_index,
                declared = buffer.declared_total,
                got = header.total_chunks,
                "total_chunks changed mid-stream"
            );
        }

        buffer.data.extend_from_slice(payload);
        debug!(
            stream = header.stream_index,
            chunk = header.chunk_index,
            total = header.total_chunks,
            buffered = buffer.data.len(),
            "chunk received"
        );

        let ack = ChunkAck {
            stream_index: header.stream_index,
            chunk_index: header.chunk_index,
        };

        let declared_total = buffer.declared_total;
        if header.chunk_index == declared_total.saturating_sub(1) {
            let buffer = self
                .buffers
                .remove(&header.stream_index)
                .expect("buffer exists; inserted above");
            debug!(
                stream = header.stream_index,
                len = buffer.data.len(),
                "transfer complete"
            );
            (ack, Some(buffer.data))
        } else {
            (ack, None)
        }
    }

    /// Bytes buffered so far for `stream_index`; 0 when no stream is in flight.
    pub fn pending_len(&self, stream_index: u8) -> usize {
        self.buffers
            .get(&stream_index)
            .map_or(0, |buffer| buffer.data.len())
    }

    /// Number of streams currently accumulating.
    pub fn in_flight(&self) -> usize {
        self.buffers.len()
    }

    /// Drops all partial buffers, e.g. when the link goes away.
    pub fn reset(&mut self) {
        if !self.buffers.is_empty() {
            warn!(streams = self.buffers.len(), "discarding partial transfers");
        }
        self.buffers.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn header(stream: u8, chunk: u8, total: u8) -> ChunkHeader {
        ChunkHeader {
            stream_index: stream,
            chunk_index: chunk,
            total_chunks: total,
        }
    }

    #[test]
    fn test_in_order_chunks_complete_exactly_once() {
        // Arrange
        let mut assembler = ChunkAssembler::new();

        // Act
        let (_, first) = assembler.on_chunk(header(0, 0, 3), b"aaa");
        let (_, second) = assembler.on_chunk(header(0, 1, 3), b"bbb");
        let (_, last) = assembler.on_chunk(header(0, 2, 3), b"cc");

        // Assert
        assert!(first.is_none());
        assert!(second.is_none());
        assert_eq!(last, Some(b"aaabbbcc".to_vec()));
    }

    #[test]
    fn test_buffer_is_removed_after_completion() {
        let mut assembler = ChunkAssembler::new();
        assembler.on_chunk(header(5, 0, 2), b"xy");
        assert_eq!(assembler.pending_len(5), 2);

        assembler.on_chunk(header(5, 1, 2), b"z");

        assert_eq!(assembler.pending_len(5), 0, "buffer gone after completion");
        assert_eq!(assembler.in_flight(), 0);
    }

    #[test]
    fn test_every_chunk_is_acknowledged() {
        let mut assembler = ChunkAssembler::new();

        let (ack0, _) = assembler.on_chunk(header(2, 0, 2), b"a");
        let (ack1, _) = assembler.on_chunk(header(2, 1, 2), b"b");

        assert_eq!(
            ack0,
            ChunkAck {
                stream_index: 2,
                chunk_index: 0
            }
        );
        assert_eq!(
            ack1,
            ChunkAck {
                stream_index: 2,
                chunk_index: 1
            }
        );
    }

    #[test]
    fn test_interleaved_streams_do_not_cross_contaminate() {
        // Arrange: streams 1 and 2 accumulate concurrently
        let mut assembler = ChunkAssembler::new();

        // Act – interleave arrival
        assembler.on_chunk(header(1, 0, 2), b"AA");
        assembler.on_chunk(header(2, 0, 3), b"xx");
        let (_, stream1) = assembler.on_chunk(header(1, 1, 2), b"BB");
        assembler.on_chunk(header(2, 1, 3), b"yy");
        let (_, stream2) = assembler.on_chunk(header(2, 2, 3), b"zz");

        // Assert – completing stream 1 is unaffected by partial stream 2
        assert_eq!(stream1, Some(b"AABB".to_vec()));
        assert_eq!(stream2, Some(b"xxyyzz".to_vec()));
    }

    #[test]
    fn test_single_chunk_transfer_completes_immediately() {
        let mut assembler = ChunkAssembler::new();
        let (ack, done) = assembler.on_chunk(header(0, 0, 1), b"whole");

        assert_eq!(ack.chunk_index, 0);
        assert_eq!(done, Some(b"whole".to_vec()));
    }

    #[test]
    fn test_empty_payload_single_chunk_completes_empty() {
        let mut assembler = ChunkAssembler::new();
        let (_, done) = assembler.on_chunk(header(0, 0, 1), b"");
        assert_eq!(done, Some(Vec::new()));
    }

    #[test]
    fn test_reset_discards_partial_buffers() {
        let mut assembler = ChunkAssembler::new();
        assembler.on_chunk(header(0, 0, 4), b"partial");
        assembler.on_chunk(header(1, 0, 4), b"partial");
        assert_eq!(assembler.in_flight(), 2);

        assembler.reset();

        assert_eq!(assembler.in_flight(), 0);
        assert_eq!(assembler.pending_len(0), 0);
    }

    #[test]
    fn test_dropped_chunk_yields_truncated_payload() {
        // The known limitation: a missing chunk is not detected. The final
        // chunk still completes the stream with whatever was buffered.
        let mut assembler = ChunkAssembler::new();
        assembler.on_chunk(header(0, 0, 3), b"aaa");
        // chunk 1 lost in transit
        let (_, done) = assembler.on_chunk(header(0, 2, 3), b"ccc");

        assert_eq!(done, Some(b"aaaccc".to_vec()), "truncated, not rejected");
    }
}
