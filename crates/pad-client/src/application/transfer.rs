//! Outbound bulk transfers and host requests.
//!
//! Anything larger than a single link write goes out as a chunked
//! transfer: the payload is framed by `pad-core`, then each chunk is
//! written acknowledged and in order. The helpers here also cover the
//! two small host requests, asking for the app list and switching the
//! frontmost app.

use tracing::{debug, info};

use pad_core::protocol::wire::APP_LIST_REQUEST;
use pad_core::{make_chunks, PadError, StreamIndexAllocator};

use crate::infrastructure::link::{LinkError, PadLink, WriteMode};

/// Error type for transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The payload could not be framed for the link.
    #[error(transparent)]
    Protocol(#[from] PadError),

    /// A chunk write failed; the transfer is abandoned mid-stream.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Sends `payload` as an ordered, acknowledged chunk stream.
///
/// Aborts on the first failed write. The host discards the partial
/// stream the next time the same stream index is reused.
///
/// # Errors
///
/// Returns [`TransferError::Protocol`] when the payload cannot be
/// framed (link write size too small, or more than 255 chunks needed)
/// and [`TransferError::Link`] when a write fails.
pub async fn send_chunked(
    link: &dyn PadLink,
    stream_index: u8,
    payload: &[u8],
) -> Result<(), TransferError> {
    let chunks = make_chunks(stream_index, payload, link.max_write_len())?;
    debug!(
        stream_index,
        chunk_count = chunks.len(),
        payload_len = payload.len(),
        "sending chunked transfer"
    );

    for chunk in &chunks {
        link.write(&chunk.to_bytes(), WriteMode::WithAck).await?;
    }
    Ok(())
}

/// Sends a UTF-8 string to the host as a chunked transfer.
///
/// Used for remote keyboard text entry. The stream index comes from
/// `allocator` so interleaved transfers stay distinguishable.
///
/// # Errors
///
/// Propagates [`TransferError`] from [`send_chunked`].
pub async fn send_text(
    link: &dyn PadLink,
    allocator: &StreamIndexAllocator,
    text: &str,
) -> Result<(), TransferError> {
    let stream_index = allocator.next();
    info!(stream_index, len = text.len(), "sending text to host");
    send_chunked(link, stream_index, text.as_bytes()).await
}

/// Asks the host to stream its application catalog.
///
/// # Errors
///
/// Returns [`TransferError::Link`] when the write fails.
pub async fn request_app_list(link: &dyn PadLink) -> Result<(), TransferError> {
    debug!("requesting app list from host");
    link.write(&APP_LIST_REQUEST, WriteMode::WithAck).await?;
    Ok(())
}

/// Asks the host to bring the app with `bundle_identifier` frontmost.
///
/// The identifier travels as raw UTF-8 in a single acknowledged write.
///
/// # Errors
///
/// Returns [`TransferError::Link`] when the write fails.
pub async fn switch_to_app(link: &dyn PadLink, bundle_identifier: &str) -> Result<(), TransferError> {
    info!(bundle_identifier, "requesting app switch");
    link.write(bundle_identifier.as_bytes(), WriteMode::WithAck)
        .await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::link::mock::RecordingLink;
    use pad_core::{Chunk, ChunkAssembler};

    #[tokio::test]
    async fn test_send_chunked_writes_every_chunk_with_ack() {
        // Arrange
        let link = RecordingLink::new(10);
        let payload: Vec<u8> = (0..25).collect();

        // Act
        send_chunked(&link, 3, &payload).await.unwrap();

        // Assert: 25 bytes over 7-byte chunk payloads -> 4 writes
        let writes = link.writes();
        assert_eq!(writes.len(), 4);
        assert!(writes.iter().all(|(_, mode)| *mode == WriteMode::WithAck));

        // Reassembling the written frames reproduces the payload
        let mut assembler = ChunkAssembler::new();
        let mut completed = None;
        for (frame, _) in &writes {
            let chunk = Chunk::from_bytes(frame).unwrap();
            let (_, done) = assembler.on_chunk(chunk.header, &chunk.payload);
            completed = done.or(completed);
        }
        assert_eq!(completed, Some(payload));
    }

    #[tokio::test]
    async fn test_send_chunked_aborts_on_first_write_failure() {
        // Arrange
        let link = RecordingLink::new(10);
        link.fail_after(2);
        let payload = [0u8; 50];

        // Act
        let result = send_chunked(&link, 0, &payload).await;

        // Assert: no further chunks written after the failure
        assert!(matches!(result, Err(TransferError::Link(_))));
        assert_eq!(link.write_count(), 2);
    }

    #[tokio::test]
    async fn test_send_chunked_rejects_tiny_link_write_size() {
        // Arrange: no room for payload bytes after the chunk header
        let link = RecordingLink::new(3);

        // Act
        let result = send_chunked(&link, 0, b"hello").await;

        // Assert
        assert!(matches!(result, Err(TransferError::Protocol(_))));
        assert_eq!(link.write_count(), 0);
    }

    #[tokio::test]
    async fn test_send_text_allocates_fresh_stream_indices() {
        // Arrange
        let link = RecordingLink::new(16);
        let allocator = StreamIndexAllocator::new();

        // Act
        send_text(&link, &allocator, "first").await.unwrap();
        send_text(&link, &allocator, "second").await.unwrap();

        // Assert: the two transfers carry different stream indices
        let writes = link.writes();
        let first_stream = Chunk::from_bytes(&writes[0].0).unwrap().header.stream_index;
        let last_stream = Chunk::from_bytes(&writes.last().unwrap().0)
            .unwrap()
            .header
            .stream_index;
        assert_ne!(first_stream, last_stream);
    }

    #[tokio::test]
    async fn test_request_app_list_sends_the_request_byte() {
        // Arrange
        let link = RecordingLink::new(16);

        // Act
        request_app_list(&link).await.unwrap();

        // Assert
        assert_eq!(link.writes(), vec![(vec![0x01], WriteMode::WithAck)]);
    }

    #[tokio::test]
    async fn test_switch_to_app_sends_raw_identifier() {
        // Arrange
        let link = RecordingLink::new(64);

        // Act
        switch_to_app(&link, "com.apple.Music").await.unwrap();

        // Assert
        assert_eq!(
            link.writes(),
            vec![(b"com.apple.Music".to_vec(), WriteMode::WithAck)]
        );
    }
}
