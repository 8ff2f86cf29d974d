//! Error taxonomy shared by the protocol and input-interpretation layers.

use thiserror::Error;

/// Errors produced by pad-core.
///
/// The split is deliberate:
///
/// - [`MalformedPayload`](PadError::MalformedPayload) is a runtime decode
///   failure. The offending message is dropped and never retried; each wire
///   message is self-contained so losing one does not desynchronize the rest.
/// - [`InvalidConfiguration`](PadError::InvalidConfiguration) is only ever
///   returned at construction time. A component that was built successfully
///   cannot fail with it later.
/// - [`OversizedTransfer`](PadError::OversizedTransfer) guards the u8
///   `total_chunks` field of the chunk header: wrapping past 255 chunks
///   would silently corrupt the stream, so oversized payloads are rejected
///   before the first chunk is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PadError {
    /// The byte buffer could not be parsed (too short, missing delimiter,
    /// invalid UTF-8, unknown discriminant).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A threshold, factor, or chunk size was zero/negative at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The payload would need more chunks than the u8 header can count.
    #[error("transfer would need {chunks} chunks, header limit is 255")]
    OversizedTransfer { chunks: usize },
}
