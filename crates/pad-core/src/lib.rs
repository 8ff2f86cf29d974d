//! # pad-core
//!
//! Shared library for Phonepad Link containing the wire protocol codec,
//! chunked transfer framing/reassembly, and the input-interpretation
//! engines (gesture classification and scroll momentum).
//!
//! Phonepad Link turns a handheld device into a remote trackpad, keyboard,
//! and media controller for a host computer over a short-range wireless
//! link whose packets are small, latency-sensitive, and not guaranteed to
//! preserve message boundaries. This crate is the transport-and-gesture
//! core; the presentation layer, the platform radio APIs, and haptics are
//! external consumers that call in through the types defined here and in
//! `pad-client`.
//!
//! - **`protocol`** – how bytes travel over the link: the 3-byte trackpad
//!   frame, the chunk frame for oversized payloads (app metadata, icon
//!   bitmaps, arbitrary text), per-chunk acknowledgments, and the
//!   NUL-delimited app record.
//! - **`domain`** – pure input logic: the tap/long-press/drag state
//!   machine and the scroll momentum engine with post-release decay.
//!
//! This crate has zero dependencies on OS APIs, radios, or async runtimes.

pub mod domain;
pub mod error;
pub mod protocol;

pub use domain::{
    AppChange, AppDirectory, AppEntry, GestureClassifier, GestureConfig, GestureEvent,
    PointerSample, ScrollConfig, ScrollMomentumEngine,
};
pub use error::PadError;
pub use protocol::{
    decode_app_record, decode_trackpad_frame, encode_app_record, encode_trackpad_frame,
    make_chunks, split_payload, AppRecord, Chunk, ChunkAck, ChunkAssembler, ChunkHeader,
    GestureKind, StreamIndexAllocator, TrackpadFrame,
};
