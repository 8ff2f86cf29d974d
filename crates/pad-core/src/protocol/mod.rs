//! Wire records, chunked transfer framing, and reassembly.

pub mod assembler;
pub mod chunk;
pub mod wire;

pub use assembler::ChunkAssembler;
pub use chunk::{make_chunks, split_payload, Chunk, ChunkHeader, StreamIndexAllocator};
pub use wire::{
    decode_app_record, decode_trackpad_frame, encode_app_record, encode_trackpad_frame, AppRecord,
    ChunkAck, GestureKind, TrackpadFrame,
};
