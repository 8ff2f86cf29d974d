//! Infrastructure layer: link transports and configuration storage.

pub mod link;
pub mod storage;
