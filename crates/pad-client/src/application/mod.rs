//! Application layer: use cases that tie the domain engines to the link.

pub mod app_sync;
pub mod pointer_pump;
pub mod transfer;

pub use app_sync::{AppRegistrySink, AppSyncSession};
pub use pointer_pump::{spawn_pointer_pump, PointerPumpHandle};
pub use transfer::{request_app_list, send_chunked, send_text, switch_to_app, TransferError};
