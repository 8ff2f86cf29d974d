//! # pad-client
//!
//! Phonepad Link client application library. Combines the pure engines
//! from `pad-core` with the async send pipeline, chunked transfer
//! helpers, app catalog synchronization, and TOML configuration.
//!
//! The crate is split the usual way:
//!
//! - **`application`** – use cases: the pointer pump, outbound chunked
//!   transfers and host requests, and the app-sync session.
//! - **`infrastructure`** – the [`PadLink`] transport abstraction with
//!   loopback and recording implementations, plus config storage.
//!
//! [`PadLink`]: infrastructure::link::PadLink

pub mod application;
pub mod infrastructure;
