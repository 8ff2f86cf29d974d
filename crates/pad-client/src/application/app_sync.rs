//! App catalog synchronization.
//!
//! The host streams its running-application catalog as chunked app
//! records. [`AppSyncSession`] owns the receive side: it parses each
//! incoming chunk frame, acknowledges it over the link, reassembles
//! completed records, applies them to an owned [`AppDirectory`], and
//! notifies an [`AppRegistrySink`] so the presentation layer can update.
//!
//! Malformed input from the link is logged and dropped; a bad frame
//! must never take the session down.

use std::sync::Arc;

use tracing::{debug, info, warn};

use pad_core::{decode_app_record, AppChange, AppDirectory, AppEntry, Chunk, ChunkAssembler};

use crate::application::transfer::{self, TransferError};
use crate::infrastructure::link::{PadLink, WriteMode};

/// Receives app catalog changes as they are applied.
///
/// The presentation layer implements this to keep its app list in sync.
pub trait AppRegistrySink: Send + Sync {
    fn app_added(&self, entry: &AppEntry);
    fn app_updated(&self, entry: &AppEntry);
    fn app_removed(&self, bundle_identifier: &str);
}

/// One client-side app synchronization session.
pub struct AppSyncSession {
    assembler: ChunkAssembler,
    directory: AppDirectory,
    link: Arc<dyn PadLink>,
    sink: Arc<dyn AppRegistrySink>,
}

impl AppSyncSession {
    pub fn new(link: Arc<dyn PadLink>, sink: Arc<dyn AppRegistrySink>) -> Self {
        Self {
            assembler: ChunkAssembler::new(),
            directory: AppDirectory::default(),
            link,
            sink,
        }
    }

    /// Asks the host to stream the full catalog.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Link`] when the request write fails.
    pub async fn request_sync(&self) -> Result<(), TransferError> {
        transfer::request_app_list(self.link.as_ref()).await
    }

    /// Handles one incoming link notification carrying a chunk frame.
    ///
    /// Acknowledges the chunk, and when it completes a record, applies
    /// the record to the directory and notifies the sink. Malformed
    /// frames and records are logged and dropped.
    pub async fn handle_notification(&mut self, bytes: &[u8]) {
        let chunk = match Chunk::from_bytes(bytes) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("ignoring malformed chunk frame: {e}");
                return;
            }
        };

        let (ack, completed) = self.assembler.on_chunk(chunk.header, &chunk.payload);

        // Ack failures leave the host to retransmit on its own schedule.
        if let Err(e) = self.link.write(&ack.to_bytes(), WriteMode::WithAck).await {
            warn!(
                stream_index = ack.stream_index,
                chunk_index = ack.chunk_index,
                "chunk ack write failed: {e}"
            );
        }

        if let Some(payload) = completed {
            self.apply_record_payload(&payload);
        }
    }

    fn apply_record_payload(&mut self, payload: &[u8]) {
        let record = match decode_app_record(payload) {
            Ok(record) => record,
            Err(e) => {
                warn!("ignoring undecodable app record: {e}");
                return;
            }
        };

        let bundle_identifier = record.bundle_identifier.clone();
        match self.directory.apply(record) {
            Some(AppChange::Added) => {
                info!(%bundle_identifier, "app added");
                if let Some(entry) = self.directory.get(&bundle_identifier) {
                    self.sink.app_added(entry);
                }
            }
            Some(AppChange::Updated) => {
                debug!(%bundle_identifier, "app updated");
                if let Some(entry) = self.directory.get(&bundle_identifier) {
                    self.sink.app_updated(entry);
                }
            }
            Some(AppChange::Removed) => {
                info!(%bundle_identifier, "app removed");
                self.sink.app_removed(&bundle_identifier);
            }
            None => {
                debug!(%bundle_identifier, "removal for unknown app ignored");
            }
        }
    }

    /// Current view of the host's app catalog.
    pub fn directory(&self) -> &AppDirectory {
        &self.directory
    }

    /// Discards partial transfers and the catalog, e.g. on reconnect.
    pub fn reset(&mut self) {
        self.assembler.reset();
        self.directory.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
