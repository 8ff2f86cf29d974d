//! Directory of applications currently running on the host.
//!
//! Fed by completed app-record transfers; keyed by bundle identifier. The
//! host streams one record per app at sync time and incremental add/remove
//! records afterwards.

use crate::protocol::wire::AppRecord;

/// One running application as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub bundle_identifier: String,
    pub display_name: String,
    /// Icon bitmap bytes; rendering is the presentation layer's problem.
    pub icon: Vec<u8>,
}

/// What applying a record did to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppChange {
    Added,
    Updated,
    Removed,
}

/// Ordered collection of running apps, insertion order preserved.
#[derive(Debug, Default)]
pub struct AppDirectory {
    entries: Vec<AppEntry>,
}

impl AppDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one decoded record.
    ///
    /// A removal record deletes the matching entry; removing an unknown
    /// bundle is a no-op and returns `None`. An add/update record inserts
    /// or replaces by bundle-identifier equality.
    pub fn apply(&mut self, record: AppRecord) -> Option<AppChange> {
        if record.removed {
            let before = self.entries.len();
            self.entries
                .retain(|entry| entry.bundle_identifier != record.bundle_identifier);
            return if self.entries.len() < before {
                Some(AppChange::Removed)
            } else {
                None
            };
        }

        let entry = AppEntry {
            bundle_identifier: record.bundle_identifier,
            display_name: record.display_name,
            icon: record.icon,
        };

        match self
            .entries
            .iter_mut()
            .find(|existing| existing.bundle_identifier == entry.bundle_identifier)
        {
            Some(existing) => {
                *existing = entry;
                Some(AppChange::Updated)
            }
            None => {
                self.entries.push(entry);
                Some(AppChange::Added)
            }
        }
    }

    /// Looks up an entry by bundle identifier.
    pub fn get(&self, bundle_identifier: &str) -> Option<&AppEntry> {
        self.entries
            .iter()
            .find(|entry| entry.bundle_identifier == bundle_identifier)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets everything, e.g. on disconnect.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
