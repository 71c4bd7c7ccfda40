//! Objects created during a run, keyed by endpoint.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// An object uploaded by the write stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunObjectRef {
    /// Identity of the endpoint the object lives on.
    pub endpoint_key: String,
    /// Remote object name.
    pub object_name: String,
    /// Local copy of the uploaded payload.
    pub payload_path: PathBuf,
    /// Hex MD5 of the uploaded payload.
    pub payload_md5: String,
}

/// Per-run map from endpoint key to the object uploaded there.
///
/// Holds at most one entry per endpoint. Entries only appear after a
/// successful upload, so an empty store means there is nothing to read back
/// or delete.
#[derive(Debug, Clone, Default)]
pub struct RunObjectStore {
    entries: BTreeMap<String, RunObjectRef>,
}

impl RunObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an uploaded object, replacing any earlier one for the same endpoint.
    pub fn remember(&mut self, object: RunObjectRef) -> Option<RunObjectRef> {
        self.entries.insert(object.endpoint_key.clone(), object)
    }

    /// Returns the object recorded for `endpoint_key`.
    #[must_use]
    pub fn get(&self, endpoint_key: &str) -> Option<&RunObjectRef> {
        self.entries.get(endpoint_key)
    }

    /// Iterates over recorded objects.
    pub fn iter(&self) -> impl Iterator<Item = &RunObjectRef> {
        self.entries.values()
    }

    /// Returns the number of recorded endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been uploaded this run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
