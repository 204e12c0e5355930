//! In-memory container

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::errors::{ContainerError, ContainerResult};
use super::ContainerWriter;

/// Shared view over the entries a [`MemoryContainer`] has collected.
/// Stays readable after the package that owned the container is closed.
pub type MemoryEntries = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// Collects entries into a sorted in-memory map instead of an archive.
pub struct MemoryContainer {
    entries: MemoryEntries,
    finished: bool,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            finished: false,
        }
    }

    /// Handle for inspecting entries, including after `finish`.
    pub fn entries(&self) -> MemoryEntries {
        Arc::clone(&self.entries)
    }
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerWriter for MemoryContainer {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> ContainerResult<()> {
        if self.finished {
            return Err(ContainerError::Finished);
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ContainerError::Archive("entry map poisoned".to_string()))?;
        entries.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> ContainerResult<()> {
        if self.finished {
            return Err(ContainerError::Finished);
        }
        self.finished = true;
        Ok(())
    }
}
