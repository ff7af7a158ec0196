use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use parking_lot::RwLock;
use tracing::debug;

use super::DisplayBuffer;
use crate::surface::EntryId;
use crate::RegistryError;

/// Buffer a fabric's committer renders into; shared with the registry entry.
pub type FabricBuffer = Arc<RwLock<DisplayBuffer>>;

#[derive(Debug)]
pub struct FabricRecord {
    name: String,
    buffer: FabricBuffer,
    pub(crate) file: Option<EntryId>,
}

impl FabricRecord {
    pub fn new(
        name: impl Into<String>,
        buffer: DisplayBuffer,
    ) -> Self {
        Self {
            name: name.into(),
            buffer: Arc::new(RwLock::new(buffer)),
            file: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self) -> FabricBuffer {
        self.buffer.clone()
    }
}

/// Per-fabric commit snapshots keyed by fabric name.
///
/// The lock covers registry shape only. Overwriting a record's buffer goes
/// through the record's own lock, taken by the committer via [`Self::buffer`].
#[derive(Default)]
pub struct FabricRegistry {
    inner: Mutex<BTreeMap<String, FabricRecord>>,
}

impl FabricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_records<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, FabricRecord>) -> R,
    ) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn insert(
        &self,
        record: FabricRecord,
    ) -> Result<FabricBuffer, RegistryError> {
        self.with_records(|records| {
            if records.contains_key(record.name()) {
                return Err(RegistryError::DuplicateFabric {
                    name: record.name().to_string(),
                });
            }
            let buffer = record.buffer();
            debug!(fabric = %record.name(), "Registered fabric record");
            records.insert(record.name().to_string(), record);
            Ok(buffer)
        })
    }

    pub fn remove(
        &self,
        name: &str,
    ) -> Option<FabricRecord> {
        self.with_records(|records| records.remove(name))
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.with_records(|records| records.contains_key(name))
    }

    /// Handle to the named fabric's buffer, for the committer.
    pub fn buffer(
        &self,
        name: &str,
    ) -> Option<FabricBuffer> {
        self.with_records(|records| records.get(name).map(FabricRecord::buffer))
    }

    /// Slice of the fabric's last committed snapshot.
    pub fn read(
        &self,
        name: &str,
        offset: u64,
        count: usize,
    ) -> Result<Vec<u8>, RegistryError> {
        self.with_records(|records| {
            let record = records.get(name).ok_or_else(|| RegistryError::FabricNotFound {
                name: name.to_string(),
            })?;
            let bytes = record.buffer.read().read_at(offset, count);
            Ok(bytes)
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.with_records(|records| records.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.with_records(|records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Vec<FabricRecord> {
        self.with_records(|records| std::mem::take(records).into_values().collect())
    }
}
