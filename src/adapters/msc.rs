//! Persisted boot command store (the `MSC` partition).
//!
//! Reads and writes the [`BootCommand`] record through [`PartitionPort`].
//!
//! # Guarantees
//!
//! - Whole-record I/O: exactly [`RECORD_LEN`] bytes, never a partial update.
//! - Never blocks booting: a missing, busy, short or unreadable record
//!   yields the last known-good in-memory copy (all zero before the first
//!   successful load).
//! - Best-effort writes: failures are logged and dropped, never retried.
//! - Scoped handles: every successful open is closed on every exit path.

use log::{info, warn};

use crate::app::ports::{OpenMode, PartitionHandle, PartitionPort};
use crate::command::{BootCommand, RECORD_LEN};
use crate::config::PartitionName;
use crate::error::StorageError;

pub struct MscStore {
    partition: PartitionName,
    /// Last record successfully read, or last record handed to `save`.
    cached: BootCommand,
}

impl MscStore {
    pub fn new(partition: PartitionName) -> Self {
        Self {
            partition,
            cached: BootCommand::default(),
        }
    }

    /// Load the persisted record, falling back to the cached copy.
    pub fn load(&mut self, storage: &mut impl PartitionPort) -> BootCommand {
        match self.read_record(storage) {
            Ok(cmd) => {
                info!(
                    "MscStore: loaded record (tag={:?}, partition={}, debug={})",
                    cmd.tag, cmd.boot_partition, cmd.debug_mode
                );
                self.cached = cmd;
                cmd
            }
            Err(e) => {
                warn!("MscStore: read of {} failed ({}), using in-memory record", self.partition, e);
                self.cached
            }
        }
    }

    /// Persist the record.  Failure is logged only.
    pub fn save(&mut self, storage: &mut impl PartitionPort, cmd: &BootCommand) {
        self.cached = *cmd;
        match self.write_record(storage, cmd) {
            Ok(()) => info!("MscStore: record saved to {}", self.partition),
            Err(e) => warn!("MscStore: write to {} failed ({}), change not persisted", self.partition, e),
        }
    }

    /// The in-memory copy that `load` falls back to.
    pub fn cached(&self) -> &BootCommand {
        &self.cached
    }

    // ── Internal ──────────────────────────────────────────────────

    fn read_record(&self, storage: &mut impl PartitionPort) -> Result<BootCommand, StorageError> {
        with_partition(storage, &self.partition, OpenMode::Read, |storage, handle| {
            let mut buf = [0u8; RECORD_LEN];
            let n = storage.read(handle, &mut buf)?;
            if n != RECORD_LEN {
                return Err(StorageError::ShortRead {
                    expected: RECORD_LEN,
                    actual: n,
                });
            }
            BootCommand::decode(&buf)
        })
    }

    fn write_record(
        &self,
        storage: &mut impl PartitionPort,
        cmd: &BootCommand,
    ) -> Result<(), StorageError> {
        let bytes = cmd.encode();
        with_partition(storage, &self.partition, OpenMode::Write, |storage, handle| {
            let n = storage.write(handle, &bytes)?;
            if n != RECORD_LEN {
                return Err(StorageError::ShortWrite {
                    expected: RECORD_LEN,
                    actual: n,
                });
            }
            Ok(())
        })
    }
}

/// Open a partition, run `f` with the handle, then close it.
///
/// The handle is closed whether `f` succeeds or fails.
pub fn with_partition<P, T, F>(
    storage: &mut P,
    name: &str,
    mode: OpenMode,
    f: F,
) -> Result<T, StorageError>
where
    P: PartitionPort,
    F: FnOnce(&mut P, PartitionHandle) -> Result<T, StorageError>,
{
    let handle = storage.open(name, mode)?;
    let result = f(storage, handle);
    storage.close(handle);
    result
}
