//! Bounded fault storage.
//!
//! Two fixed-capacity collections, neither of which ever allocates:
//!
//! - [`HistoryLog`] — ring buffer of every accepted report.  Once full, each
//!   new report silently overwrites the oldest slot.
//! - [`ActiveFaultTable`] — at most one entry per fault id.  Re-reports merge
//!   into the existing entry; a new id arriving at a full table evicts
//!   slot 0 (FIFO by position).
//!
//! Neither type locks; [`FaultStore`] is always reached through the
//! monitor's single state mutex.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::fault::FaultRecord;

// ───────────────────────────────────────────────────────────────
// Historical log
// ───────────────────────────────────────────────────────────────

/// Fixed-capacity ring of past reports.
#[derive(Debug, Clone)]
pub struct HistoryLog<const N: usize> {
    slots: [FaultRecord; N],
    write_index: usize,
    count: usize,
}

impl<const N: usize> HistoryLog<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "history capacity must be non-zero") };
        Self {
            slots: [FaultRecord::EMPTY; N],
            write_index: 0,
            count: 0,
        }
    }

    /// Write at the cursor and advance it.  O(1), never fails.
    pub fn append(&mut self, record: FaultRecord) {
        self.slots[self.write_index] = record;
        self.write_index = (self.write_index + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Number of stored reports; saturates at `N`.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Stored reports, oldest first.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &FaultRecord> + '_ {
        // Until the ring wraps the oldest entry is slot 0; afterwards it is
        // the slot the cursor is about to overwrite.
        let start = if self.count < N { 0 } else { self.write_index };
        (0..self.count).map(move |i| &self.slots[(start + i) % N])
    }
}

impl<const N: usize> Default for HistoryLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Active fault table
// ───────────────────────────────────────────────────────────────

/// What [`ActiveFaultTable::upsert`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The id was already active; its entry was merged in place.
    Merged,
    /// The id was new and the table had room.
    Inserted,
    /// The id was new and the table was full; the returned slot-0 entry
    /// was dropped to make room.
    Evicted(FaultRecord),
}

/// Fixed-capacity table of unresolved faults, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ActiveFaultTable<const N: usize> {
    entries: Vec<FaultRecord, N>,
}

impl<const N: usize> ActiveFaultTable<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "active table capacity must be non-zero") };
        Self {
            entries: Vec::new(),
        }
    }

    /// Merge or insert `record`.  O(len).
    ///
    /// On a matching id the severity ratchets up to the max of old and new,
    /// while timestamp and data always take the incoming values.
    pub fn upsert(&mut self, record: FaultRecord) -> Upsert {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == record.id) {
            existing.severity = existing.severity.max(record.severity);
            existing.timestamp_ms = record.timestamp_ms;
            existing.data = record.data;
            return Upsert::Merged;
        }

        match self.entries.push(record) {
            Ok(()) => Upsert::Inserted,
            Err(record) => {
                let evicted = self.entries[0];
                self.entries.copy_within(1.., 0);
                let last = self.entries.len() - 1;
                self.entries[last] = record;
                Upsert::Evicted(evicted)
            }
        }
    }

    /// Remove the entry for `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: u32) -> Option<FaultRecord> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries[pos];
        self.entries.copy_within(pos + 1.., pos);
        self.entries.pop();
        Some(removed)
    }

    /// First entry (in slot order) whose severity forces fail-safe mode.
    pub fn first_requiring_fail_safe(&self) -> Option<&FaultRecord> {
        self.entries.iter().find(|e| e.severity.requires_fail_safe())
    }

    pub fn get(&self, id: u32) -> Option<&FaultRecord> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[FaultRecord] {
        &self.entries
    }
}

// ───────────────────────────────────────────────────────────────
// Store + snapshot
// ───────────────────────────────────────────────────────────────

/// Copy of the active table plus both counts, taken under one lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultStatus<const ACTIVE: usize> {
    pub active_fault_count: u32,
    pub historical_fault_count: u32,
    pub active_faults: Vec<FaultRecord, ACTIVE>,
}

/// Both fault collections, mutated together.
#[derive(Debug, Clone, Default)]
pub struct FaultStore<const HISTORY: usize, const ACTIVE: usize> {
    history: HistoryLog<HISTORY>,
    active: ActiveFaultTable<ACTIVE>,
}

impl<const HISTORY: usize, const ACTIVE: usize> FaultStore<HISTORY, ACTIVE> {
    pub const fn new() -> Self {
        Self {
            history: HistoryLog::new(),
            active: ActiveFaultTable::new(),
        }
    }

    pub fn append_history(&mut self, record: FaultRecord) {
        self.history.append(record);
    }

    pub fn upsert_active(&mut self, record: FaultRecord) -> Upsert {
        self.active.upsert(record)
    }

    pub fn remove_active(&mut self, id: u32) -> Option<FaultRecord> {
        self.active.remove(id)
    }

    pub fn history(&self) -> &HistoryLog<HISTORY> {
        &self.history
    }

    pub fn active(&self) -> &ActiveFaultTable<ACTIVE> {
        &self.active
    }

    pub fn snapshot_active(&self) -> FaultStatus<ACTIVE> {
        let mut active_faults = Vec::new();
        // Same capacity on both sides, so this cannot overflow.
        let _ = active_faults.extend_from_slice(self.active.as_slice());
        FaultStatus {
            active_fault_count: self.active.len() as u32,
            historical_fault_count: self.history.len() as u32,
            active_faults,
        }
    }
}
