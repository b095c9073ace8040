//! Append-only journal of committed ledger events

use agrishield_common::{BlockHeight, JournalEntry, LedgerEvent, Result};
use tracing::debug;

#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, height: BlockHeight, event: LedgerEvent) {
        let entry = JournalEntry::new(self.entries.len() as u64, height, event);
        debug!(
            sequence = entry.sequence,
            event = entry.event.name(),
            height,
            "Journal entry appended"
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at or after `sequence`
    pub fn since(&self, sequence: u64) -> &[JournalEntry] {
        let start = (sequence as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }
}
