//! Local backend: one serialized JSON array under a fixed well-known path,
//! loaded once at start-up and rewritten wholesale on every change.

use std::fs;
use std::path::PathBuf;

use volt_core::BillRecord;

use crate::error::StoreError;

pub struct LocalStore {
    path: PathBuf,
    records: Vec<BillRecord>,
}

impl LocalStore {
    /// Open the store, loading the array if the file exists. A missing
    /// file is an empty store; a file that will not parse is an error.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        log::debug!("loaded {} records from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    pub fn list(&self) -> &[BillRecord] {
        &self.records
    }

    /// Insert-or-replace by id. New records are prepended (newest first);
    /// an existing id is replaced in place. The file is rewritten before
    /// the in-memory list changes, so a failed write leaves it untouched.
    pub fn save(&mut self, record: BillRecord) -> Result<(), StoreError> {
        let mut next = self.records.clone();
        match next.iter().position(|r| r.id == record.id) {
            Some(i) => next[i] = record,
            None => next.insert(0, record),
        }
        self.persist(&next)?;
        self.records = next;
        Ok(())
    }

    /// Remove by id. An absent id leaves the list unchanged and succeeds.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.records.iter().any(|r| r.id == id) {
            return Ok(());
        }
        let next: Vec<BillRecord> = self
            .records
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.persist(&next)?;
        self.records = next;
        Ok(())
    }

    fn persist(&self, records: &[BillRecord]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
