//! volt-store: the record store behind the Volt CLI.
//!
//! One contract, two interchangeable backends: a local JSON file and a
//! remote REST table. The backend is picked once at start-up; everything
//! downstream talks to [`Store`] and never asks which variant it holds.

pub mod error;
pub mod local;
pub mod remote;

pub use error::StoreError;
pub use local::LocalStore;
pub use remote::{RemoteConfig, RemoteStore};

use volt_core::BillRecord;

/// The backend chosen at start-up. The arms only delegate.
pub enum Store {
    Local(LocalStore),
    Remote(RemoteStore),
}

impl Store {
    /// Current known records, newest first. Reflects the last successful
    /// load or fetch; there is no live subscription.
    pub fn list(&self) -> &[BillRecord] {
        match self {
            Store::Local(s) => s.list(),
            Store::Remote(s) => s.list(),
        }
    }

    /// Insert-or-replace by id. On success the in-memory list matches the
    /// authoritative source again; on failure it is left untouched.
    pub async fn save(&mut self, record: BillRecord) -> Result<(), StoreError> {
        match self {
            Store::Local(s) => s.save(record),
            Store::Remote(s) => s.save(record).await,
        }
    }

    /// Remove by id. Deleting an id that is not present is a no-op.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        match self {
            Store::Local(s) => s.delete(id),
            Store::Remote(s) => s.delete(id).await,
        }
    }
}
