//! Bill record types: the one persisted entity and its derived status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single electricity purchase.
///
/// Wire field names are camelCase so the local file and remote table rows
/// share one format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    /// Unique identifier, assigned once at creation and never reassigned
    pub id: String,
    /// Date the credit was purchased (YYYY-MM-DD)
    pub date_purchased: NaiveDate,
    /// Date the credit was loaded onto the meter
    pub date_inserted: NaiveDate,
    /// Date the credit ran out; `None` while still running
    #[serde(default)]
    pub date_finished: Option<NaiveDate>,
    /// Purchase amount, currency-agnostic magnitude
    pub amount_purchased: f64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Base64 receipt photo, if one was attached
    #[serde(default)]
    pub receipt_image: Option<String>,
}

/// Whether a purchase is still running. Always derived from the finish
/// date, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Finished,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Finished => "Finished",
        }
    }
}

/// Rejected at the form boundary, before any save is attempted.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("amount must be a non-negative number, got {0}")]
    BadAmount(f64),
    #[error("finish date {finished} is before the insert date {inserted}")]
    FinishBeforeInsert {
        inserted: NaiveDate,
        finished: NaiveDate,
    },
}

impl BillRecord {
    /// Create a record with today's-style defaults filled in by the caller.
    pub fn new(
        id: impl Into<String>,
        date_purchased: NaiveDate,
        date_inserted: NaiveDate,
        amount_purchased: f64,
    ) -> Self {
        Self {
            id: id.into(),
            date_purchased,
            date_inserted,
            date_finished: None,
            amount_purchased,
            notes: None,
            receipt_image: None,
        }
    }

    pub fn status(&self) -> Status {
        if self.date_finished.is_some() {
            Status::Finished
        } else {
            Status::Active
        }
    }

    /// Whole days the credit lasted, when a finish date is recorded.
    /// Uses the absolute difference so inverted date pairs never fault.
    pub fn duration_days(&self) -> Option<i64> {
        self.date_finished
            .map(|finished| (finished - self.date_inserted).num_days().abs())
    }

    /// Form-boundary check; records failing this never reach the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount_purchased.is_finite() || self.amount_purchased < 0.0 {
            return Err(ValidationError::BadAmount(self.amount_purchased));
        }
        if let Some(finished) = self.date_finished {
            if finished < self.date_inserted {
                return Err(ValidationError::FinishBeforeInsert {
                    inserted: self.date_inserted,
                    finished,
                });
            }
        }
        Ok(())
    }
}
