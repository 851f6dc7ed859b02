//! Flattens records to labeled spreadsheet rows for the export command.

use crate::record::BillRecord;

pub const EXPORT_HEADERS: [&str; 5] = [
    "Date Purchased",
    "Date Inserted",
    "Date Finished",
    "Amount Purchased",
    "Notes",
];

/// Substituted for a missing finish date.
pub const ONGOING_LABEL: &str = "Ongoing";

/// One flat row per record, in list order.
pub fn export_rows(records: &[BillRecord]) -> Vec<[String; 5]> {
    records
        .iter()
        .map(|r| {
            [
                r.date_purchased.to_string(),
                r.date_inserted.to_string(),
                r.date_finished
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| ONGOING_LABEL.to_string()),
                r.amount_purchased.to_string(),
                r.notes.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_ongoing_substitution_and_order() {
        let mut finished = BillRecord::new("a", date("2024-01-01"), date("2024-01-02"), 120.0);
        finished.date_finished = Some(date("2024-01-20"));
        finished.notes = Some("generator month".to_string());
        let ongoing = BillRecord::new("b", date("2024-02-01"), date("2024-02-02"), 80.5);

        let rows = export_rows(&[finished, ongoing]);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            [
                "2024-01-01".to_string(),
                "2024-01-02".to_string(),
                "2024-01-20".to_string(),
                "120".to_string(),
                "generator month".to_string(),
            ]
        );
        assert_eq!(rows[1][2], ONGOING_LABEL);
        assert_eq!(rows[1][4], "");
    }
}
