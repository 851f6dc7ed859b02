//! Aggregate statistics and the chart-ready spending series.
//!
//! Pure functions over a snapshot of the record list. Identical input
//! always yields identical output; nothing here mutates or hides state.

use chrono::NaiveDate;

use crate::record::BillRecord;

/// The aggregate figures shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    /// Sum of all purchase amounts
    pub total_spent: f64,
    /// Mean purchase amount; 0 when there are no records
    pub avg_spent: f64,
    /// Mean runtime in whole days over finished records; 0 when none
    pub avg_duration_days: i64,
    pub entry_count: usize,
}

pub fn compute_totals(records: &[BillRecord]) -> Totals {
    let total_spent: f64 = records.iter().map(|r| r.amount_purchased).sum();
    let avg_spent = if records.is_empty() {
        0.0
    } else {
        total_spent / records.len() as f64
    };

    let durations: Vec<i64> = records.iter().filter_map(|r| r.duration_days()).collect();
    let avg_duration_days = if durations.is_empty() {
        0
    } else {
        let total: i64 = durations.iter().sum();
        (total as f64 / durations.len() as f64).round() as i64
    };

    Totals {
        total_spent,
        avg_spent,
        avg_duration_days,
        entry_count: records.len(),
    }
}

/// One bar of the spending chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub date_inserted: NaiveDate,
    pub amount: f64,
}

/// The record list as `(date_inserted, amount)` pairs sorted ascending by
/// insertion date. The sort is stable: ties keep their input order.
pub fn chart_series(records: &[BillRecord]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = records
        .iter()
        .map(|r| ChartPoint {
            date_inserted: r.date_inserted,
            amount: r.amount_purchased,
        })
        .collect();
    points.sort_by_key(|p| p.date_inserted);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(id: &str, inserted: &str, finished: Option<&str>, amount: f64) -> BillRecord {
        let mut r = BillRecord::new(id, date(inserted), date(inserted), amount);
        r.date_finished = finished.map(date);
        r
    }

    #[test]
    fn test_empty_list_yields_zeroes() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.total_spent, 0.0);
        assert_eq!(totals.avg_spent, 0.0);
        assert_eq!(totals.avg_duration_days, 0);
        assert_eq!(totals.entry_count, 0);
        assert!(chart_series(&[]).is_empty());
    }

    #[test]
    fn test_totals_match_arithmetic_sum() {
        let records = vec![
            record("a", "2024-01-01", None, 120.0),
            record("b", "2024-02-01", None, 80.0),
            record("c", "2024-03-01", None, 100.0),
        ];
        let totals = compute_totals(&records);
        assert_eq!(totals.total_spent, 300.0);
        assert_eq!(totals.avg_spent, 100.0);
        assert_eq!(totals.entry_count, 3);
    }

    #[test]
    fn test_duration_averages_only_finished_records() {
        // No finished records at all
        let active_only = vec![record("a", "2024-01-01", None, 10.0)];
        assert_eq!(compute_totals(&active_only).avg_duration_days, 0);

        // One month exactly
        let one = vec![record("a", "2024-01-01", Some("2024-01-31"), 10.0)];
        assert_eq!(compute_totals(&one).avg_duration_days, 30);

        // 10 and 20 days, one ongoing record ignored
        let mixed = vec![
            record("a", "2024-01-01", Some("2024-01-11"), 10.0),
            record("b", "2024-02-01", Some("2024-02-21"), 10.0),
            record("c", "2024-03-01", None, 10.0),
        ];
        assert_eq!(compute_totals(&mixed).avg_duration_days, 15);
    }

    #[test]
    fn test_inverted_date_pair_does_not_fault() {
        let mut r = record("a", "2024-02-10", None, 10.0);
        r.date_finished = Some(date("2024-02-01"));
        let totals = compute_totals(&[r]);
        assert_eq!(totals.avg_duration_days, 9);
    }

    #[test]
    fn test_chart_series_sorted_ascending_and_stable() {
        let records = vec![
            record("late", "2024-03-01", None, 30.0),
            record("early", "2024-01-01", None, 10.0),
            record("tie-first", "2024-02-01", None, 21.0),
            record("tie-second", "2024-02-01", None, 22.0),
        ];

        let series = chart_series(&records);
        let dates: Vec<NaiveDate> = series.iter().map(|p| p.date_inserted).collect();
        assert_eq!(
            dates,
            vec![
                date("2024-01-01"),
                date("2024-02-01"),
                date("2024-02-01"),
                date("2024-03-01")
            ]
        );
        // Stable: the tied pair keeps input order
        assert_eq!(series[1].amount, 21.0);
        assert_eq!(series[2].amount, 22.0);

        // Idempotent: sorting the already-sorted projection changes nothing
        let sorted_records = vec![
            records[1].clone(),
            records[2].clone(),
            records[3].clone(),
            records[0].clone(),
        ];
        assert_eq!(chart_series(&sorted_records), series);
    }

    #[test]
    fn test_documented_scenario() {
        let records = vec![
            record("a", "2024-01-01", Some("2024-01-10"), 100.0),
            record("b", "2024-01-05", None, 200.0),
        ];
        let totals = compute_totals(&records);
        assert_eq!(totals.total_spent, 300.0);
        assert_eq!(totals.avg_spent, 150.0);
        assert_eq!(totals.avg_duration_days, 9);
        assert_eq!(records[1].status(), crate::record::Status::Active);
    }
}
