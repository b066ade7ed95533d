// SPDX-License-Identifier: MIT

//! The row record the engine matches over.
//!
//! A row is one entry of the ordered input stream: an identity, a resolved
//! timestamp, a category label, and a spatial position. Rows are immutable
//! once loaded; the simulation only ever borrows them, so a single stream
//! can back any number of concurrent scans.

/// A single record of the input stream.
///
/// `timestamp_us` must already be resolved to microseconds since Unix epoch
/// (see [`crate::common::timestamp::parse_datetime`]); the engine never
/// parses text. Identity (`id`) is what run deduplication and match
/// reporting use to refer to a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Stable identity of the row within its stream.
    pub id: i64,
    /// Timestamp in microseconds since Unix epoch.
    pub timestamp_us: i64,
    /// Category label (e.g. an incident type) guards commonly test.
    pub category: String,
    /// Latitude, decimal degrees.
    pub lat: f64,
    /// Longitude, decimal degrees.
    pub lon: f64,
}

impl Row {
    /// Creates a row from already-resolved fields.
    #[must_use]
    pub fn new(id: i64, timestamp_us: i64, category: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            timestamp_us,
            category: category.into(),
            lat,
            lon,
        }
    }
}

/// Sorts rows by timestamp (ascending) using unstable sort.
///
/// Performs an O(n) presorted check first: streams usually arrive in time
/// order already (the loaders emit them that way), in which case the sort
/// is skipped entirely. Unstable sort is fine because same-timestamp row
/// order carries no matching semantics.
pub fn sort_rows(rows: &mut [Row]) {
    if rows
        .windows(2)
        .all(|w| w[0].timestamp_us <= w[1].timestamp_us)
    {
        return;
    }
    rows.sort_unstable_by_key(|r| r.timestamp_us);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, ts: i64) -> Row {
        Row::new(id, ts, "ASSAULT", 41.0, -87.6)
    }

    #[test]
    fn test_row_fields() {
        let r = Row::new(7, 1_000_000, "ROBBERY", 41.10, -87.50);
        assert_eq!(r.id, 7);
        assert_eq!(r.timestamp_us, 1_000_000);
        assert_eq!(r.category, "ROBBERY");
        assert!((r.lat - 41.10).abs() < f64::EPSILON);
        assert!((r.lon + 87.50).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sort_rows_unsorted() {
        let mut rows = vec![row(1, 300), row(2, 100), row(3, 200)];
        sort_rows(&mut rows);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_rows_presorted_untouched() {
        let mut rows = vec![row(1, 100), row(2, 100), row(3, 200)];
        sort_rows(&mut rows);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        // Equal timestamps count as sorted; order must be preserved.
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_rows_empty_and_single() {
        let mut empty: Vec<Row> = vec![];
        sort_rows(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![row(1, 42)];
        sort_rows(&mut one);
        assert_eq!(one[0].id, 1);
    }

    #[test]
    fn test_sort_rows_negative_timestamps() {
        let mut rows = vec![row(1, 100), row(2, -200), row(3, 0)];
        sort_rows(&mut rows);
        let ts: Vec<i64> = rows.iter().map(|r| r.timestamp_us).collect();
        assert_eq!(ts, vec![-200, 0, 100]);
    }
}
