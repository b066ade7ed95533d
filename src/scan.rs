// SPDX-License-Identifier: MIT

//! Multi-start scanning: running a pattern from every candidate position of
//! a row stream.
//!
//! One [`Simulation`] covers one start position; this module drives a fresh
//! first-match simulation per candidate start and decides, via
//! [`SkipPolicy`], where the next candidate begins after a match. Stream and
//! policy are explicit parameters, so the same compiled automaton and guard
//! set can scan any number of streams concurrently.

use crate::common::row::Row;
use crate::pattern::guard::{GuardError, GuardSet};
use crate::pattern::nfa::Nfa;
use crate::pattern::sim::{Match, MatchMode, Simulation};

/// Where the next scan starts after a match is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// Advance one row past the match's start; overlapping matches are
    /// reported.
    #[default]
    NextRow,
    /// Advance past the last row the match consumed. A match that consumed
    /// no rows advances by one row so the scan always makes progress.
    PastMatch,
}

/// A match found by [`scan_stream`], tagged with the stream index it
/// started from.
#[derive(Debug, Clone)]
pub struct StreamMatch<'r> {
    start: usize,
    matched: Match<'r>,
}

impl<'r> StreamMatch<'r> {
    /// Index of the row the scan producing this match started at.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The match itself.
    #[must_use]
    pub const fn matched(&self) -> &Match<'r> {
        &self.matched
    }
}

/// Scans `rows` for the pattern from every candidate start position.
///
/// Runs a first-match simulation starting at each position; a position with
/// no match advances by one row, a position with a match advances according
/// to `skip`. Matches are returned in start order.
///
/// # Errors
///
/// The first [`GuardError`] raised by any simulation aborts the whole scan.
/// Callers preferring "no match from this position" over abort can scan
/// positions individually with [`Simulation`].
pub fn scan_stream<'r>(
    nfa: &Nfa,
    guards: &GuardSet,
    rows: &'r [Row],
    skip: SkipPolicy,
) -> Result<Vec<StreamMatch<'r>>, GuardError> {
    let mut found = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let window = &rows[start..];
        let sim = Simulation::new(nfa, guards)?;
        let matches = sim.run(window, MatchMode::First)?;
        let Some(matched) = matches.into_iter().next() else {
            start += 1;
            continue;
        };

        let advance = match skip {
            SkipPolicy::NextRow => 1,
            SkipPolicy::PastMatch => matched.last_row().map_or(1, |last| {
                window
                    .iter()
                    .position(|r| std::ptr::eq(r, last))
                    .map_or(1, |idx| idx + 1)
            }),
        };
        found.push(StreamMatch { start, matched });
        start += advance;
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::timestamp::MICROS_PER_MINUTE;
    use crate::pattern::guard::{all_of, category_is, near, wildcard, within_minutes_of};
    use crate::pattern::nfa::compile;
    use crate::pattern::parser::parse;

    fn automaton(pattern: &str) -> Nfa {
        compile(&parse(pattern).unwrap()).unwrap()
    }

    fn row(id: i64, ts_min: i64, category: &str, lat: f64, lon: f64) -> Row {
        Row::new(id, ts_min * MICROS_PER_MINUTE, category, lat, lon)
    }

    fn pairs(found: &[StreamMatch<'_>]) -> Vec<(usize, Vec<(char, i64)>)> {
        found
            .iter()
            .map(|m| (m.start(), m.matched().pairs().collect()))
            .collect()
    }

    #[test]
    fn test_next_row_reports_overlapping_matches() {
        let rows = vec![
            row(1, 0, "A", 0.0, 0.0),
            row(2, 1, "A", 0.0, 0.0),
            row(3, 2, "A", 0.0, 0.0),
        ];
        let nfa = automaton("AA");
        let mut guards = GuardSet::new();
        guards.register('A', wildcard());

        let found = scan_stream(&nfa, &guards, &rows, SkipPolicy::NextRow).unwrap();
        assert_eq!(
            pairs(&found),
            vec![
                (0, vec![('A', 1), ('A', 2)]),
                (1, vec![('A', 2), ('A', 3)]),
            ]
        );
    }

    #[test]
    fn test_past_match_skips_consumed_rows() {
        let rows = vec![
            row(1, 0, "A", 0.0, 0.0),
            row(2, 1, "A", 0.0, 0.0),
            row(3, 2, "A", 0.0, 0.0),
        ];
        let nfa = automaton("AA");
        let mut guards = GuardSet::new();
        guards.register('A', wildcard());

        let found = scan_stream(&nfa, &guards, &rows, SkipPolicy::PastMatch).unwrap();
        assert_eq!(pairs(&found), vec![(0, vec![('A', 1), ('A', 2)])]);
    }

    #[test]
    fn test_zero_binding_match_still_makes_progress() {
        // Z* matches immediately at every position without consuming rows;
        // PastMatch must fall back to single-row advancement.
        let rows = vec![row(1, 0, "X", 0.0, 0.0), row(2, 1, "X", 0.0, 0.0)];
        let nfa = automaton("Z*");
        let mut guards = GuardSet::new();
        guards.register('Z', category_is("NEVER"));

        let found = scan_stream(&nfa, &guards, &rows, SkipPolicy::PastMatch).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.matched().is_empty()));
        assert_eq!(found[0].start(), 0);
        assert_eq!(found[1].start(), 1);
    }

    #[test]
    fn test_match_after_leading_noise() {
        let rows = vec![
            row(7, 0, "THEFT", 40.0, -88.0),
            row(8, 1, "ASSAULT", 40.1, -88.1),
            row(1, 10, "ROBBERY", 41.10, -87.50),
            row(2, 15, "BATTERY", 41.12, -87.51),
            row(3, 20, "MOTOR VEHICLE THEFT", 41.11, -87.53),
        ];
        let nfa = automaton("RZ*BZ*M");
        let mut guards = GuardSet::new();
        guards.register('R', category_is("ROBBERY"));
        guards.register(
            'B',
            all_of(vec![category_is("BATTERY"), near('R', 0.02, 0.05)]),
        );
        guards.register(
            'M',
            all_of(vec![
                category_is("MOTOR VEHICLE THEFT"),
                near('R', 0.02, 0.05),
                within_minutes_of('R', 30),
            ]),
        );
        guards.register('Z', wildcard());

        let found = scan_stream(&nfa, &guards, &rows, SkipPolicy::PastMatch).unwrap();
        assert_eq!(pairs(&found), vec![(2, vec![('R', 1), ('B', 2), ('M', 3)])]);
    }

    #[test]
    fn test_empty_stream_yields_no_matches() {
        let nfa = automaton("Z*");
        let mut guards = GuardSet::new();
        guards.register('Z', wildcard());
        let found = scan_stream(&nfa, &guards, &[], SkipPolicy::NextRow).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_guard_error_aborts_whole_scan() {
        let rows = vec![row(1, 0, "A", 0.0, 0.0)];
        let nfa = automaton("A");
        let mut guards = GuardSet::new();
        guards.register('A', near('Q', 0.1, 0.1));
        assert_eq!(
            scan_stream(&nfa, &guards, &rows, SkipPolicy::NextRow).unwrap_err(),
            GuardError::UnboundVariable('Q')
        );
    }
}
