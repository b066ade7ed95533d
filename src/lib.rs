// SPDX-License-Identifier: MIT

//! # `rowpattern` — Row-Pattern Recognition over Ordered Streams
//!
//! Sequential pattern recognition over ordered streams of structured rows,
//! in the spirit of SQL `MATCH_RECOGNIZE` and CEP rule engines. Pattern text
//! over single-character row-variables compiles to a nondeterministic finite
//! automaton, which is simulated against a row stream with guarded,
//! binding-aware transitions.
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Tokenize | [`pattern::lexer`] | Pattern text into a flat token stream |
//! | Parse | [`pattern::parser`] | Tokens into an owned recursive AST |
//! | Construct | [`pattern::nfa`] | AST into a Thompson-style NFA |
//! | Guard | [`pattern::guard`] | Per-variable predicates, resolved by name |
//! | Simulate | [`pattern::sim`] | One scan: runs, bindings, matches |
//! | Scan | [`scan`] | Multi-start scanning with a skip policy |
//!
//! ## Example
//!
//! ```
//! use rowpattern::common::row::Row;
//! use rowpattern::common::timestamp::MICROS_PER_MINUTE;
//! use rowpattern::pattern::guard::{category_is, wildcard, GuardSet};
//! use rowpattern::pattern::compile_pattern;
//! use rowpattern::scan::{scan_stream, SkipPolicy};
//!
//! let rows = vec![
//!     Row::new(1, 0, "ROBBERY", 41.10, -87.50),
//!     Row::new(2, 5 * MICROS_PER_MINUTE, "BATTERY", 41.12, -87.51),
//! ];
//!
//! let nfa = compile_pattern("RZ*B")?;
//! let mut guards = GuardSet::new();
//! guards.register('R', category_is("ROBBERY"));
//! guards.register('B', category_is("BATTERY"));
//! guards.register('Z', wildcard());
//!
//! let found = scan_stream(&nfa, &guards, &rows, SkipPolicy::PastMatch)?;
//! assert_eq!(found.len(), 1);
//! let pairs: Vec<(char, i64)> = found[0].matched().pairs().collect();
//! assert_eq!(pairs, vec![('R', 1), ('B', 2)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod common;
pub mod pattern;
pub mod scan;
