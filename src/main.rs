// SPDX-License-Identifier: MIT

//! Command-line driver: compiles a pattern, binds the crime-sequence
//! guards, and scans a row stream, printing each match as `VAR -> ROW` lines.
//!
//! Rows come from a CSV file (`id,M/D/YYYY H:MM,category,lat,lon`) or, when
//! no file is given, from a small built-in sample of incident records.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use rowpattern::common::row::{sort_rows, Row};
use rowpattern::common::timestamp::parse_datetime;
use rowpattern::pattern::guard::{all_of, category_is, near, wildcard, within_minutes_of};
use rowpattern::pattern::{compile_pattern, GuardSet};
use rowpattern::scan::{scan_stream, SkipPolicy};

/// Built-in sample stream, in the same CSV form `--rows` files use.
const SAMPLE_ROWS: &str = "\
2,1/2/2018 5:35,ROBBERY,41.10,-87.50
3,1/2/2018 5:40,BURGLARY,41.34,-87.57
4,1/2/2018 5:45,ROBBERY,41.13,-87.55
5,1/2/2018 5:50,ASSAULT,41.25,-87.61
6,1/2/2018 5:55,BATTERY,41.12,-87.51
7,1/2/2018 6:00,NARCOTICS,41.17,-87.59
8,1/2/2018 6:05,MOTOR VEHICLE THEFT,41.11,-87.53
9,1/2/2018 6:10,OTHER OFFENCE,41.18,-87.56
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SkipArg {
    /// Report overlapping matches, advancing one row per match.
    NextRow,
    /// Resume scanning past the last row each match consumed.
    PastMatch,
}

impl From<SkipArg> for SkipPolicy {
    fn from(arg: SkipArg) -> Self {
        match arg {
            SkipArg::NextRow => Self::NextRow,
            SkipArg::PastMatch => Self::PastMatch,
        }
    }
}

/// Match a row pattern against an incident stream.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Pattern text, e.g. `RZ*BZ*M`.
    #[arg(default_value = "RZ*BZ*M")]
    pattern: String,

    /// CSV row file (`id,M/D/YYYY H:MM,category,lat,lon`); the built-in
    /// sample stream is used when omitted.
    #[arg(long)]
    rows: Option<PathBuf>,

    /// Where to resume scanning after a match.
    #[arg(long, value_enum, default_value_t = SkipArg::PastMatch)]
    skip: SkipArg,

    /// Print the compiled automaton before scanning.
    #[arg(long)]
    dump_nfa: bool,
}

fn parse_rows(text: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 {
            bail!("line {}: expected 5 fields, got {}", lineno + 1, fields.len());
        }
        let id: i64 = fields[0]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad row id {:?}", lineno + 1, fields[0]))?;
        let timestamp_us = parse_datetime(fields[1])
            .with_context(|| format!("line {}: bad datetime {:?}", lineno + 1, fields[1]))?;
        let lat: f64 = fields[3]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad latitude {:?}", lineno + 1, fields[3]))?;
        let lon: f64 = fields[4]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad longitude {:?}", lineno + 1, fields[4]))?;
        rows.push(Row::new(id, timestamp_us, fields[2].trim(), lat, lon));
    }
    Ok(rows)
}

/// The crime-sequence guard table: a robbery anchor, then a battery near
/// it, then a motor vehicle theft near it and within half an hour.
/// Variables the pattern uses beyond these are treated as wildcards.
fn crime_guards(variables: impl Iterator<Item = char>) -> GuardSet {
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
    for var in variables {
        if !guards.contains(var) {
            guards.register(var, wildcard());
        }
    }
    guards
}

fn main() -> Result<()> {
    let args = Args::parse();

    let nfa = compile_pattern(&args.pattern)
        .with_context(|| format!("cannot compile pattern {:?}", args.pattern))?;
    if args.dump_nfa {
        print!("{nfa}");
    }

    let text = match &args.rows {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?
        }
        None => SAMPLE_ROWS.to_string(),
    };
    let mut rows = parse_rows(&text)?;
    sort_rows(&mut rows);

    let guards = crime_guards(nfa.variables());
    let found = scan_stream(&nfa, &guards, &rows, args.skip.into())?;

    if found.is_empty() {
        println!("NO MATCH");
        return Ok(());
    }
    for stream_match in &found {
        println!("match at row index {}:", stream_match.start());
        for (var, row_id) in stream_match.matched().pairs() {
            println!("  {var} -> {row_id}");
        }
    }
    println!(
        "{} match{} found",
        found.len(),
        if found.len() == 1 { "" } else { "es" }
    );
    Ok(())
}
