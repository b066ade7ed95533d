// SPDX-License-Identifier: MIT

//! Breadth-first simulation of a pattern automaton over a row stream.
//!
//! The simulation advances a set of concurrent partial matches ("runs"),
//! each carrying the ordered variable-to-row bindings it has made. Per row:
//! runs sitting at a variable transition evaluate that variable's guard with
//! their bindings and the candidate row; acceptance forks a new run with an
//! extended binding sequence, rejection drops the run for that row. Between
//! rows, epsilon closure expands every run across epsilon edges, keeping
//! only runs that are completed (accept state) or waiting at a variable
//! transition, and discarding duplicates.
//!
//! A simulation is single-use: one instance covers one scan from one start
//! position. Multi-start scanning lives in [`crate::scan`].

use std::collections::VecDeque;

use crate::common::row::Row;

use super::guard::{Binding, GuardError, GuardSet};
use super::nfa::{Nfa, StateId, Transition};

/// A partial match: a current state plus the bindings made so far.
#[derive(Debug, Clone)]
struct Run<'r> {
    state: StateId,
    bindings: Vec<Binding<'r>>,
}

impl Run<'_> {
    /// Two runs are duplicates when they sit at the same state with the
    /// same bindings, compared by (variable, row id) pairs in order.
    fn same_as(&self, other: &Self) -> bool {
        self.state == other.state
            && self.bindings.len() == other.bindings.len()
            && self
                .bindings
                .iter()
                .zip(&other.bindings)
                .all(|(a, b)| a.var == b.var && a.row.id == b.row.id)
    }
}

/// A completed match: the full binding sequence of an accepted run, in
/// pattern-consumption order.
#[derive(Debug, Clone)]
pub struct Match<'r> {
    bindings: Vec<Binding<'r>>,
}

impl<'r> Match<'r> {
    /// The ordered bindings of the match.
    #[must_use]
    pub fn bindings(&self) -> &[Binding<'r>] {
        &self.bindings
    }

    /// The match as ordered (variable, row id) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (char, i64)> + '_ {
        self.bindings.iter().map(|b| (b.var, b.row.id))
    }

    /// True when the match bound no rows (possible for patterns like `Z*`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The last row the match consumed, if it consumed any.
    #[must_use]
    pub fn last_row(&self) -> Option<&'r Row> {
        self.bindings.last().map(|b| b.row)
    }
}

/// Whether a scan stops at the first completed match or exhausts the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Stop as soon as any run reaches the accept state.
    First,
    /// Consume the whole stream and collect every accepted run.
    All,
}

/// One scan of a row stream against a compiled automaton and its guards.
#[derive(Debug)]
pub struct Simulation<'n, 'r> {
    nfa: &'n Nfa,
    guards: &'n GuardSet,
    current: Vec<Run<'r>>,
    matches: Vec<Match<'r>>,
}

impl<'n, 'r> Simulation<'n, 'r> {
    /// Builds a simulation, checking that every variable the automaton uses
    /// has a registered guard, and seeds the initial run set (one empty run
    /// at the start state, epsilon-closed).
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::MissingGuard`] for the first automaton variable
    /// the guard set does not cover.
    pub fn new(nfa: &'n Nfa, guards: &'n GuardSet) -> Result<Self, GuardError> {
        for var in nfa.variables() {
            if !guards.contains(var) {
                return Err(GuardError::MissingGuard(var));
            }
        }
        let mut sim = Self {
            nfa,
            guards,
            current: Vec::new(),
            matches: Vec::new(),
        };
        let initial = Run {
            state: nfa.start(),
            bindings: Vec::new(),
        };
        sim.current = sim.closure(vec![initial]);
        Ok(sim)
    }

    /// Runs the scan over `rows`, consuming the simulation.
    ///
    /// The stream is consumed in order. Accepted runs are harvested before
    /// each row and once more at stream exhaustion, so a match completing on
    /// the final row is reported. Under [`MatchMode::First`] the scan stops
    /// at the first harvest that yields a match.
    ///
    /// # Errors
    ///
    /// The first [`GuardError`] raised by a guard aborts the scan.
    pub fn run(mut self, rows: &'r [Row], mode: MatchMode) -> Result<Vec<Match<'r>>, GuardError> {
        self.harvest();
        if mode == MatchMode::First && !self.matches.is_empty() {
            return Ok(self.matches);
        }

        for row in rows {
            if self.current.is_empty() {
                break;
            }
            self.consume(row)?;
            self.harvest();
            if mode == MatchMode::First && !self.matches.is_empty() {
                break;
            }
        }
        Ok(self.matches)
    }

    /// Moves completed runs out of the current set into the match list.
    fn harvest(&mut self) {
        let accept = self.nfa.accept();
        let mut remaining = Vec::with_capacity(self.current.len());
        for run in self.current.drain(..) {
            if run.state == accept {
                self.matches.push(Match {
                    bindings: run.bindings,
                });
            } else {
                remaining.push(run);
            }
        }
        self.current = remaining;
    }

    /// Advances every waiting run against one row and closes over the forks.
    fn consume(&mut self, row: &'r Row) -> Result<(), GuardError> {
        let mut forked: Vec<Run<'r>> = Vec::new();
        for run in self.current.drain(..) {
            for trans in self.nfa.states()[run.state].transitions() {
                let Transition::Var { to, name } = *trans else {
                    continue;
                };
                let guard = self.guards.get(name).ok_or(GuardError::MissingGuard(name))?;
                if guard(&run.bindings, row)? {
                    let mut bindings = run.bindings.clone();
                    bindings.push(Binding { var: name, row });
                    forked.push(Run {
                        state: to,
                        bindings,
                    });
                }
            }
        }
        self.current = self.closure(forked);
        Ok(())
    }

    /// Epsilon closure over a run set.
    ///
    /// Expands each seed breadth-first along epsilon edges (bindings are
    /// unchanged by epsilon moves, so the walk only tracks states), keeping
    /// runs that are completed or waiting at a variable transition. A
    /// per-seed visited set makes epsilon cycles (star loops) terminate;
    /// duplicates against the output set are dropped, which also makes the
    /// closure idempotent.
    ///
    /// Dedup compares full binding sequences, so runs differing only in
    /// absorbed wildcard rows stay distinct; the run set can grow with the
    /// number of wildcard-absorbable rows.
    fn closure(&self, seeds: Vec<Run<'r>>) -> Vec<Run<'r>> {
        let mut out: Vec<Run<'r>> = Vec::new();
        for seed in seeds {
            let mut visited = vec![false; self.nfa.len()];
            let mut queue = VecDeque::new();
            visited[seed.state] = true;
            queue.push_back(seed.state);

            while let Some(state_id) = queue.pop_front() {
                let state = &self.nfa.states()[state_id];
                let waiting = state
                    .transitions()
                    .any(|t| matches!(t, Transition::Var { .. }));
                if state_id == self.nfa.accept() || waiting {
                    let candidate = Run {
                        state: state_id,
                        bindings: seed.bindings.clone(),
                    };
                    if !out.iter().any(|r| r.same_as(&candidate)) {
                        out.push(candidate);
                    }
                }
                for trans in state.transitions() {
                    if let Transition::Epsilon(to) = *trans {
                        if !visited[to] {
                            visited[to] = true;
                            queue.push_back(to);
                        }
                    }
                }
            }
        }
        out
    }
}
