// SPDX-License-Identifier: MIT

//! Named guard predicates attached to pattern variables.
//!
//! A guard decides whether a candidate row may be bound to a variable, given
//! everything the run has bound so far. Guards are kept outside the
//! automaton in a [`GuardSet`] keyed by variable name and resolved when the
//! simulation is set up, so a compiled automaton stays immutable and can be
//! paired with different guard sets.
//!
//! Besides the [`GuardFn`] signature this module provides the small
//! combinator vocabulary the built-in scenarios use: category equality,
//! spatial proximity to an earlier binding, and a time window anchored on
//! an earlier binding.

use std::collections::HashMap;
use std::fmt;

use crate::common::row::Row;
use crate::common::timestamp::MICROS_PER_MINUTE;

/// One variable-to-row assignment made by a run.
///
/// Bindings are ordered by when the run made them; guards receive the full
/// prefix and may look up any earlier variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding<'a> {
    /// The pattern variable.
    pub var: char,
    /// The row bound to it.
    pub row: &'a Row,
}

/// Error raised while resolving or evaluating guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    /// The automaton references a variable the guard set cannot cover.
    MissingGuard(char),
    /// A guard looked up a variable no earlier binding provides.
    UnboundVariable(char),
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGuard(var) => write!(f, "no guard registered for variable '{var}'"),
            Self::UnboundVariable(var) => {
                write!(f, "guard referenced unbound variable '{var}'")
            }
        }
    }
}

impl std::error::Error for GuardError {}

/// The guard signature: bindings made so far, the candidate row, and a
/// verdict (or an evaluation error).
pub type GuardFn = dyn Fn(&[Binding<'_>], &Row) -> Result<bool, GuardError> + Send + Sync;

/// Finds the most recent binding of `var`, for guards that anchor on an
/// earlier variable.
///
/// # Errors
///
/// Returns [`GuardError::UnboundVariable`] if no binding of `var` exists.
pub fn binding_for<'a>(bindings: &[Binding<'a>], var: char) -> Result<&'a Row, GuardError> {
    bindings
        .iter()
        .rev()
        .find(|b| b.var == var)
        .map(|b| b.row)
        .ok_or(GuardError::UnboundVariable(var))
}

/// A set of guards keyed by variable name.
///
/// Coverage is checked when a simulation is built: every variable the
/// automaton uses must have an entry, or setup fails with
/// [`GuardError::MissingGuard`]. Drivers that want permissive variables
/// register [`wildcard`] for them explicitly.
#[derive(Default)]
pub struct GuardSet {
    guards: HashMap<char, Box<GuardFn>>,
}

impl GuardSet {
    /// Creates an empty guard set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the guard for `var`.
    pub fn register(&mut self, var: char, guard: Box<GuardFn>) {
        self.guards.insert(var, guard);
    }

    /// True if `var` has a registered guard.
    #[must_use]
    pub fn contains(&self, var: char) -> bool {
        self.guards.contains_key(&var)
    }

    /// The guard registered for `var`, if any.
    #[must_use]
    pub fn get(&self, var: char) -> Option<&GuardFn> {
        self.guards.get(&var).map(Box::as_ref)
    }

    /// Names of all registered variables.
    pub fn vars(&self) -> impl Iterator<Item = char> + '_ {
        self.guards.keys().copied()
    }
}

impl fmt::Debug for GuardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut vars: Vec<char> = self.vars().collect();
        vars.sort_unstable();
        f.debug_struct("GuardSet").field("vars", &vars).finish()
    }
}

/// A guard that accepts every row.
#[must_use]
pub fn wildcard() -> Box<GuardFn> {
    Box::new(|_bindings, _row| Ok(true))
}

/// A guard that accepts rows whose category equals `label`.
#[must_use]
pub fn category_is(label: impl Into<String>) -> Box<GuardFn> {
    let label = label.into();
    Box::new(move |_bindings, row| Ok(row.category == label))
}

/// A guard that accepts rows within the given latitude/longitude tolerances
/// of the row bound to `anchor`.
#[must_use]
pub fn near(anchor: char, lat_tol: f64, lon_tol: f64) -> Box<GuardFn> {
    Box::new(move |bindings, row| {
        let base = binding_for(bindings, anchor)?;
        Ok((row.lat - base.lat).abs() <= lat_tol && (row.lon - base.lon).abs() <= lon_tol)
    })
}

/// A guard that accepts rows at most `minutes` after the row bound to
/// `anchor` (and never before it).
#[must_use]
pub fn within_minutes_of(anchor: char, minutes: i64) -> Box<GuardFn> {
    let window_us = minutes * MICROS_PER_MINUTE;
    Box::new(move |bindings, row| {
        let base = binding_for(bindings, anchor)?;
        let elapsed = row.timestamp_us - base.timestamp_us;
        Ok((0..=window_us).contains(&elapsed))
    })
}

/// A guard that accepts only when every inner guard accepts.
///
/// Short-circuits on the first rejection; errors from any inner guard
/// propagate.
#[must_use]
pub fn all_of(guards: Vec<Box<GuardFn>>) -> Box<GuardFn> {
    Box::new(move |bindings, row| {
        for guard in &guards {
            if !guard(bindings, row)? {
                return Ok(false);
            }
        }
        Ok(true)
    })
}
