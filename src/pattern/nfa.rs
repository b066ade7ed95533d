// SPDX-License-Identifier: MIT

//! Nondeterministic finite automaton built structurally from a pattern AST.
//!
//! Each AST node compiles to a small sub-automaton; composition appends the
//! sub-automaton's states into the result and rewrites their transition
//! targets by a fixed offset. All offset arithmetic is centralized in
//! [`State::shifted`] / [`Nfa::append_shifted`] so each composition rule
//! stays a direct transcription of its construction diagram.
//!
//! Every constructed automaton satisfies three invariants, checked where
//! they could be violated and re-verified by a final validation pass:
//!
//! - exactly one start state (index 0) and one accept state (the last index),
//! - no state has more than two outgoing transitions,
//! - every transition target is a valid index of the same automaton.

use std::fmt;

use super::parser::Ast;

/// Index of a state within its automaton.
///
/// States are only ever referenced by index, never by independent identity,
/// which is what makes sub-automaton composition a copy-and-shift.
pub type StateId = usize;

/// One outgoing edge of a state.
///
/// Variable transitions carry only the variable name; the predicate that
/// gates them lives in a [`GuardSet`](super::guard::GuardSet) resolved by
/// name at simulation time, so the automaton itself stays immutable and
/// cloneable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Consumes no row; the run moves to `0`-th field target directly.
    Epsilon(StateId),
    /// Consumes one row, binding it to `name`, if the guard accepts.
    Var {
        /// Target state.
        to: StateId,
        /// The row-variable this edge binds.
        name: char,
    },
}

impl Transition {
    /// The state this transition leads to.
    #[must_use]
    pub const fn target(&self) -> StateId {
        match self {
            Self::Epsilon(to) | Self::Var { to, .. } => *to,
        }
    }

    /// The same transition with its target shifted by `offset` places.
    const fn shifted(self, offset: usize) -> Self {
        match self {
            Self::Epsilon(to) => Self::Epsilon(to + offset),
            Self::Var { to, name } => Self::Var {
                to: to + offset,
                name,
            },
        }
    }
}

/// An automaton state: at most two outgoing transitions.
///
/// The two-slot fan-out is a construction invariant, not a convenience: the
/// grammar's composition rules never need more than two edges per state,
/// and a third is a hard [`ConstructionError`].
#[derive(Debug, Clone, Default)]
pub struct State {
    out: [Option<Transition>; 2],
}

impl State {
    /// Iterates the state's outgoing transitions in slot order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.out.iter().flatten()
    }

    /// Number of occupied transition slots.
    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.out.iter().flatten().count()
    }

    fn shifted(&self, offset: usize) -> Self {
        Self {
            out: [
                self.out[0].map(|t| t.shifted(offset)),
                self.out[1].map(|t| t.shifted(offset)),
            ],
        }
    }
}

/// Error raised when automaton construction violates an internal invariant.
///
/// Indicates a bug in the parser/builder coupling; always fatal and no
/// partial automaton is usable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionError {
    /// A state would receive a third outgoing transition.
    FanOutExceeded {
        /// The over-full state.
        state: StateId,
    },
    /// A transition references a state outside the automaton.
    InvalidTarget {
        /// The state holding the bad transition.
        from: StateId,
        /// The out-of-range target.
        to: StateId,
    },
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FanOutExceeded { state } => {
                write!(f, "state {state} already has 2 outgoing transitions")
            }
            Self::InvalidTarget { from, to } => {
                write!(f, "state {from} has a transition to invalid state {to}")
            }
        }
    }
}

impl std::error::Error for ConstructionError {}

/// A compiled pattern automaton.
///
/// Immutable once built: the simulation shares it by reference across any
/// number of scans.
#[derive(Debug, Clone)]
pub struct Nfa {
    start: StateId,
    accept: StateId,
    states: Vec<State>,
}

impl Nfa {
    /// The unique start state.
    #[must_use]
    pub const fn start(&self) -> StateId {
        self.start
    }

    /// The unique accept state.
    #[must_use]
    pub const fn accept(&self) -> StateId {
        self.accept
    }

    /// All states, indexed by [`StateId`].
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when the automaton has no states (never the case once compiled).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every variable name appearing on a transition, with repeats.
    pub fn variables(&self) -> impl Iterator<Item = char> + '_ {
        self.states.iter().flat_map(|s| {
            s.transitions().filter_map(|t| match t {
                Transition::Var { name, .. } => Some(*name),
                Transition::Epsilon(_) => None,
            })
        })
    }

    fn empty() -> Self {
        Self {
            start: 0,
            accept: 0,
            states: Vec::new(),
        }
    }

    fn new_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn add_transition(&mut self, from: StateId, trans: Transition) -> Result<(), ConstructionError> {
        let state = &mut self.states[from];
        if let Some(slot) = state.out.iter_mut().find(|s| s.is_none()) {
            *slot = Some(trans);
            Ok(())
        } else {
            Err(ConstructionError::FanOutExceeded { state: from })
        }
    }

    /// Appends all of `other`'s states, shifting every transition target by
    /// `offset`, and returns `other`'s (start, accept) under the new
    /// numbering. `offset` must equal the index at which `other`'s first
    /// state lands.
    fn append_shifted(&mut self, other: &Self, offset: usize) -> (StateId, StateId) {
        debug_assert_eq!(offset, self.states.len());
        for state in &other.states {
            self.states.push(state.shifted(offset));
        }
        (other.start + offset, other.accept + offset)
    }

    /// Checks that every transition target is a valid index.
    fn validate(&self) -> Result<(), ConstructionError> {
        for (from, state) in self.states.iter().enumerate() {
            for trans in state.transitions() {
                let to = trans.target();
                if to >= self.states.len() {
                    return Err(ConstructionError::InvalidTarget { from, to });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "accept: {}", self.accept)?;
        for (id, state) in self.states.iter().enumerate() {
            if state.fan_out() == 0 {
                continue;
            }
            write!(f, "state {id}:")?;
            for (i, trans) in state.transitions().enumerate() {
                let sep = if i == 0 { ' ' } else { ',' };
                match trans {
                    Transition::Epsilon(to) => write!(f, "{sep}eps -> {to}")?,
                    Transition::Var { to, name } => write!(f, "{sep}'{name}' -> {to}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compiles a pattern AST into its automaton.
///
/// Walks the tree bottom-up: `Var` nodes compile directly, combinators
/// compile their children and compose the results. A final validation pass
/// re-checks that every transition target is in range.
///
/// # Errors
///
/// Returns [`ConstructionError`] if any composition would violate the
/// fan-out or target invariants. With a correct parser this is unreachable,
/// but it is checked rather than assumed.
pub fn compile(ast: &Ast) -> Result<Nfa, ConstructionError> {
    let nfa = build(ast)?;
    nfa.validate()?;
    Ok(nfa)
}

fn build(ast: &Ast) -> Result<Nfa, ConstructionError> {
    match ast {
        Ast::Var(name) => var_nfa(*name),
        Ast::Concat(left, right) => concat_nfa(build(left)?, build(right)?),
        Ast::Alt(left, right) => union_nfa(&build(left)?, &build(right)?),
        Ast::Star(child) => star_nfa(&build(child)?),
        // At least one occurrence, then zero-or-more of a fresh copy.
        Ast::Plus(child) => {
            let body = build(child)?;
            let tail = star_nfa(&body)?;
            concat_nfa(body, tail)
        }
        Ast::Optional(child) => union_nfa(&epsilon_nfa()?, &build(child)?),
    }
}

/// Two states joined by a single guarded variable transition.
fn var_nfa(name: char) -> Result<Nfa, ConstructionError> {
    let mut nfa = Nfa::empty();
    let start = nfa.new_state();
    let accept = nfa.new_state();
    nfa.add_transition(start, Transition::Var { to: accept, name })?;
    nfa.start = start;
    nfa.accept = accept;
    Ok(nfa)
}

/// Two states joined by a single epsilon transition (used by `Optional`).
fn epsilon_nfa() -> Result<Nfa, ConstructionError> {
    let mut nfa = Nfa::empty();
    let start = nfa.new_state();
    let accept = nfa.new_state();
    nfa.add_transition(start, Transition::Epsilon(accept))?;
    nfa.start = start;
    nfa.accept = accept;
    Ok(nfa)
}

/// Sequencing: `b`'s start state is merged into `a`'s accept state.
///
/// `a`'s accept adopts `b`'s start transitions (shifted by `a`'s size minus
/// one) and becomes the shared junction; the rest of `b` is appended after
/// it. Relies on every constructed automaton having start 0 and accept at
/// the last index, which all six rules maintain.
fn concat_nfa(a: Nfa, b: Nfa) -> Result<Nfa, ConstructionError> {
    debug_assert_eq!(a.start, 0);
    debug_assert_eq!(a.accept, a.states.len() - 1);
    debug_assert_eq!(b.start, 0);

    let mut result = a;
    let offset = result.states.len() - 1;
    let junction = result.accept;

    let mut b_states = b.states.into_iter();
    if let Some(b_start) = b_states.next() {
        for trans in b_start.transitions() {
            result.add_transition(junction, trans.shifted(offset))?;
        }
    }
    for state in b_states {
        result.states.push(state.shifted(offset));
    }

    result.accept = result.states.len() - 1;
    Ok(result)
}

/// Alternation: a new start forks into both branches via epsilon edges and
/// both accepts feed a new shared accept.
fn union_nfa(a: &Nfa, b: &Nfa) -> Result<Nfa, ConstructionError> {
    let mut result = Nfa::empty();
    let start = result.new_state();
    let (a_start, a_accept) = result.append_shifted(a, 1);
    let b_offset = result.states.len();
    let (b_start, b_accept) = result.append_shifted(b, b_offset);
    let accept = result.new_state();

    result.add_transition(start, Transition::Epsilon(a_start))?;
    result.add_transition(start, Transition::Epsilon(b_start))?;
    result.add_transition(a_accept, Transition::Epsilon(accept))?;
    result.add_transition(b_accept, Transition::Epsilon(accept))?;

    result.start = start;
    result.accept = accept;
    Ok(result)
}

/// Zero-or-more: the classic loop-with-bypass. The new start can enter the
/// body or skip straight to the new accept; the body's accept can loop back
/// or exit. The back edge is the one place the automaton stops being a DAG.
fn star_nfa(body: &Nfa) -> Result<Nfa, ConstructionError> {
    let mut result = Nfa::empty();
    let start = result.new_state();
    let (body_start, body_accept) = result.append_shifted(body, 1);
    let accept = result.new_state();

    result.add_transition(start, Transition::Epsilon(body_start))?;
    result.add_transition(start, Transition::Epsilon(accept))?;
    result.add_transition(body_accept, Transition::Epsilon(body_start))?;
    result.add_transition(body_accept, Transition::Epsilon(accept))?;

    result.start = start;
    result.accept = accept;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parser::parse;

    fn compiled(pattern: &str) -> Nfa {
        compile(&parse(pattern).unwrap()).unwrap()
    }

    /// Structural invariants every compiled automaton must satisfy.
    fn assert_invariants(nfa: &Nfa) {
        assert_eq!(nfa.start(), 0, "start must be the first state");
        assert_eq!(
            nfa.accept(),
            nfa.len() - 1,
            "accept must be the last state"
        );
        assert_eq!(
            nfa.states()[nfa.accept()].fan_out(),
            0,
            "accept state must have no outgoing transitions"
        );
        for (id, state) in nfa.states().iter().enumerate() {
            assert!(state.fan_out() <= 2, "state {id} exceeds fan-out 2");
            for trans in state.transitions() {
                assert!(trans.target() < nfa.len(), "state {id} target out of range");
            }
        }
    }

    // --- Per-rule composition tests ---

    #[test]
    fn test_var_rule() {
        let nfa = compiled("A");
        assert_eq!(nfa.len(), 2);
        assert_invariants(&nfa);
        let trans = nfa.states()[0].transitions().next().unwrap();
        match trans {
            Transition::Var { to, name } => {
                assert_eq!(*to, 1);
                assert_eq!(*name, 'A');
            }
            Transition::Epsilon(_) => panic!("expected Var transition"),
        }
    }

    #[test]
    fn test_concat_rule_merges_junction() {
        // Two 2-state automata share the junction state: 3 states total.
        let nfa = compiled("AB");
        assert_eq!(nfa.len(), 3);
        assert_invariants(&nfa);
        // The junction (state 1) carries B's variable edge.
        let trans = nfa.states()[1].transitions().next().unwrap();
        match trans {
            Transition::Var { to, name } => {
                assert_eq!(*to, 2);
                assert_eq!(*name, 'B');
            }
            Transition::Epsilon(_) => panic!("expected Var transition at junction"),
        }
    }

    #[test]
    fn test_union_rule() {
        // New start + 2 states per branch + new accept = 6.
        let nfa = compiled("A|B");
        assert_eq!(nfa.len(), 6);
        assert_invariants(&nfa);
        assert_eq!(nfa.states()[nfa.start()].fan_out(), 2);
        let targets: Vec<StateId> = nfa.states()[nfa.start()]
            .transitions()
            .map(Transition::target)
            .collect();
        assert_eq!(targets, vec![1, 3]);
    }

    #[test]
    fn test_star_rule_has_cycle() {
        // New start + body (2) + new accept = 4, with a back edge.
        let nfa = compiled("A*");
        assert_eq!(nfa.len(), 4);
        assert_invariants(&nfa);
        // Body accept (state 2) loops back to body start (state 1).
        let back: Vec<StateId> = nfa.states()[2]
            .transitions()
            .map(Transition::target)
            .collect();
        assert!(back.contains(&1), "star must loop back to the body");
        assert!(back.contains(&3), "star must also exit to accept");
        // Bypass: start goes straight to accept as well.
        let from_start: Vec<StateId> = nfa.states()[0]
            .transitions()
            .map(Transition::target)
            .collect();
        assert!(from_start.contains(&3), "star must allow zero iterations");
    }

    #[test]
    fn test_plus_rule_is_concat_of_body_and_star() {
        // Body (2 states) concat star-of-copy (4 states) sharing one: 5.
        let nfa = compiled("A+");
        assert_eq!(nfa.len(), 5);
        assert_invariants(&nfa);
        // Two Var edges for 'A': the mandatory one and the loop copy.
        assert_eq!(nfa.variables().filter(|&v| v == 'A').count(), 2);
    }

    #[test]
    fn test_optional_rule_is_union_with_epsilon() {
        // Union of epsilon automaton (2) and body (2): 2 + 2 + 2 = 6.
        let nfa = compiled("A?");
        assert_eq!(nfa.len(), 6);
        assert_invariants(&nfa);
        assert_eq!(nfa.variables().count(), 1);
    }

    // --- Whole-pattern structure ---

    #[test]
    fn test_crime_pattern_invariants() {
        let nfa = compiled("RZ*BZ*M");
        assert_invariants(&nfa);
        let mut vars: Vec<char> = nfa.variables().collect();
        vars.sort_unstable();
        assert_eq!(vars, vec!['B', 'M', 'R', 'Z', 'Z']);
    }

    #[test]
    fn test_nested_quantifiers_invariants() {
        for pattern in ["(A|B)*", "(AB)+C?", "((A|B)+|C*)D", "A?B?C?"] {
            assert_invariants(&compiled(pattern));
        }
    }

    #[test]
    fn test_fan_out_exceeded_is_detected() {
        let mut nfa = Nfa::empty();
        let s = nfa.new_state();
        let t = nfa.new_state();
        nfa.add_transition(s, Transition::Epsilon(t)).unwrap();
        nfa.add_transition(s, Transition::Epsilon(t)).unwrap();
        assert_eq!(
            nfa.add_transition(s, Transition::Epsilon(t)),
            Err(ConstructionError::FanOutExceeded { state: s })
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_target() {
        let mut nfa = Nfa::empty();
        let s = nfa.new_state();
        nfa.add_transition(s, Transition::Epsilon(7)).unwrap();
        assert_eq!(
            nfa.validate(),
            Err(ConstructionError::InvalidTarget { from: 0, to: 7 })
        );
    }

    #[test]
    fn test_display_dump() {
        let nfa = compiled("A");
        let dump = nfa.to_string();
        assert!(dump.contains("start: 0"));
        assert!(dump.contains("accept: 1"));
        assert!(dump.contains("'A' -> 1"));
    }

    #[test]
    fn test_construction_error_display() {
        let err = ConstructionError::FanOutExceeded { state: 4 };
        assert_eq!(err.to_string(), "state 4 already has 2 outgoing transitions");
        let _: &dyn std::error::Error = &err;
    }
}
