//! Validated deterministic finite automata.
//!
//! The transition function is partial: a missing entry for `(state, symbol)`
//! means the automaton has no move there, which is not the same thing as a
//! move into a non-accepting state.

use std::collections::VecDeque;
use std::fmt;

use bincode::{config, Decode, Encode};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::alphabet::{Alphabet, Symbol};
use crate::state::{check_state, StateId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Dfa {
    labels: Vec<String>,
    alphabet: Alphabet,
    initial_state: StateId,
    final_states: HashSet<StateId>,
    transitions: HashMap<StateId, HashMap<Symbol, StateId>>,
}

impl Dfa {
    pub(crate) fn from_parts(
        labels: Vec<String>,
        alphabet: Alphabet,
        initial_state: StateId,
        final_states: HashSet<StateId>,
        transitions: HashMap<StateId, HashMap<Symbol, StateId>>,
    ) -> Self {
        Self {
            labels,
            alphabet,
            initial_state,
            final_states,
            transitions,
        }
    }

    pub fn num_states(&self) -> usize {
        self.labels.len()
    }

    pub fn states(&self) -> impl ExactSizeIterator<Item = StateId> {
        (0..self.labels.len()).map(StateId::new)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn label(&self, state: StateId) -> &str {
        &self.labels[state.index()]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn state_id(&self, label: &str) -> Option<StateId> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(StateId::new)
    }

    pub fn get_initial_state(&self) -> StateId {
        self.initial_state
    }

    pub fn is_initial_state(&self, state: StateId) -> bool {
        state == self.initial_state
    }

    pub fn get_final_states(&self) -> &HashSet<StateId> {
        &self.final_states
    }

    pub fn is_final_state(&self, state: StateId) -> bool {
        self.final_states.contains(&state)
    }

    pub fn get_transitions(&self) -> &HashMap<StateId, HashMap<Symbol, StateId>> {
        &self.transitions
    }

    pub fn next_state(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        Some(*self.transitions.get(&state)?.get(&symbol)?)
    }

    /// The states visited while reading `word`, starting with the initial
    /// state, or `None` if some step is undefined.
    pub fn get_state_sequence(&self, word: &str) -> Option<Vec<StateId>> {
        let mut state = self.initial_state;
        let mut seq = vec![state];
        for symbol in word.chars() {
            state = self.next_state(state, symbol)?;
            seq.push(state);
        }
        Some(seq)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(HashMap::len).sum()
    }

    /// All defined transitions, ordered by state and then symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.states().flat_map(move |state| {
            self.alphabet
                .iter()
                .filter_map(move |symbol| Some((state, symbol, self.next_state(state, symbol)?)))
        })
    }

    /// The `(state, symbol)` pairs without a transition.
    pub fn undefined_transitions(&self) -> impl Iterator<Item = (StateId, Symbol)> + '_ {
        self.states().flat_map(move |state| {
            self.alphabet
                .iter()
                .filter(move |symbol| self.next_state(state, *symbol).is_none())
                .map(move |symbol| (state, symbol))
        })
    }

    /// Whether every state has a transition on every symbol.
    pub fn is_total(&self) -> bool {
        self.undefined_transitions().next().is_none()
    }

    /// States reachable from the initial state, in breadth-first order.
    pub fn reachable_states(&self) -> Vec<StateId> {
        let mut seen: HashSet<StateId> = HashSet::from_iter([self.initial_state]);
        let mut order = vec![self.initial_state];
        let mut queue: VecDeque<StateId> = VecDeque::from([self.initial_state]);
        while let Some(current_state) = queue.pop_front() {
            for symbol in self.alphabet.iter() {
                if let Some(next_state) = self.next_state(current_state, symbol) {
                    if seen.insert(next_state) {
                        order.push(next_state);
                        queue.push_back(next_state);
                    }
                }
            }
        }
        order
    }

    /// The `M = ({states}, {symbols}, d, q0, {finals})` tuple notation.
    pub fn formal(&self) -> String {
        let states: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        let symbols: Vec<String> = self.alphabet.iter().map(String::from).collect();
        let finals: Vec<&str> = self
            .states()
            .filter(|state| self.is_final_state(*state))
            .map(|state| self.label(state))
            .collect();
        let mut out = format!(
            "M = ({{{}}}, {{{}}}, d, {}, {{{}}})\nd = {{\n",
            states.join(", "),
            symbols.join(", "),
            self.label(self.initial_state),
            finals.join(", ")
        );
        for (state, symbol, target) in self.transitions() {
            out.push_str(&format!(
                "\t({}, {}) -> {}\n",
                self.label(state),
                symbol,
                self.label(target)
            ));
        }
        out.push_str("}\n");
        out
    }

    pub fn to_binary(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    /// Decodes an automaton written by [`Dfa::to_binary`], rejecting payloads
    /// whose handles or symbols do not fit together.
    pub fn from_binary(binary_data: &[u8]) -> Result<Self> {
        let (dfa, _): (Dfa, usize) = bincode::decode_from_slice(binary_data, config::standard())?;
        dfa.check()?;
        Ok(dfa)
    }

    fn check(&self) -> Result<()> {
        let num_states = self.labels.len();
        if !self.alphabet.is_canonical() {
            return Err(Error::InconsistentAutomaton(
                "alphabet is not sorted and unique".to_owned(),
            ));
        }
        check_state(self.initial_state, num_states, "initial state")?;
        for state in &self.final_states {
            check_state(*state, num_states, "final state")?;
        }
        for (source, row) in &self.transitions {
            check_state(*source, num_states, "transition source")?;
            for (symbol, target) in row {
                if !self.alphabet.contains(*symbol) {
                    return Err(Error::InconsistentAutomaton(format!(
                        "transition symbol {:?} outside the alphabet",
                        symbol
                    )));
                }
                check_state(*target, num_states, "transition target")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.labels.iter().map(String::len).max().unwrap_or(0);
        write!(f, "{:width$} ||", "", width = label_width + 3)?;
        for symbol in self.alphabet.iter() {
            write!(f, " {:width$} ", symbol, width = label_width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{}++{}",
            "-".repeat(label_width + 4),
            "-".repeat((label_width + 2) * self.alphabet.len())
        )?;
        for state in self.states() {
            let marker = if self.is_initial_state(state) {
                "->"
            } else if self.is_final_state(state) {
                " *"
            } else {
                "  "
            };
            write!(
                f,
                "{} {:width$} ||",
                marker,
                self.label(state),
                width = label_width
            )?;
            for symbol in self.alphabet.iter() {
                let cell = self.next_state(state, symbol).map_or("", |s| self.label(s));
                write!(f, " {:width$} ", cell, width = label_width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
