//! Validated nondeterministic finite automata.

use std::fmt;

use bincode::{config, Decode, Encode};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::alphabet::{Alphabet, Symbol};
use crate::state::{check_state, StateId, StateSet};
use crate::{Error, Result};

/// An NFA whose states, symbols and transitions are known to be consistent.
///
/// Values of this type are only produced by [`crate::NfaBuilder::build`] or a
/// checked [`Nfa::from_binary`], so every `StateId` stored here indexes into
/// `labels`.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Nfa {
    labels: Vec<String>,
    alphabet: Alphabet,
    initial_state: StateId,
    final_states: HashSet<StateId>,
    transitions: HashMap<StateId, HashMap<Symbol, Vec<StateId>>>,
}

impl Nfa {
    pub(crate) fn from_parts(
        labels: Vec<String>,
        alphabet: Alphabet,
        initial_state: StateId,
        final_states: HashSet<StateId>,
        transitions: HashMap<StateId, HashMap<Symbol, Vec<StateId>>>,
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

    pub fn get_transitions(&self) -> &HashMap<StateId, HashMap<Symbol, Vec<StateId>>> {
        &self.transitions
    }

    /// The successors of `state` on `symbol`, possibly none.
    pub fn successors(&self, state: StateId, symbol: Symbol) -> &[StateId] {
        self.transitions
            .get(&state)
            .and_then(|trans| trans.get(&symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Union of the successors of every state in `states` on `symbol`.
    pub fn next_states(&self, states: &StateSet, symbol: Symbol) -> StateSet {
        let mut next = StateSet::new();
        for &state in states {
            next.extend(self.successors(state, symbol));
        }
        next
    }

    pub fn contains_final_state(&self, states: &StateSet) -> bool {
        states.iter().any(|state| self.is_final_state(*state))
    }

    /// Number of individual `(source, symbol, destination)` triples.
    pub fn transition_count(&self) -> usize {
        self.transitions
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    /// All non-empty transition entries, ordered by state and then symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, &[StateId])> + '_ {
        self.states().flat_map(move |state| {
            self.alphabet.iter().filter_map(move |symbol| {
                let targets = self.successors(state, symbol);
                (!targets.is_empty()).then_some((state, symbol, targets))
            })
        })
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
        for (state, symbol, targets) in self.transitions() {
            let targets: Vec<&str> = targets.iter().map(|t| self.label(*t)).collect();
            out.push_str(&format!(
                "\t({}, {}) -> {{{}}}\n",
                self.label(state),
                symbol,
                targets.join(", ")
            ));
        }
        out.push_str("}\n");
        out
    }

    pub fn to_binary(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    /// Decodes an automaton written by [`Nfa::to_binary`], rejecting payloads
    /// whose handles or symbols do not fit together.
    pub fn from_binary(binary_data: &[u8]) -> Result<Self> {
        let (nfa, _): (Nfa, usize) = bincode::decode_from_slice(binary_data, config::standard())?;
        nfa.check()?;
        Ok(nfa)
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
            for (symbol, targets) in row {
                if !self.alphabet.contains(*symbol) {
                    return Err(Error::InconsistentAutomaton(format!(
                        "transition symbol {:?} outside the alphabet",
                        symbol
                    )));
                }
                for target in targets {
                    check_state(*target, num_states, "transition target")?;
                }
            }
        }
        Ok(())
    }

    fn cell(&self, state: StateId, symbol: Symbol) -> String {
        let targets = self.successors(state, symbol);
        if targets.is_empty() {
            return String::new();
        }
        let targets: Vec<&str> = targets.iter().map(|t| self.label(*t)).collect();
        format!("{{{}}}", targets.join(","))
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.labels.iter().map(String::len).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .alphabet
            .iter()
            .map(|symbol| {
                self.states()
                    .map(|state| self.cell(state, symbol).len())
                    .max()
                    .unwrap_or(0)
                    .max(1)
            })
            .collect();

        write!(f, "{:width$} ||", "", width = label_width + 3)?;
        for (symbol, width) in self.alphabet.iter().zip(&widths) {
            write!(f, " {:width$} ", symbol, width = *width)?;
        }
        writeln!(f)?;
        write!(f, "{}++", "-".repeat(label_width + 4))?;
        for width in &widths {
            write!(f, "{}", "-".repeat(width + 2))?;
        }
        writeln!(f)?;

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
            for (symbol, width) in self.alphabet.iter().zip(&widths) {
                write!(f, " {:width$} ", self.cell(state, symbol), width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

    use crate::{NfaBuilder, StateId};

    fn sample() -> crate::Nfa {
        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["q0", "q1", "q2"])
            .insert_symbols(['a', 'b'])
            .insert_transition("q0", 'a', "q0")
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q1", 'b', "q2")
            .set_initial_state("q0")
            .insert_final_state("q2");
        builder.build().unwrap()
    }

    #[test]
    fn successor_sets_are_unioned() {
        let nfa = sample();
        let q0 = nfa.state_id("q0").unwrap();
        let q1 = nfa.state_id("q1").unwrap();
        let q2 = nfa.state_id("q2").unwrap();
        assert_eq!(nfa.successors(q0, 'a'), &[q0, q1]);
        assert!(nfa.successors(q0, 'b').is_empty());
        let next = nfa.next_states(&[q0, q1].into_iter().collect(), 'b');
        assert_eq!(next.into_iter().collect::<Vec<_>>(), vec![q2]);
        assert_eq!(nfa.transition_count(), 3);
    }

    #[test]
    fn table_marks_initial_and_final_states() {
        let table = sample().to_string();
        println!("{}", table);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("-> q0"));
        assert!(lines[2].contains("{q0,q1}"));
        assert!(lines[4].starts_with(" * q2"));
    }

    #[test]
    fn formal_notation_lists_every_component() {
        let formal = sample().formal();
        assert!(formal.starts_with("M = ({q0, q1, q2}, {a, b}, d, q0, {q2})"));
        assert!(formal.contains("(q0, a) -> {q0, q1}"));
    }

    #[test]
    fn binary_format_preserves_the_automaton() {
        let nfa = sample();
        let data = nfa.to_binary().unwrap();
        assert_eq!(crate::Nfa::from_binary(&data).unwrap(), nfa);
    }

    #[test]
    fn binary_format_rejects_dangling_targets() {
        let labels = vec!["q0".to_owned(), "q1".to_owned()];
        let finals: HashSet<StateId> = HashSet::from_iter([StateId::new(1)]);
        let transitions: HashMap<StateId, HashMap<char, Vec<StateId>>> = HashMap::from_iter([(
            StateId::new(0),
            HashMap::from_iter([('a', vec![StateId::new(1), StateId::new(9)])]),
        )]);
        let parts = (labels, vec!['a'], StateId::new(0), finals, transitions);
        let data = bincode::encode_to_vec(parts, bincode::config::standard()).unwrap();
        let err = crate::Nfa::from_binary(&data).unwrap_err();
        assert!(err.is_structural());
    }
}
