//! Incremental construction and structural validation of automata.
//!
//! Builders accept any state label and symbol, so that a loader can feed them
//! whatever it read. Nothing is repaired: [`NfaBuilder::verify`] and
//! [`DfaBuilder::verify`] report the first reference to an unknown state or
//! symbol, and only a builder that verifies can be turned into an [`Nfa`] or a
//! [`Dfa`].

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::alphabet::{Alphabet, Symbol};
use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::state::StateId;
use crate::{Error, Result};

/// States, symbols, initial and final designations common to both builders.
#[derive(Debug, Clone, Default, PartialEq)]
struct Declarations {
    states: Vec<String>,
    state_ids: HashMap<String, StateId>,
    alphabet: Alphabet,
    initial_state: Option<String>,
    final_states: Vec<String>,
}

impl Declarations {
    fn insert_state(&mut self, label: &str) {
        if !self.state_ids.contains_key(label) {
            self.state_ids
                .insert(label.to_owned(), StateId::new(self.states.len()));
            self.states.push(label.to_owned());
        }
    }

    fn insert_final_state(&mut self, label: &str) {
        if !self.final_states.iter().any(|f| f == label) {
            self.final_states.push(label.to_owned());
        }
    }

    fn id(&self, label: &str) -> Option<StateId> {
        self.state_ids.get(label).copied()
    }

    /// Checks the initial state and then every final state.
    fn verify(&self) -> Result<StateId> {
        let initial = self
            .initial_state
            .as_deref()
            .ok_or(Error::MissingInitialState)?;
        let initial_id = self
            .id(initial)
            .ok_or_else(|| Error::UnknownInitialState(initial.to_owned()))?;
        for label in &self.final_states {
            if self.id(label).is_none() {
                return Err(Error::UnknownFinalState(label.clone()));
            }
        }
        Ok(initial_id)
    }

    fn verify_transition(&self, source: &str, symbol: Symbol, target: &str) -> Result<()> {
        if self.id(source).is_none() {
            return Err(Error::UnknownTransitionSource(source.to_owned()));
        }
        if !self.alphabet.contains(symbol) {
            return Err(Error::UnknownSymbol(source.to_owned(), symbol));
        }
        if self.id(target).is_none() {
            return Err(Error::UnknownTransitionTarget(
                source.to_owned(),
                symbol,
                target.to_owned(),
            ));
        }
        Ok(())
    }

    fn final_ids(&self) -> HashSet<StateId> {
        self.final_states
            .iter()
            .filter_map(|label| self.id(label))
            .collect()
    }
}

macro_rules! declaration_methods {
    () => {
        pub fn insert_state(&mut self, label: &str) -> &mut Self {
            self.decl.insert_state(label);
            self
        }

        pub fn insert_states<'a, I>(&mut self, labels: I) -> &mut Self
        where
            I: IntoIterator<Item = &'a str>,
        {
            for label in labels {
                self.decl.insert_state(label);
            }
            self
        }

        pub fn insert_symbol(&mut self, symbol: Symbol) -> &mut Self {
            self.decl.alphabet.insert(symbol);
            self
        }

        pub fn insert_symbols<I: IntoIterator<Item = Symbol>>(&mut self, symbols: I) -> &mut Self {
            self.decl.alphabet.extend(symbols);
            self
        }

        pub fn set_initial_state(&mut self, label: &str) -> &mut Self {
            self.decl.initial_state = Some(label.to_owned());
            self
        }

        pub fn insert_final_state(&mut self, label: &str) -> &mut Self {
            self.decl.insert_final_state(label);
            self
        }

        pub fn insert_final_states<'a, I>(&mut self, labels: I) -> &mut Self
        where
            I: IntoIterator<Item = &'a str>,
        {
            for label in labels {
                self.decl.insert_final_state(label);
            }
            self
        }

        pub fn states(&self) -> &[String] {
            &self.decl.states
        }

        pub fn alphabet(&self) -> &Alphabet {
            &self.decl.alphabet
        }

        pub fn initial_state(&self) -> Option<&str> {
            self.decl.initial_state.as_deref()
        }

        pub fn final_states(&self) -> &[String] {
            &self.decl.final_states
        }

        /// Whether every referenced state and symbol has been declared.
        pub fn validate(&self) -> bool {
            self.verify().is_ok()
        }
    };
}

/// Collects the pieces of an NFA.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NfaBuilder {
    decl: Declarations,
    transitions: Vec<(String, Symbol, String)>,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    declaration_methods!();

    /// Adds `target` to the successors of `source` on `symbol`.
    pub fn insert_transition(&mut self, source: &str, symbol: Symbol, target: &str) -> &mut Self {
        self.transitions
            .push((source.to_owned(), symbol, target.to_owned()));
        self
    }

    pub fn transitions(&self) -> &[(String, Symbol, String)] {
        &self.transitions
    }

    /// Reports the first structural problem, checking the initial state, the
    /// final states, and then each transition in insertion order.
    pub fn verify(&self) -> Result<()> {
        self.decl.verify()?;
        for (source, symbol, target) in &self.transitions {
            self.decl.verify_transition(source, *symbol, target)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Nfa> {
        self.verify()?;
        let initial_state = self.decl.verify()?;
        let mut transitions: HashMap<StateId, HashMap<Symbol, Vec<StateId>>> = HashMap::default();
        for (source, symbol, target) in &self.transitions {
            let (Some(source), Some(target)) = (self.decl.id(source), self.decl.id(target)) else {
                continue;
            };
            let targets = transitions
                .entry(source)
                .or_default()
                .entry(*symbol)
                .or_default();
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Ok(Nfa::from_parts(
            self.decl.states.clone(),
            self.decl.alphabet.clone(),
            initial_state,
            self.decl.final_ids(),
            transitions,
        ))
    }
}

/// Collects the pieces of a DFA.
///
/// Only the first target inserted for a `(state, symbol)` pair is kept, later
/// ones are ignored; [`DfaBuilder::has_transition`] lets a loader detect this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DfaBuilder {
    decl: Declarations,
    transitions: Vec<(String, Symbol, String)>,
    defined: HashSet<(String, Symbol)>,
}

impl DfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    declaration_methods!();

    pub fn insert_transition(&mut self, source: &str, symbol: Symbol, target: &str) -> &mut Self {
        if self.defined.insert((source.to_owned(), symbol)) {
            self.transitions
                .push((source.to_owned(), symbol, target.to_owned()));
        }
        self
    }

    pub fn has_transition(&self, source: &str, symbol: Symbol) -> bool {
        self.defined.contains(&(source.to_owned(), symbol))
    }

    pub fn transitions(&self) -> &[(String, Symbol, String)] {
        &self.transitions
    }

    /// Reports the first structural problem, checking the initial state, the
    /// final states, and then each transition in insertion order.
    pub fn verify(&self) -> Result<()> {
        self.decl.verify()?;
        for (source, symbol, target) in &self.transitions {
            self.decl.verify_transition(source, *symbol, target)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Dfa> {
        self.verify()?;
        let initial_state = self.decl.verify()?;
        let mut transitions: HashMap<StateId, HashMap<Symbol, StateId>> = HashMap::default();
        for (source, symbol, target) in &self.transitions {
            if let (Some(source), Some(target)) = (self.decl.id(source), self.decl.id(target)) {
                transitions.entry(source).or_default().insert(*symbol, target);
            }
        }
        Ok(Dfa::from_parts(
            self.decl.states.clone(),
            self.decl.alphabet.clone(),
            initial_state,
            self.decl.final_ids(),
            transitions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dfa() -> DfaBuilder {
        let mut builder = DfaBuilder::new();
        builder
            .insert_states(["q0", "q1"])
            .insert_symbols(['a', 'b'])
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q1", 'b', "q0")
            .set_initial_state("q0")
            .insert_final_state("q1");
        builder
    }

    #[test]
    fn accepts_consistent_automata() {
        let builder = valid_dfa();
        assert!(builder.validate());
        let dfa = builder.build().unwrap();
        assert_eq!(dfa.num_states(), 2);
        assert_eq!(dfa.transition_count(), 2);
    }

    #[test]
    fn missing_initial_state_is_invalid() {
        let mut builder = NfaBuilder::new();
        builder.insert_state("q0").insert_symbol('a');
        assert!(!builder.validate());
        assert!(matches!(builder.verify(), Err(Error::MissingInitialState)));
    }

    #[test]
    fn unknown_initial_state_is_reported_first() {
        let mut builder = valid_dfa();
        builder
            .set_initial_state("q9")
            .insert_final_state("q8")
            .insert_transition("q7", 'a', "q0");
        match builder.verify() {
            Err(Error::UnknownInitialState(label)) => assert_eq!(label, "q9"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unknown_final_state_is_reported_before_transitions() {
        let mut builder = valid_dfa();
        builder
            .insert_final_state("q8")
            .insert_transition("q7", 'a', "q0");
        assert!(matches!(builder.verify(), Err(Error::UnknownFinalState(l)) if l == "q8"));
    }

    #[test]
    fn transition_checks_source_then_symbol_then_target() {
        let mut builder = valid_dfa();
        builder.insert_transition("q7", 'z', "q9");
        assert!(matches!(builder.verify(), Err(Error::UnknownTransitionSource(l)) if l == "q7"));

        let mut builder = valid_dfa();
        builder.insert_transition("q0", 'z', "q9");
        assert!(matches!(builder.verify(), Err(Error::UnknownSymbol(l, 'z')) if l == "q0"));

        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["q0", "q1"])
            .insert_symbol('a')
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q0", 'a', "q5")
            .set_initial_state("q0");
        let err = builder.verify().unwrap_err();
        assert!(err.is_structural());
        assert!(matches!(err, Error::UnknownTransitionTarget(s, 'a', t) if s == "q0" && t == "q5"));
    }

    #[test]
    fn invalid_builders_do_not_build() {
        let mut builder = valid_dfa();
        builder.insert_transition("q0", 'b', "nowhere");
        assert!(!builder.validate());
        assert!(builder.build().is_err());
    }

    #[test]
    fn first_dfa_transition_wins() {
        let mut builder = valid_dfa();
        assert!(builder.has_transition("q0", 'a'));
        assert!(!builder.has_transition("q0", 'b'));
        builder.insert_transition("q0", 'a', "q0");
        let dfa = builder.build().unwrap();
        let q0 = dfa.state_id("q0").unwrap();
        let q1 = dfa.state_id("q1").unwrap();
        assert_eq!(dfa.next_state(q0, 'a'), Some(q1));
    }

    #[test]
    fn repeated_declarations_are_merged() {
        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["q0", "q1", "q0"])
            .insert_symbols(['a', 'a'])
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q0", 'a', "q1")
            .set_initial_state("q0")
            .insert_final_states(["q1", "q1"]);
        assert_eq!(builder.states().len(), 2);
        assert_eq!(builder.final_states().len(), 1);
        let nfa = builder.build().unwrap();
        assert_eq!(nfa.transition_count(), 1);
        assert_eq!(nfa.alphabet().len(), 1);
    }
}
