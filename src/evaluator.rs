//! Running words through automata.

use std::fmt;

use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::state::StateSet;

/// Outcome of reading a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Evaluation {
    /// The whole word was read and the automaton is in a final state.
    Accept,
    /// The whole word was read but no final state was reached.
    Reject,
    /// Some symbol had no transition, so the word could not be read to the end.
    Frozen,
}

impl Evaluation {
    pub fn is_accepted(self) -> bool {
        self == Evaluation::Accept
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Evaluation::Accept => "accept",
            Evaluation::Reject => "reject",
            Evaluation::Frozen => "frozen",
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Evaluate {
    fn evaluate(&self, word: &str) -> Evaluation;

    fn accepts(&self, word: &str) -> bool {
        self.evaluate(word).is_accepted()
    }
}

impl Evaluate for Dfa {
    fn evaluate(&self, word: &str) -> Evaluation {
        match self.get_state_sequence(word).and_then(|seq| seq.last().copied()) {
            Some(state) if self.is_final_state(state) => Evaluation::Accept,
            Some(_) => Evaluation::Reject,
            None => Evaluation::Frozen,
        }
    }
}

impl Evaluate for Nfa {
    /// Tracks the set of states every branch can be in after each symbol.
    ///
    /// The word is accepted if some branch ends in a final state. It is frozen
    /// when every branch has run out of transitions before the end of the word.
    fn evaluate(&self, word: &str) -> Evaluation {
        let mut current: StateSet = StateSet::from([self.get_initial_state()]);
        for symbol in word.chars() {
            current = self.next_states(&current, symbol);
            if current.is_empty() {
                return Evaluation::Frozen;
            }
        }
        if self.contains_final_state(&current) {
            Evaluation::Accept
        } else {
            Evaluation::Reject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DfaBuilder, NfaBuilder};

    #[test]
    fn nfa_outcomes_are_three_way() {
        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["q0", "q1", "q2"])
            .insert_symbols(['a', 'b'])
            .insert_transition("q0", 'a', "q0")
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q1", 'b', "q2")
            .set_initial_state("q0")
            .insert_final_state("q2");
        let nfa = builder.build().unwrap();
        assert_eq!(nfa.evaluate("ab"), Evaluation::Accept);
        assert_eq!(nfa.evaluate("aaab"), Evaluation::Accept);
        assert_eq!(nfa.evaluate("b"), Evaluation::Frozen);
        assert_eq!(nfa.evaluate("aa"), Evaluation::Reject);
        assert_eq!(nfa.evaluate(""), Evaluation::Reject);
        assert_eq!(nfa.evaluate("abb"), Evaluation::Frozen);
        assert!(nfa.accepts("aab"));
    }

    #[test]
    fn one_live_branch_keeps_the_nfa_running() {
        // q1 dies on 'a' but q0 keeps going.
        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["q0", "q1"])
            .insert_symbol('a')
            .insert_transition("q0", 'a', "q0")
            .insert_transition("q0", 'a', "q1")
            .set_initial_state("q0")
            .insert_final_state("q1");
        let nfa = builder.build().unwrap();
        assert_eq!(nfa.evaluate("aaaa"), Evaluation::Accept);
        assert_eq!(nfa.evaluate(""), Evaluation::Reject);
    }

    #[test]
    fn long_words_do_not_grow_the_stack() {
        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["q0", "q1"])
            .insert_symbol('a')
            .insert_transition("q0", 'a', "q0")
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q1", 'a', "q0")
            .insert_transition("q1", 'a', "q1")
            .set_initial_state("q0")
            .insert_final_state("q1");
        let nfa = builder.build().unwrap();
        let word = "a".repeat(100_000);
        assert_eq!(nfa.evaluate(&word), Evaluation::Accept);
    }

    #[test]
    fn dfa_distinguishes_frozen_from_reject() {
        let mut builder = DfaBuilder::new();
        builder
            .insert_states(["q0", "q1"])
            .insert_symbols(['a', 'b'])
            .insert_transition("q0", 'a', "q1")
            .insert_transition("q1", 'a', "q0")
            .set_initial_state("q0")
            .insert_final_state("q1");
        let dfa = builder.build().unwrap();
        assert_eq!(dfa.evaluate("a"), Evaluation::Accept);
        assert_eq!(dfa.evaluate("aa"), Evaluation::Reject);
        assert_eq!(dfa.evaluate(""), Evaluation::Reject);
        assert_eq!(dfa.evaluate("ab"), Evaluation::Frozen);
        // symbols outside the alphabet have no transition either
        assert_eq!(dfa.evaluate("c"), Evaluation::Frozen);
        assert_eq!(Evaluation::Frozen.to_string(), "frozen");
    }
}
