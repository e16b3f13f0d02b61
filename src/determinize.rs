//! Subset construction: turning an [`Nfa`] into an equivalent [`Dfa`].

use std::collections::VecDeque;

use log::{debug, trace};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::alphabet::Symbol;
use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::state::{canonical_label, StateId, StateSet};

/// The DFA built by [`subset_construction`] together with the NFA states each
/// of its states stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetConstruction {
    pub dfa: Dfa,
    /// `state_sets[i]` is the set of NFA states behind DFA state `i`.
    pub state_sets: Vec<StateSet>,
}

impl SubsetConstruction {
    pub fn state_set(&self, state: StateId) -> &StateSet {
        &self.state_sets[state.index()]
    }

    pub fn into_dfa(self) -> Dfa {
        self.dfa
    }
}

pub fn determinize(nfa: &Nfa) -> Dfa {
    subset_construction(nfa).into_dfa()
}

/// Explores the sets of NFA states reachable from `{initial}` breadth-first,
/// naming them `q0, q1, ...` in the order they are discovered. Symbols are
/// tried in alphabet order, so the numbering only depends on the input.
///
/// An empty successor set produces no transition, leaving the DFA partial
/// wherever every branch of the NFA would be stuck. In the worst case the DFA
/// has `2^n` states for an NFA with `n` states.
pub fn subset_construction(nfa: &Nfa) -> SubsetConstruction {
    let initial_set = StateSet::from([nfa.get_initial_state()]);
    let mut state_sets: Vec<StateSet> = vec![initial_set.clone()];
    let mut registry: HashMap<StateSet, StateId> = HashMap::default();
    registry.insert(initial_set, StateId::new(0));

    let mut transitions: HashMap<StateId, HashMap<Symbol, StateId>> = HashMap::default();
    let mut worklist: VecDeque<StateId> = VecDeque::from([StateId::new(0)]);

    while let Some(current_state) = worklist.pop_front() {
        for symbol in nfa.alphabet().iter() {
            let next_set = nfa.next_states(&state_sets[current_state.index()], symbol);
            if next_set.is_empty() {
                continue;
            }
            let next_state = match registry.get(&next_set) {
                Some(state) => *state,
                None => {
                    let state = StateId::new(state_sets.len());
                    trace!(
                        "discovered {} = {{{}}}",
                        canonical_label(state.index()),
                        labels_of(nfa, &next_set).join(", ")
                    );
                    registry.insert(next_set.clone(), state);
                    state_sets.push(next_set);
                    worklist.push_back(state);
                    state
                }
            };
            transitions
                .entry(current_state)
                .or_default()
                .insert(symbol, next_state);
        }
    }

    let final_states: HashSet<StateId> = state_sets
        .iter()
        .enumerate()
        .filter(|(_, set)| nfa.contains_final_state(set))
        .map(|(index, _)| StateId::new(index))
        .collect();
    let labels: Vec<String> = (0..state_sets.len()).map(canonical_label).collect();
    debug!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.num_states(),
        labels.len()
    );

    SubsetConstruction {
        dfa: Dfa::from_parts(
            labels,
            nfa.alphabet().clone(),
            StateId::new(0),
            final_states,
            transitions,
        ),
        state_sets,
    }
}

fn labels_of<'a>(nfa: &'a Nfa, states: &StateSet) -> Vec<&'a str> {
    states.iter().map(|state| nfa.label(*state)).collect()
}
