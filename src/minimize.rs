//! DFA minimization with the table-filling method.
//!
//! The stages run in a fixed order on a private working copy of the input:
//!
//! 1. states unreachable from the initial state are dropped,
//! 2. a trap state is added if some `(state, symbol)` has no transition,
//! 3. every pair of states that differ in finality is marked,
//! 4. marks are propagated backwards until a full pass changes nothing,
//! 5. unmarked pairs are merged and the quotient automaton is built.
//!
//! Each propagation pass costs `O(n^2 * |alphabet|)` and there are at most
//! `O(n^2)` passes, `n` being the number of states after completion.

use log::{debug, trace};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::alphabet::{Alphabet, Symbol};
use crate::dfa::Dfa;
use crate::state::{canonical_label, StateId};

/// The minimal DFA together with what each stage found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimization {
    pub dfa: Dfa,
    /// Labels of the states dropped as unreachable.
    pub unreachable: Vec<String>,
    /// Label of the trap state, if one had to be added.
    pub trap_state: Option<String>,
    /// Number of propagation passes, including the last one that changed nothing.
    pub passes: usize,
    /// Pairs of states proven distinguishable.
    pub distinguishable: Vec<(String, String)>,
    /// `classes[i]` holds the labels merged into state `i` of the minimal DFA.
    pub classes: Vec<Vec<String>>,
}

impl Minimization {
    pub fn into_dfa(self) -> Dfa {
        self.dfa
    }
}

pub fn minimize(dfa: &Dfa) -> Dfa {
    table_filling(dfa).into_dfa()
}

pub fn table_filling(dfa: &Dfa) -> Minimization {
    let (reachable, unreachable) = ReachablePart::new(dfa);
    let (minimizer, trap_state) = reachable.complete();
    let mut table = PairTable::new(minimizer.labels.len());
    minimizer.mark_final_pairs(&mut table);
    let passes = minimizer.propagate(&mut table);
    let class_of = minimizer.partition(&table);
    let distinguishable = table
        .marked_pairs()
        .map(|(p, q)| (minimizer.labels[p].clone(), minimizer.labels[q].clone()))
        .collect();
    let (dfa, classes) = minimizer.quotient(&class_of);
    debug!(
        "minimization: {} classes after {} passes",
        classes.len(),
        passes
    );
    Minimization {
        dfa,
        unreachable,
        trap_state,
        passes,
        distinguishable,
        classes,
    }
}

/// Marks for every unordered pair of distinct states, stored as a strictly
/// lower-triangular bit table. Marks are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PairTable {
    size: usize,
    marks: Vec<bool>,
}

impl PairTable {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            marks: vec![false; size * size.saturating_sub(1) / 2],
        }
    }

    fn index(p: usize, q: usize) -> usize {
        let (low, high) = if p < q { (p, q) } else { (q, p) };
        high * (high - 1) / 2 + low
    }

    pub(crate) fn is_marked(&self, p: usize, q: usize) -> bool {
        p != q && self.marks[Self::index(p, q)]
    }

    /// Returns `true` if the pair was not marked before.
    pub(crate) fn mark(&mut self, p: usize, q: usize) -> bool {
        debug_assert_ne!(p, q);
        let slot = &mut self.marks[Self::index(p, q)];
        !std::mem::replace(slot, true)
    }

    /// Marked pairs `(p, q)` with `p < q`, ordered by `q` and then `p`.
    pub(crate) fn marked_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..self.size)
            .flat_map(|q| (0..q).map(move |p| (p, q)))
            .filter(|&(p, q)| self.is_marked(p, q))
    }
}

/// Dense copy of the reachable part of a DFA: states are `0..labels.len()`
/// and `delta[state][symbol]` uses the position of the symbol in the alphabet.
struct ReachablePart {
    labels: Vec<String>,
    finals: Vec<bool>,
    initial: usize,
    alphabet: Alphabet,
    delta: Vec<Vec<Option<usize>>>,
}

impl ReachablePart {
    /// Copies the states reachable from the initial state, keeping their
    /// relative order, and returns the labels of the others.
    fn new(dfa: &Dfa) -> (Self, Vec<String>) {
        let mut reachable = dfa.reachable_states();
        reachable.sort_unstable();
        let position: HashMap<StateId, usize> = reachable
            .iter()
            .enumerate()
            .map(|(index, state)| (*state, index))
            .collect();
        let kept: HashSet<StateId> = reachable.iter().copied().collect();
        let unreachable: Vec<String> = dfa
            .states()
            .filter(|state| !kept.contains(state))
            .map(|state| dfa.label(state).to_owned())
            .collect();
        if !unreachable.is_empty() {
            debug!("removing unreachable states: {}", unreachable.join(", "));
        }

        let alphabet = dfa.alphabet().clone();
        let delta = reachable
            .iter()
            .map(|state| {
                alphabet
                    .iter()
                    .map(|symbol| {
                        // every target of a reachable state is reachable
                        dfa.next_state(*state, symbol)
                            .and_then(|target| position.get(&target).copied())
                    })
                    .collect()
            })
            .collect();
        let part = Self {
            labels: reachable
                .iter()
                .map(|state| dfa.label(*state).to_owned())
                .collect(),
            finals: reachable
                .iter()
                .map(|state| dfa.is_final_state(*state))
                .collect(),
            initial: position[&dfa.get_initial_state()],
            alphabet,
            delta,
        };
        (part, unreachable)
    }

    /// Routes every missing transition to a new non-final trap state that
    /// loops on every symbol. Returns the trap's label, if one was added.
    fn complete(self) -> (Minimizer, Option<String>) {
        let Self {
            mut labels,
            mut finals,
            initial,
            alphabet,
            delta,
        } = self;
        let trap = labels.len();
        let is_total = delta.iter().all(|row| row.iter().all(Option::is_some));
        let trap_label = (!is_total).then(|| fresh_label(&labels, trap));

        let mut delta: Vec<Vec<usize>> = delta
            .into_iter()
            .map(|row| row.into_iter().map(|target| target.unwrap_or(trap)).collect())
            .collect();
        if let Some(label) = &trap_label {
            debug!("adding trap state {}", label);
            delta.push(vec![trap; alphabet.len()]);
            labels.push(label.clone());
            finals.push(false);
        }
        let minimizer = Minimizer {
            labels,
            finals,
            initial,
            alphabet,
            delta,
        };
        (minimizer, trap_label)
    }
}

/// The first `q<k>` with `k >= n` that is not already in `labels`.
fn fresh_label(labels: &[String], mut n: usize) -> String {
    loop {
        let label = canonical_label(n);
        if !labels.contains(&label) {
            return label;
        }
        n += 1;
    }
}

/// A complete working copy: `delta[state][symbol]` is defined everywhere.
struct Minimizer {
    labels: Vec<String>,
    finals: Vec<bool>,
    initial: usize,
    alphabet: Alphabet,
    delta: Vec<Vec<usize>>,
}

impl Minimizer {
    fn target(&self, state: usize, symbol: usize) -> usize {
        self.delta[state][symbol]
    }

    fn mark_final_pairs(&self, table: &mut PairTable) {
        for q in 1..self.labels.len() {
            for p in 0..q {
                if self.finals[p] != self.finals[q] {
                    table.mark(p, q);
                }
            }
        }
    }

    /// Marks `{p, q}` whenever some symbol leads them to a marked pair, until a
    /// whole pass marks nothing new. Returns the number of passes.
    fn propagate(&self, table: &mut PairTable) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for q in 1..self.labels.len() {
                for p in 0..q {
                    if table.is_marked(p, q) {
                        continue;
                    }
                    let distinguished = self.alphabet.iter().enumerate().find(|&(index, _)| {
                        let (next_p, next_q) = (self.target(p, index), self.target(q, index));
                        next_p != next_q && table.is_marked(next_p, next_q)
                    });
                    if let Some((_, symbol)) = distinguished {
                        trace!(
                            "marking ({}, {}) on {:?}",
                            self.labels[p],
                            self.labels[q],
                            symbol
                        );
                        table.mark(p, q);
                        changed = true;
                    }
                }
            }
            if !changed {
                return passes;
            }
        }
    }

    /// Numbers the classes of unmarked pairs by their smallest member.
    fn partition(&self, table: &PairTable) -> Vec<usize> {
        let n = self.labels.len();
        let mut class_of: Vec<Option<usize>> = vec![None; n];
        let mut classes = 0;
        for p in 0..n {
            if class_of[p].is_some() {
                continue;
            }
            class_of[p] = Some(classes);
            for q in p + 1..n {
                if class_of[q].is_none() && !table.is_marked(p, q) {
                    class_of[q] = Some(classes);
                }
            }
            classes += 1;
        }
        class_of.into_iter().map(|class| class.unwrap_or(0)).collect()
    }

    /// Builds the DFA whose states are the classes of `class_of`.
    fn quotient(&self, class_of: &[usize]) -> (Dfa, Vec<Vec<String>>) {
        let num_classes = class_of.iter().max().map_or(0, |max| max + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
        for (state, class) in class_of.iter().enumerate() {
            members[*class].push(state);
        }

        let mut transitions: HashMap<StateId, HashMap<Symbol, StateId>> = HashMap::default();
        let mut final_states: HashSet<StateId> = HashSet::default();
        for (class, states) in members.iter().enumerate() {
            let representative = states[0];
            if self.finals[representative] {
                final_states.insert(StateId::new(class));
            }
            for (index, symbol) in self.alphabet.iter().enumerate() {
                let target = class_of[self.target(representative, index)];
                transitions
                    .entry(StateId::new(class))
                    .or_default()
                    .insert(symbol, StateId::new(target));
            }
        }

        let classes = members
            .iter()
            .map(|states| states.iter().map(|s| self.labels[*s].clone()).collect())
            .collect();
        let dfa = Dfa::from_parts(
            (0..num_classes).map(canonical_label).collect(),
            self.alphabet.clone(),
            StateId::new(class_of[self.initial]),
            final_states,
            transitions,
        );
        (dfa, classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinize::determinize;
    use crate::evaluator::{Evaluate, Evaluation};
    use crate::{DfaBuilder, NfaBuilder};

    fn build(
        states: &[&str],
        symbols: &[char],
        transitions: &[(&str, char, &str)],
        initial: &str,
        finals: &[&str],
    ) -> Dfa {
        let mut builder = DfaBuilder::new();
        builder
            .insert_states(states.iter().copied())
            .insert_symbols(symbols.iter().copied())
            .set_initial_state(initial)
            .insert_final_states(finals.iter().copied());
        for (source, symbol, target) in transitions {
            builder.insert_transition(source, *symbol, target);
        }
        builder.build().unwrap()
    }

    fn words(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut all = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            frontier = frontier
                .iter()
                .flat_map(|w| alphabet.iter().map(move |c| format!("{}{}", w, c)))
                .collect();
            all.extend(frontier.iter().cloned());
        }
        all
    }

    // Textbook example: q0..q4 where {q1, q2} and {q3, q4} collapse.
    fn redundant() -> Dfa {
        build(
            &["q0", "q1", "q2", "q3", "q4"],
            &['0', '1'],
            &[
                ("q0", '0', "q1"),
                ("q0", '1', "q2"),
                ("q1", '0', "q3"),
                ("q1", '1', "q4"),
                ("q2", '0', "q4"),
                ("q2", '1', "q3"),
                ("q3", '0', "q3"),
                ("q3", '1', "q3"),
                ("q4", '0', "q4"),
                ("q4", '1', "q4"),
            ],
            "q0",
            &["q3", "q4"],
        )
    }

    fn partial() -> Dfa {
        build(
            &["q0", "q1", "q2"],
            &['a', 'b'],
            &[("q0", 'a', "q1"), ("q1", 'b', "q2"), ("q2", 'a', "q1")],
            "q0",
            &["q2"],
        )
    }

    #[test]
    fn pair_table_is_symmetric_and_monotone() {
        let mut table = PairTable::new(4);
        assert!(!table.is_marked(2, 1));
        assert!(table.mark(1, 2));
        assert!(!table.mark(2, 1));
        assert!(table.is_marked(1, 2));
        assert!(!table.is_marked(3, 3));
        table.mark(3, 0);
        assert_eq!(table.marked_pairs().collect::<Vec<_>>(), vec![(1, 2), (0, 3)]);
        assert_eq!(PairTable::new(1).marked_pairs().count(), 0);
    }

    #[test]
    fn drops_unreachable_states_without_merging_by_finality() {
        let dfa = build(
            &["q0", "q1", "q2"],
            &['a'],
            &[("q0", 'a', "q1"), ("q1", 'a', "q0"), ("q2", 'a', "q0")],
            "q0",
            &["q1"],
        );
        let result = table_filling(&dfa);
        assert_eq!(result.unreachable, vec!["q2".to_owned()]);
        assert_eq!(result.trap_state, None);
        assert_eq!(result.dfa.num_states(), 2);
        assert_eq!(result.classes, vec![vec!["q0".to_owned()], vec!["q1".to_owned()]]);
        assert_eq!(result.dfa.evaluate("a"), Evaluation::Accept);
        assert_eq!(result.dfa.evaluate("aa"), Evaluation::Reject);
    }

    #[test]
    fn merges_indistinguishable_states() {
        let result = table_filling(&redundant());
        let classes: Vec<Vec<&str>> = result
            .classes
            .iter()
            .map(|class| class.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(classes, vec![vec!["q0"], vec!["q1", "q2"], vec!["q3", "q4"]]);
        let dfa = &result.dfa;
        assert_eq!(dfa.num_states(), 3);
        assert_eq!(dfa.get_initial_state(), StateId::new(0));
        assert_eq!(dfa.get_final_states().len(), 1);
        assert!(dfa.is_final_state(StateId::new(2)));
        assert_eq!(dfa.next_state(StateId::new(0), '1'), Some(StateId::new(1)));
        assert_eq!(dfa.next_state(StateId::new(1), '0'), Some(StateId::new(2)));
        assert!(result
            .distinguishable
            .contains(&("q0".to_owned(), "q1".to_owned())));
        assert!(result.passes >= 2);
    }

    #[test]
    fn completes_partial_automata_with_a_trap() {
        let result = table_filling(&partial());
        assert_eq!(result.trap_state.as_deref(), Some("q3"));
        let dfa = &result.dfa;
        assert!(dfa.is_total());
        assert_eq!(dfa.num_states(), 4);
        assert_eq!(dfa.evaluate("ab"), Evaluation::Accept);
        assert_eq!(dfa.evaluate("abab"), Evaluation::Accept);
        assert_eq!(dfa.evaluate("b"), Evaluation::Reject);
        let trap = result
            .classes
            .iter()
            .position(|class| class.contains(&"q3".to_owned()))
            .unwrap();
        for symbol in ['a', 'b'] {
            assert_eq!(dfa.next_state(StateId::new(trap), symbol), Some(StateId::new(trap)));
        }
    }

    #[test]
    fn completion_routes_every_missing_entry_to_the_trap() {
        let (reachable, unreachable) = ReachablePart::new(&partial());
        assert!(unreachable.is_empty());
        assert_eq!(reachable.delta[0], vec![Some(1), None]);
        let (minimizer, trap_state) = reachable.complete();
        assert_eq!(trap_state.as_deref(), Some("q3"));
        // q0 -a-> q1, q1 -b-> q2, q2 -a-> q1, everything else to the trap q3
        assert_eq!(
            minimizer.delta,
            vec![vec![1, 3], vec![3, 2], vec![1, 3], vec![3, 3]]
        );
        assert_eq!(minimizer.finals, vec![false, false, true, false]);

        let (reachable, _) = ReachablePart::new(&redundant());
        let (minimizer, trap_state) = reachable.complete();
        assert_eq!(trap_state, None);
        assert_eq!(minimizer.labels.len(), 5);
        assert_eq!(minimizer.target(2, 1), 3);
    }

    #[test]
    fn trap_label_avoids_existing_labels() {
        let dfa = build(
            &["q2", "q0"],
            &['a'],
            &[("q2", 'a', "q0")],
            "q2",
            &["q0"],
        );
        let result = table_filling(&dfa);
        assert_eq!(result.trap_state.as_deref(), Some("q3"));
        assert_eq!(result.classes[2], vec!["q3".to_owned()]);
    }

    #[test]
    fn trap_merges_with_an_existing_dead_state() {
        // q2 already behaves like a trap, so completion adds nothing new.
        let dfa = build(
            &["q0", "q1", "q2"],
            &['a', 'b'],
            &[
                ("q0", 'a', "q1"),
                ("q0", 'b', "q2"),
                ("q1", 'a', "q1"),
                ("q2", 'a', "q2"),
                ("q2", 'b', "q2"),
            ],
            "q0",
            &["q1"],
        );
        let result = table_filling(&dfa);
        assert!(result.trap_state.is_some());
        assert_eq!(result.dfa.num_states(), 3);
    }

    #[test]
    fn single_state_is_already_minimal() {
        let dfa = build(&["q0"], &['a'], &[("q0", 'a', "q0")], "q0", &[]);
        let result = table_filling(&dfa);
        assert_eq!(result.passes, 1);
        assert!(result.distinguishable.is_empty());
        assert_eq!(result.dfa, dfa);

        let empty_alphabet = build(&["q0"], &[], &[], "q0", &["q0"]);
        assert_eq!(minimize(&empty_alphabet), empty_alphabet);
    }

    #[test]
    fn minimal_total_automata_come_back_unchanged() {
        let once = minimize(&redundant());
        assert_eq!(minimize(&once), once);
    }

    #[test]
    fn preserves_the_language() {
        for dfa in [redundant(), partial()] {
            let minimal = minimize(&dfa);
            for word in words(dfa.alphabet().as_slice(), 7) {
                assert_eq!(dfa.accepts(&word), minimal.accepts(&word), "word {:?}", word);
            }
        }
        // total automata keep the exact outcome, symbols outside the alphabet included
        let dfa = redundant();
        let minimal = minimize(&dfa);
        for word in words(&['0', '1', '2'], 5) {
            assert_eq!(dfa.evaluate(&word), minimal.evaluate(&word));
        }
    }

    #[test]
    fn result_is_reachable_and_idempotent() {
        for dfa in [redundant(), partial()] {
            let once = minimize(&dfa);
            assert_eq!(once.reachable_states().len(), once.num_states());
            let twice = table_filling(&once);
            assert_eq!(twice.dfa.num_states(), once.num_states());
            assert!(twice.unreachable.is_empty());
            assert_eq!(twice.trap_state, None);
        }
    }

    #[test]
    fn does_not_modify_its_input() {
        let dfa = partial();
        let copy = dfa.clone();
        let _ = minimize(&dfa);
        assert_eq!(dfa, copy);
    }

    #[test]
    fn determinize_then_minimize() {
        // words over {a, b} ending in "ab"
        let mut builder = NfaBuilder::new();
        builder
            .insert_states(["s", "t", "u"])
            .insert_symbols(['a', 'b'])
            .insert_transition("s", 'a', "s")
            .insert_transition("s", 'b', "s")
            .insert_transition("s", 'a', "t")
            .insert_transition("t", 'b', "u")
            .set_initial_state("s")
            .insert_final_state("u");
        let nfa = builder.build().unwrap();
        let minimal = minimize(&determinize(&nfa));
        assert_eq!(minimal.num_states(), 3);
        for word in words(&['a', 'b'], 6) {
            assert_eq!(nfa.accepts(&word), minimal.accepts(&word), "word {:?}", word);
        }
    }
}
