//! State handles shared by NFAs and DFAs.

use std::collections::BTreeSet;
use std::fmt;

use bincode::{Decode, Encode};

use crate::{Error, Result};

/// Dense index of a state inside one automaton.
///
/// Handles are assigned in insertion order, which is also the canonical order
/// used when enumerating state pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct StateId(u32);

impl StateId {
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`; an automaton holds at most
    /// `u32::MAX` states.
    pub fn new(index: usize) -> Self {
        StateId(u32::try_from(index).expect("automaton has more than u32::MAX states"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A set of states with a deterministic iteration order, usable as a map key.
pub type StateSet = BTreeSet<StateId>;

/// Fails unless `state` indexes one of `num_states` states.
pub(crate) fn check_state(state: StateId, num_states: usize, role: &str) -> Result<()> {
    if state.index() < num_states {
        Ok(())
    } else {
        Err(Error::InconsistentAutomaton(format!(
            "{} {} out of {} states",
            role, state, num_states
        )))
    }
}

/// The conventional `q<n>` label given to synthesized states.
pub(crate) fn canonical_label(n: usize) -> String {
    format!("q{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_index_densely() {
        assert_eq!(StateId::new(7).index(), 7);
        assert!(check_state(StateId::new(2), 3, "state").is_ok());
        let err = check_state(StateId::new(3), 3, "initial state").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "more than u32::MAX states")]
    fn refuses_to_alias_handles_past_u32() {
        StateId::new(u32::MAX as usize + 1);
    }
}
