//! # Finite_Automata
//!
//! `finite_automata` crate validates and runs NFAs and DFAs, turns NFAs into
//! DFAs by subset construction, and minimizes DFAs with the table-filling method.

pub mod alphabet;
pub mod builder;
pub mod determinize;
pub mod dfa;
pub mod error;
pub mod evaluator;
pub mod minimize;
pub mod nfa;
pub mod state;
pub mod text;

pub use alphabet::{Alphabet, Symbol};
pub use builder::{DfaBuilder, NfaBuilder};
pub use determinize::{determinize, subset_construction, SubsetConstruction};
pub use dfa::Dfa;
pub use error::{Error, Result};
pub use evaluator::{Evaluate, Evaluation};
pub use minimize::{minimize, table_filling, Minimization};
pub use nfa::Nfa;
pub use state::{StateId, StateSet};
pub use text::{parse_dfa, parse_nfa};

#[cfg(feature = "python-bindings")]
mod python_bindings;
