//! The Errors that may occur within the crate.

use thiserror::Error;

use crate::alphabet::Symbol;

pub type Result<T, E = crate::Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    // Structural errors, reported by `verify`
    #[error("No initial state was set")]
    MissingInitialState,
    #[error("Initial state {0} is not a known state")]
    UnknownInitialState(String),
    #[error("Final state {0} is not a known state")]
    UnknownFinalState(String),
    #[error("Transition source {0} is not a known state")]
    UnknownTransitionSource(String),
    #[error("Transition from {0} uses symbol {1:?} outside the alphabet")]
    UnknownSymbol(String, Symbol),
    #[error("Transition from {0} on {1:?} leads to unknown state {2}")]
    UnknownTransitionTarget(String, Symbol, String),
    #[error("Inconsistent automaton: {0}")]
    InconsistentAutomaton(String),
    // Text format errors
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEndOfInput(&'static str),
    #[error("Expected a count, found {0:?}")]
    InvalidCount(String),
    #[error("Expected a single-character symbol, found {0:?}")]
    InvalidSymbol(String),
    #[error("Unexpected trailing input {0:?}")]
    TrailingInput(String),
    // Binary format errors
    #[error("Serialization failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Deserialization failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

impl Error {
    /// Whether the error reports an automaton that references unknown states or
    /// symbols, or lacks a valid initial state.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingInitialState
                | Self::UnknownInitialState(_)
                | Self::UnknownFinalState(_)
                | Self::UnknownTransitionSource(_)
                | Self::UnknownSymbol(..)
                | Self::UnknownTransitionTarget(..)
                | Self::InconsistentAutomaton(_)
        )
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEndOfInput(_)
                | Self::InvalidCount(_)
                | Self::InvalidSymbol(_)
                | Self::TrailingInput(_)
        )
    }
}

#[cfg(feature = "python-bindings")]
impl From<Error> for pyo3::PyErr {
    fn from(e: Error) -> Self {
        use pyo3::exceptions::PyValueError;
        use pyo3::PyErr;
        PyErr::new::<PyValueError, _>(e.to_string())
    }
}
