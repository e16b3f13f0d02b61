//! Provides tools and interfaces to integrate the crate's functionality with Python.

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::builder::{DfaBuilder, NfaBuilder};
use crate::determinize::determinize;
use crate::dfa::Dfa;
use crate::evaluator::Evaluate;
use crate::minimize::minimize;
use crate::nfa::Nfa;
use crate::text::{parse_dfa, parse_nfa};

#[pyclass(name = "DFA", module = "finite_automata.finite_automata_rs")]
#[derive(Clone, Debug, PartialEq)]
pub struct PyDfa(Arc<Dfa>);

#[pyclass(name = "NFA", module = "finite_automata.finite_automata_rs")]
#[derive(Clone, Debug, PartialEq)]
pub struct PyNfa(Arc<Nfa>);

fn map_serialization_error(what: &str, e: crate::Error) -> PyErr {
    PyErr::new::<PyValueError, _>(format!("{} failed: {}", what, e))
}

#[pymethods]
impl PyDfa {
    /// Reads a DFA in the text format and validates it.
    #[new]
    fn __new__(py: Python<'_>, text: &str) -> PyResult<Self> {
        py.allow_threads(|| {
            parse_dfa(text)
                .map(|x| PyDfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    /// Whether the text describes a structurally consistent DFA.
    #[staticmethod]
    fn validate(text: &str) -> PyResult<bool> {
        Ok(text.parse::<DfaBuilder>()?.validate())
    }

    fn evaluate(&self, word: &str) -> &'static str {
        self.0.evaluate(word).as_str()
    }

    fn accepts(&self, word: &str) -> bool {
        self.0.accepts(word)
    }

    fn minimize(&self, py: Python<'_>) -> PyDfa {
        py.allow_threads(|| PyDfa(Arc::new(minimize(&self.0))))
    }

    fn get_states(&self) -> Vec<String> {
        self.0.labels().to_vec()
    }

    fn get_symbols(&self) -> Vec<char> {
        self.0.alphabet().iter().collect()
    }

    fn get_initial_state(&self) -> String {
        self.0.label(self.0.get_initial_state()).to_owned()
    }

    fn get_final_states(&self) -> Vec<String> {
        self.0
            .states()
            .filter(|state| self.0.is_final_state(*state))
            .map(|state| self.0.label(state).to_owned())
            .collect()
    }

    fn get_next_state(&self, state: &str, symbol: char) -> Option<String> {
        let state = self.0.state_id(state)?;
        let next = self.0.next_state(state, symbol)?;
        Some(self.0.label(next).to_owned())
    }

    fn is_total(&self) -> bool {
        self.0.is_total()
    }

    fn to_text(&self) -> String {
        self.0.to_text()
    }

    fn formal(&self) -> String {
        self.0.formal()
    }

    fn __len__(&self) -> usize {
        self.0.num_states()
    }

    fn __repr__(&self) -> String {
        format!("{:#?}", self.0)
    }

    fn __str__(&self) -> String {
        format!("{}", self.0)
    }

    fn __eq__(&self, other: &PyDfa) -> bool {
        *self.0 == *other.0
    }

    fn __deepcopy__(&self, _py: Python<'_>, _memo: Py<PyDict>) -> Self {
        PyDfa(Arc::new((*self.0).clone()))
    }

    fn __reduce__(&self) -> PyResult<(PyObject, (Vec<u8>,))> {
        Python::with_gil(|py| {
            let cls = PyModule::import(py, "finite_automata.finite_automata_rs")?.getattr("DFA")?;
            let binary_data: Vec<u8> = self
                .0
                .to_binary()
                .map_err(|e| map_serialization_error("Serialization of DFA", e))?;
            Ok((cls.getattr("from_binary")?.unbind(), (binary_data,)))
        })
    }

    #[staticmethod]
    fn from_binary(binary_data: Vec<u8>) -> PyResult<Self> {
        let dfa = Dfa::from_binary(&binary_data[..])
            .map_err(|e| map_serialization_error("Deserialization of DFA", e))?;
        Ok(PyDfa(Arc::new(dfa)))
    }
}

#[pymethods]
impl PyNfa {
    /// Reads an NFA in the text format and validates it.
    #[new]
    fn __new__(py: Python<'_>, text: &str) -> PyResult<Self> {
        py.allow_threads(|| {
            parse_nfa(text)
                .map(|x| PyNfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    /// Whether the text describes a structurally consistent NFA.
    #[staticmethod]
    fn validate(text: &str) -> PyResult<bool> {
        Ok(text.parse::<NfaBuilder>()?.validate())
    }

    fn evaluate(&self, word: &str) -> &'static str {
        self.0.evaluate(word).as_str()
    }

    fn accepts(&self, word: &str) -> bool {
        self.0.accepts(word)
    }

    fn determinize(&self, py: Python<'_>) -> PyDfa {
        py.allow_threads(|| PyDfa(Arc::new(determinize(&self.0))))
    }

    fn get_states(&self) -> Vec<String> {
        self.0.labels().to_vec()
    }

    fn get_symbols(&self) -> Vec<char> {
        self.0.alphabet().iter().collect()
    }

    fn get_initial_state(&self) -> String {
        self.0.label(self.0.get_initial_state()).to_owned()
    }

    fn get_final_states(&self) -> Vec<String> {
        self.0
            .states()
            .filter(|state| self.0.is_final_state(*state))
            .map(|state| self.0.label(state).to_owned())
            .collect()
    }

    fn get_next_states(&self, state: &str, symbol: char) -> Vec<String> {
        match self.0.state_id(state) {
            Some(state) => self
                .0
                .successors(state, symbol)
                .iter()
                .map(|next| self.0.label(*next).to_owned())
                .collect(),
            None => Vec::new(),
        }
    }

    fn to_text(&self) -> String {
        self.0.to_text()
    }

    fn formal(&self) -> String {
        self.0.formal()
    }

    fn __len__(&self) -> usize {
        self.0.num_states()
    }

    fn __repr__(&self) -> String {
        format!("{:#?}", self.0)
    }

    fn __str__(&self) -> String {
        format!("{}", self.0)
    }

    fn __eq__(&self, other: &PyNfa) -> bool {
        *self.0 == *other.0
    }

    fn __deepcopy__(&self, _py: Python<'_>, _memo: Py<PyDict>) -> Self {
        PyNfa(Arc::new((*self.0).clone()))
    }

    fn __reduce__(&self) -> PyResult<(PyObject, (Vec<u8>,))> {
        Python::with_gil(|py| {
            let cls = PyModule::import(py, "finite_automata.finite_automata_rs")?.getattr("NFA")?;
            let binary_data: Vec<u8> = self
                .0
                .to_binary()
                .map_err(|e| map_serialization_error("Serialization of NFA", e))?;
            Ok((cls.getattr("from_binary")?.unbind(), (binary_data,)))
        })
    }

    #[staticmethod]
    fn from_binary(binary_data: Vec<u8>) -> PyResult<Self> {
        let nfa = Nfa::from_binary(&binary_data[..])
            .map_err(|e| map_serialization_error("Deserialization of NFA", e))?;
        Ok(PyNfa(Arc::new(nfa)))
    }
}

#[pymodule]
fn finite_automata_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDfa>()?;
    m.add_class::<PyNfa>()?;

    Ok(())
}
