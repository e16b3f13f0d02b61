//! The plain-text automaton format.
//!
//! Tokens are separated by whitespace:
//!
//! ```text
//! 3            number of states, then the labels
//! q0 q1 q2
//! 2            number of symbols, then the symbols
//! a b
//! 3            number of transitions, then the transitions
//! q0 a q1
//! q1 b q2
//! q2 a q1
//! q0           initial state
//! 1            number of final states, then the labels
//! q2
//! ```
//!
//! For an NFA each transition line is `state symbol target...` and lists all
//! targets of that pair; the transition count is the total number of targets.
//! A DFA transition that is undefined is simply not listed.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::alphabet::Symbol;
use crate::builder::{DfaBuilder, NfaBuilder};
use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::{Error, Result};

struct Tokens<'a> {
    lines: Vec<Vec<&'a str>>,
    line: usize,
    column: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input
                .lines()
                .map(|line| line.split_whitespace().collect())
                .collect(),
            line: 0,
            column: 0,
        }
    }

    fn skip_exhausted_lines(&mut self) {
        while self.line < self.lines.len() && self.column >= self.lines[self.line].len() {
            self.line += 1;
            self.column = 0;
        }
    }

    fn next(&mut self, what: &'static str) -> Result<&'a str> {
        self.skip_exhausted_lines();
        let token = self
            .lines
            .get(self.line)
            .and_then(|line| line.get(self.column))
            .copied()
            .ok_or(Error::UnexpectedEndOfInput(what))?;
        self.column += 1;
        Ok(token)
    }

    /// The tokens left on the line of the last token read.
    fn rest_of_line(&mut self, what: &'static str) -> Result<&[&'a str]> {
        let rest = self
            .lines
            .get(self.line)
            .map(|line| &line[self.column.min(line.len())..])
            .unwrap_or(&[]);
        if rest.is_empty() {
            return Err(Error::UnexpectedEndOfInput(what));
        }
        self.column += rest.len();
        Ok(rest)
    }

    fn count(&mut self, what: &'static str) -> Result<usize> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| Error::InvalidCount(token.to_owned()))
    }

    fn symbol(&mut self) -> Result<Symbol> {
        parse_symbol(self.next("symbol")?)
    }

    fn finish(mut self) -> Result<()> {
        self.skip_exhausted_lines();
        match self.lines.get(self.line).and_then(|line| line.get(self.column)) {
            Some(token) => Err(Error::TrailingInput((*token).to_owned())),
            None => Ok(()),
        }
    }
}

fn parse_symbol(token: &str) -> Result<Symbol> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(Error::InvalidSymbol(token.to_owned())),
    }
}

impl FromStr for DfaBuilder {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut tokens = Tokens::new(input);
        let mut builder = DfaBuilder::new();
        for _ in 0..tokens.count("number of states")? {
            builder.insert_state(tokens.next("state")?);
        }
        for _ in 0..tokens.count("number of symbols")? {
            builder.insert_symbol(tokens.symbol()?);
        }
        for _ in 0..tokens.count("number of transitions")? {
            let source = tokens.next("transition source")?;
            let symbol = tokens.symbol()?;
            let target = tokens.next("transition target")?;
            builder
                .insert_symbol(symbol)
                .insert_transition(source, symbol, target);
        }
        builder.set_initial_state(tokens.next("initial state")?);
        for _ in 0..tokens.count("number of final states")? {
            builder.insert_final_state(tokens.next("final state")?);
        }
        tokens.finish()?;
        Ok(builder)
    }
}

impl FromStr for NfaBuilder {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut tokens = Tokens::new(input);
        let mut builder = NfaBuilder::new();
        for _ in 0..tokens.count("number of states")? {
            builder.insert_state(tokens.next("state")?);
        }
        for _ in 0..tokens.count("number of symbols")? {
            builder.insert_symbol(tokens.symbol()?);
        }
        let declared = tokens.count("number of transitions")?;
        let mut remaining = declared;
        while remaining > 0 {
            let source = tokens.next("transition source")?;
            let symbol = tokens.symbol()?;
            let targets = tokens.rest_of_line("transition targets")?;
            // the count is of individual triples
            if targets.len() > remaining {
                return Err(Error::InvalidCount(declared.to_string()));
            }
            for target in targets {
                builder.insert_transition(source, symbol, target);
            }
            remaining -= targets.len();
        }
        builder.set_initial_state(tokens.next("initial state")?);
        for _ in 0..tokens.count("number of final states")? {
            builder.insert_final_state(tokens.next("final state")?);
        }
        tokens.finish()?;
        Ok(builder)
    }
}

/// Reads and validates a DFA.
pub fn parse_dfa(input: &str) -> Result<Dfa> {
    input.parse::<DfaBuilder>()?.build()
}

/// Reads and validates an NFA.
pub fn parse_nfa(input: &str) -> Result<Nfa> {
    input.parse::<NfaBuilder>()?.build()
}

fn write_header(out: &mut String, labels: &[String], symbols: &[Symbol]) {
    let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
    let _ = writeln!(out, "{}\n{}", labels.len(), labels.join(" "));
    let _ = writeln!(out, "{}\n{}", symbols.len(), symbols.join(" "));
}

fn write_footer(out: &mut String, initial: &str, finals: &[&str]) {
    let _ = writeln!(out, "{}", initial);
    let _ = writeln!(out, "{}\n{}", finals.len(), finals.join(" "));
}

impl Dfa {
    /// Writes the automaton in the text format, listing only defined transitions.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        write_header(&mut out, self.labels(), self.alphabet().as_slice());
        let _ = writeln!(out, "{}", self.transition_count());
        for (source, symbol, target) in self.transitions() {
            let _ = writeln!(out, "{} {} {}", self.label(source), symbol, self.label(target));
        }
        let finals: Vec<&str> = self
            .states()
            .filter(|state| self.is_final_state(*state))
            .map(|state| self.label(state))
            .collect();
        write_footer(&mut out, self.label(self.get_initial_state()), &finals);
        out
    }
}

impl Nfa {
    /// Writes the automaton in the text format, one line per `(state, symbol)`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        write_header(&mut out, self.labels(), self.alphabet().as_slice());
        let _ = writeln!(out, "{}", self.transition_count());
        for (source, symbol, targets) in self.transitions() {
            let targets: Vec<&str> = targets.iter().map(|t| self.label(*t)).collect();
            let _ = writeln!(out, "{} {} {}", self.label(source), symbol, targets.join(" "));
        }
        let finals: Vec<&str> = self
            .states()
            .filter(|state| self.is_final_state(*state))
            .map(|state| self.label(state))
            .collect();
        write_footer(&mut out, self.label(self.get_initial_state()), &finals);
        out
    }
}
