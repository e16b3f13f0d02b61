//! Symbols and the alphabet an automaton reads.

use bincode::{Decode, Encode};

pub type Symbol = char;

/// A finite set of symbols, kept sorted so that every algorithm iterating over
/// it visits the symbols in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Alphabet {
    symbols: Vec<Symbol>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol, returning `false` if it was already present.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        match self.symbols.binary_search(&symbol) {
            Ok(_) => false,
            Err(position) => {
                self.symbols.insert(position, symbol);
                true
            }
        }
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.binary_search(&symbol).is_ok()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Whether the symbols are strictly increasing, as `insert` keeps them.
    pub(crate) fn is_canonical(&self) -> bool {
        self.symbols.windows(2).all(|pair| pair[0] < pair[1])
    }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut symbols: Vec<Symbol> = iter.into_iter().collect();
        symbols.sort_unstable();
        symbols.dedup();
        Self { symbols }
    }
}

impl Extend<Symbol> for Alphabet {
    fn extend<I: IntoIterator<Item = Symbol>>(&mut self, iter: I) {
        for symbol in iter {
            self.insert(symbol);
        }
    }
}
