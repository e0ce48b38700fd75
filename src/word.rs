//! Modules and words: the strings an L-System rewrites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// One symbol instance together with its bound numeric parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub symbol: char,
    pub params: Vec<f64>,
}

impl Module {
    pub fn new(symbol: char, params: Vec<f64>) -> Self {
        Self { symbol, params }
    }

    /// A module without parameters.
    pub fn bare(symbol: char) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// An ordered sequence of modules: one generation of the structure.
///
/// Words are never edited in place; the rewriter always builds the next
/// generation from scratch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Word {
    modules: Vec<Module>,
}

impl Word {
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// Builds a parameterless word, one module per character.
    pub fn from_symbols(symbols: &str) -> Self {
        Self::new(symbols.chars().map(Module::bare).collect())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Module> {
        self.modules.get(index)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }

    /// The symbols of the word without their parameters.
    pub fn symbols(&self) -> String {
        self.modules.iter().map(|m| m.symbol).collect()
    }
}

impl Index<usize> for Word {
    type Output = Module;

    fn index(&self, index: usize) -> &Module {
        &self.modules[index]
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

impl FromIterator<Module> for Word {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modules {
            write!(f, "{m}")?;
        }
        Ok(())
    }
}
