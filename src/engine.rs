//! One-stop pipeline: compile a script, derive its word, interpret it.

use crate::error::Result;
use crate::geometry::Geometry;
use crate::grammar::Grammar;
use crate::interpreter::{TurtleConfig, TurtleInterpreter};
use crate::rewriter::{RewriteConfig, derive};
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// Everything the caller supplies besides the script itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rewrite: RewriteConfig,
    pub turtle: TurtleConfig,
    /// Give unmapped structural glyphs their conventional meaning
    /// (see [`TurtleInterpreter::populate_standard_symbols`]).
    pub standard_symbols: bool,
}

/// A compiled script bound to its run configuration.
#[derive(Clone, Debug)]
pub struct Engine {
    grammar: Grammar,
    config: EngineConfig,
}

impl Engine {
    pub fn new(grammar: Grammar, config: EngineConfig) -> Self {
        Self { grammar, config }
    }

    /// Compiles `source`; any lex, parse or semantic error aborts compilation.
    pub fn compile(source: &str, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(Grammar::parse(source)?, config))
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derives `rewrite.iterations` generations with a random source seeded
    /// from `rewrite.seed`. Repeated calls return identical words.
    pub fn derive(&self) -> Result<Word> {
        derive(&self.grammar, &self.config.rewrite)
    }

    pub fn interpreter(&self) -> TurtleInterpreter {
        let mut interpreter =
            TurtleInterpreter::from_grammar(&self.grammar, self.config.turtle.clone());
        if self.config.standard_symbols {
            interpreter.populate_standard_symbols();
        }
        interpreter
    }

    /// Derives the final word and interprets it.
    pub fn render(&self) -> Result<Geometry> {
        let word = self.derive()?;
        self.interpreter().interpret(&word)
    }
}
