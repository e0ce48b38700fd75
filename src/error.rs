//! Error taxonomy shared by every stage of the engine.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while compiling, rewriting or interpreting a script.
///
/// Compile-time variants (`Lex`, `Parse`, `Arity`) abort compilation entirely.
/// Run-time variants abort the current derivation or interpretation pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unrecognized character {found:?} at {line}:{column}")]
    Lex {
        found: char,
        line: usize,
        column: usize,
    },

    #[error("{message} at {line}:{column}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// Parameter count disagreement for a symbol.
    #[error("symbol '{symbol}' used with {found} parameter(s) but declared with {expected}")]
    Arity {
        symbol: char,
        expected: usize,
        found: usize,
    },

    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("no interpretation rule for symbol '{symbol}' at module {position}")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("branch close at module {position} has no matching branch open")]
    StackUnderflow { position: usize },

    #[error("branch open at module {position} exceeds the maximum stack depth of {max}")]
    StackOverflow { position: usize, max: usize },

    #[error("{depth} branch(es) still open at the end of the word")]
    UnbalancedStack { depth: usize },

    #[error("polygon command '{command}' at module {position}: {reason}")]
    PolygonState {
        command: &'static str,
        position: usize,
        reason: &'static str,
    },

    /// A stochastic group with a negative weight or a zero total.
    #[error("invalid weights for productions of '{symbol}': {reason}")]
    InvalidWeights { symbol: char, reason: String },

    #[error("word grew to {len} modules, above the limit of {max}")]
    GrowthLimit { len: usize, max: usize },
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, span: crate::lexer::Span) -> Self {
        Error::Parse {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }
}
