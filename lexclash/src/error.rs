//! # Error Types

/// Errors from parsing and compiling patterns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The pattern does not conform to the supported grammar.
    #[error("syntax error at position {position}: {message} (near {context:?})")]
    Syntax {
        /// Character offset of the failure.
        position: usize,
        /// Pattern text surrounding the failure.
        context: String,
        /// What was expected or found.
        message: String,
    },

    /// A recognised construct that cannot be expressed as a finite automaton
    /// or is intentionally not implemented.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// A character range with malformed or descending endpoints.
    #[error("invalid character range {range:?}")]
    InvalidRange {
        /// The offending range text.
        range: String,
    },

    /// A bounded repetition whose minimum exceeds its maximum.
    #[error("invalid repetition {repeat:?}")]
    InvalidRepeat {
        /// The offending quantifier text.
        repeat: String,
    },

    /// The pattern mentions characters that the builder's alphabet lacks.
    #[error("pattern uses characters outside the automaton alphabet")]
    ForeignSymbols,

    /// An intermediate automaton grew past the configured ceiling.
    #[error("automaton reached {states} states, exceeding the limit of {limit}")]
    StateLimit {
        /// The configured ceiling.
        limit: usize,
        /// The size of the offending automaton.
        states: usize,
    },
}

/// Result type for lexclash operations.
pub type Result<T> = core::result::Result<T, Error>;
