//! Unified error types for the domain layer
//!
//! Every variant here is fatal for the pipeline pass that raised it. Authoring
//! mistakes (unknown names, malformed phrases, bad conditions) are surfaced
//! instead of silently evaluating to false.

use thiserror::Error;

/// Error produced while splitting a statement or phrase into tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A double quote was opened and never closed
    #[error("Unpaired quote in '{0}'")]
    UnpairedQuote(String),
    /// A closing parenthesis without an opener, or an opener never closed
    #[error("Unbalanced parentheses in '{0}'")]
    UnbalancedParens(String),
    /// A quote that starts or ends in the middle of a word
    #[error("Illegal token '{token}' in '{input}'")]
    IllegalToken { token: String, input: String },
}

/// Unified error type for domain operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Statement or phrase could not be tokenized
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// Action name is not in the catalog
    #[error("Unknown action \"{0}\"")]
    UnknownAction(String),

    /// Event type is not in the catalog
    #[error("Unknown event type \"{0}\"")]
    UnknownEvent(String),

    /// Condition uses a command the evaluator does not know
    #[error("Invalid if command \"{0}\"")]
    UnknownCommand(String),

    /// Condition command called with the wrong number of operands
    #[error("If command \"{command}\" expects {expected} operand(s), got {actual}")]
    CommandArity {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// Condition has a shape that cannot be evaluated
    #[error("Illegal if statement: {0}")]
    IllegalStatement(String),

    /// `matches` was given a pattern that does not compile
    #[error("Invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Action phrase is structurally wrong
    #[error("Malformed action phrase \"{phrase}\": {reason}")]
    MalformedPhrase { phrase: String, reason: String },

    /// A schedule modifier pointed at a value that is not a timestamp
    #[error("Could not resolve time reference \"{0}\"")]
    UnresolvedTime(String),

    /// Timezone name is not a known IANA zone
    #[error("Invalid timezone \"{0}\"")]
    InvalidTimezone(String),
}

impl DomainError {
    /// Create a malformed phrase error
    pub fn malformed_phrase(phrase: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPhrase {
            phrase: phrase.into(),
            reason: reason.into(),
        }
    }

    /// Create an illegal statement error
    pub fn illegal_statement(msg: impl Into<String>) -> Self {
        Self::IllegalStatement(msg.into())
    }
}
