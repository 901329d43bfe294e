//! Condition language and text templating
//!
//! Conditions are small boolean statements such as
//! `equals player.score 3 and not (flag or "x")`. They are parsed into a
//! [`Condition`] tree and evaluated against a [`Context`]. Parse failures,
//! unknown commands and invalid patterns are errors, never a silent `false`.

mod parser;
mod template;
pub mod tokenize;

pub use parser::{Command, Condition};
pub use template::{render, render_value};
pub use tokenize::{split_words, tokenize, Token};

use crate::error::DomainError;
use crate::value_objects::{Context, IfStatement};

/// Evaluate a statement string against a context.
pub fn evaluate(context: &Context, statement: &str) -> Result<bool, DomainError> {
    Condition::parse(statement)?.evaluate(context)
}

/// Evaluate an authored condition (a statement, an all-of list, or an any-of list).
pub fn evaluate_if(context: &Context, statement: &IfStatement) -> Result<bool, DomainError> {
    match statement {
        IfStatement::Text(text) => evaluate(context, text),
        IfStatement::All(items) => {
            for item in items {
                if !evaluate_if(context, item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        IfStatement::Any(items) => {
            for item in items {
                if evaluate_if(context, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Parse every statement in a condition without evaluating it.
pub fn check_if(statement: &IfStatement) -> Result<(), DomainError> {
    for text in statement.statements() {
        Condition::parse(text)?;
    }
    Ok(())
}
