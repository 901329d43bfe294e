//! Recursive-descent parser for the condition language
//!
//! Grammar, over the token tree produced by [`tokenize`]:
//!
//! ```text
//! statement := or-list
//! or-list   := and-list ("or" and-list)*
//! and-list  := unit ("and" unit)*
//! unit      := "(" statement ")" | "not" "(" statement ")" | leaf
//! leaf      := ["not"] [command] operand+
//! ```
//!
//! A leaf with a single operand is an implicit `istrue`. An empty statement
//! parses to [`Condition::Empty`], which evaluates to false.

use std::fmt;
use std::str::FromStr;

use regex_lite::RegexBuilder;
use serde_json::Value;

use super::tokenize::{tokenize, Token};
use crate::error::DomainError;
use crate::value_objects::{is_truthy, lookup_str, strict_equals, Context};

// ============================================================================
// Commands
// ============================================================================

/// Named predicate of a leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    IsTrue,
    Equals,
    Contains,
    Matches,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsTrue => "istrue",
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::Matches => "matches",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::IsTrue => 1,
            Self::Equals | Self::Contains | Self::Matches => 2,
        }
    }

    fn apply(&self, operands: &[Value]) -> Result<bool, DomainError> {
        match (self, operands) {
            (Self::IsTrue, [a]) => Ok(is_truthy(a)),
            (Self::Equals, [a, b]) => Ok(strict_equals(a, b)),
            (Self::Contains, [Value::String(a), Value::String(b)]) => {
                Ok(a.to_lowercase().contains(&b.to_lowercase()))
            }
            (Self::Matches, [Value::String(a), Value::String(pattern)]) => {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| DomainError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(re.is_match(a))
            }
            (Self::Contains | Self::Matches, [_, _]) => Ok(false),
            _ => Err(DomainError::CommandArity {
                command: self.as_str().to_string(),
                expected: self.arity(),
                actual: operands.len(),
            }),
        }
    }
}

impl FromStr for Command {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "istrue" => Ok(Self::IsTrue),
            "equals" => Ok(Self::Equals),
            "contains" => Ok(Self::Contains),
            "matches" => Ok(Self::Matches),
            other => Err(DomainError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// AST
// ============================================================================

/// Parsed condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Blank statement, always false
    Empty,
    Or(Vec<Condition>),
    And(Vec<Condition>),
    Not(Box<Condition>),
    /// A command applied to unresolved operand references
    Leaf {
        command: Command,
        operands: Vec<String>,
    },
}

impl Condition {
    /// Parse a statement string.
    pub fn parse(statement: &str) -> Result<Self, DomainError> {
        let tokens = tokenize(statement)?;
        parse_tokens(&tokens)
    }

    /// Evaluate against a context. Operands are resolved at this point.
    pub fn evaluate(&self, context: &Context) -> Result<bool, DomainError> {
        match self {
            Self::Empty => Ok(false),
            Self::Or(items) => {
                for item in items {
                    if item.evaluate(context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::And(items) => {
                for item in items {
                    if !item.evaluate(context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Not(inner) => Ok(!inner.evaluate(context)?),
            Self::Leaf { command, operands } => {
                let values: Vec<Value> = operands.iter().map(|o| lookup_str(context, o)).collect();
                command.apply(&values)
            }
        }
    }
}

fn is_word(token: &Token, word: &str) -> bool {
    token.as_word() == Some(word)
}

fn split_on<'a>(tokens: &'a [Token], separator: &str) -> Vec<&'a [Token]> {
    tokens.split(|t| is_word(t, separator)).collect()
}

fn parse_tokens(tokens: &[Token]) -> Result<Condition, DomainError> {
    if tokens.is_empty() {
        return Ok(Condition::Empty);
    }
    if let [Token::Group(inner)] = tokens {
        return parse_tokens(inner);
    }
    if tokens.iter().any(|t| is_word(t, "or")) {
        return split_on(tokens, "or")
            .into_iter()
            .map(parse_tokens)
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::Or);
    }
    if tokens.iter().any(|t| is_word(t, "and")) {
        return split_on(tokens, "and")
            .into_iter()
            .map(parse_tokens)
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::And);
    }
    if let [not, Token::Group(inner)] = tokens {
        if is_word(not, "not") {
            return Ok(Condition::Not(Box::new(parse_tokens(inner)?)));
        }
    }

    let words: Vec<&str> = tokens
        .iter()
        .map(Token::as_word)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| DomainError::illegal_statement("groups must be joined by \"or\" or \"and\""))?;
    parse_leaf(&words)
}

fn parse_leaf(words: &[&str]) -> Result<Condition, DomainError> {
    let (negated, rest) = match words {
        ["not", rest @ ..] => (true, rest),
        _ => (false, words),
    };
    let (command, operands) = match rest {
        [first, operands @ ..] if !operands.is_empty() => (first.parse::<Command>()?, operands),
        _ => (Command::IsTrue, rest),
    };
    if operands.len() != command.arity() {
        return Err(DomainError::CommandArity {
            command: command.as_str().to_string(),
            expected: command.arity(),
            actual: operands.len(),
        });
    }
    let leaf = Condition::Leaf {
        command,
        operands: operands.iter().map(|s| s.to_string()).collect(),
    };
    Ok(if negated {
        Condition::Not(Box::new(leaf))
    } else {
        leaf
    })
}
