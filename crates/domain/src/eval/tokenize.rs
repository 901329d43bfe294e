//! Quote-aware tokenizer shared by conditions and action phrases
//!
//! Words are split on whitespace. A double-quoted run is one token, quotes
//! included, so `custom_message A B text "hi there"` yields five tokens.
//! For conditions, parentheses additionally open and close nested groups.

use crate::error::TokenizeError;

/// A token of a condition statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Group(Vec<Token>),
}

impl Token {
    pub fn word(s: impl Into<String>) -> Self {
        Self::Word(s.into())
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            Self::Group(_) => None,
        }
    }
}

/// Split a phrase into words. Parentheses are ordinary characters here.
pub fn split_words(input: &str) -> Result<Vec<String>, TokenizeError> {
    let tokens = scan(input, false)?;
    Ok(tokens
        .into_iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(w),
            Token::Group(_) => None,
        })
        .collect())
}

/// Split a statement into words and parenthesized groups.
pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizeError> {
    scan(input, true)
}

struct Scanner<'a> {
    input: &'a str,
    stack: Vec<Vec<Token>>,
    word: String,
    in_quote: bool,
    just_closed_quote: bool,
}

impl Scanner<'_> {
    fn flush(&mut self) {
        if !self.word.is_empty() {
            let word = std::mem::take(&mut self.word);
            if let Some(top) = self.stack.last_mut() {
                top.push(Token::Word(word));
            }
        }
        self.just_closed_quote = false;
    }

    fn illegal(&self, c: char) -> TokenizeError {
        let mut token = self.word.clone();
        token.push(c);
        TokenizeError::IllegalToken {
            token,
            input: self.input.to_string(),
        }
    }
}

fn scan(input: &str, groups: bool) -> Result<Vec<Token>, TokenizeError> {
    let mut s = Scanner {
        input,
        stack: vec![Vec::new()],
        word: String::new(),
        in_quote: false,
        just_closed_quote: false,
    };

    for c in input.chars() {
        if s.in_quote {
            s.word.push(c);
            if c == '"' {
                s.in_quote = false;
                s.just_closed_quote = true;
            }
            continue;
        }
        match c {
            c if c.is_whitespace() => s.flush(),
            '(' if groups => {
                s.flush();
                s.stack.push(Vec::new());
            }
            ')' if groups => {
                s.flush();
                if s.stack.len() < 2 {
                    return Err(TokenizeError::UnbalancedParens(input.to_string()));
                }
                let group = s.stack.pop().unwrap_or_default();
                if let Some(parent) = s.stack.last_mut() {
                    parent.push(Token::Group(group));
                }
            }
            '"' => {
                // A quote may only open a fresh word
                if !s.word.is_empty() {
                    return Err(s.illegal(c));
                }
                s.in_quote = true;
                s.word.push(c);
            }
            _ => {
                if s.just_closed_quote {
                    return Err(s.illegal(c));
                }
                s.word.push(c);
            }
        }
    }

    if s.in_quote {
        return Err(TokenizeError::UnpairedQuote(input.to_string()));
    }
    s.flush();
    if s.stack.len() != 1 {
        return Err(TokenizeError::UnbalancedParens(input.to_string()));
    }
    Ok(s.stack.pop().unwrap_or_default())
}
