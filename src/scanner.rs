//! The longest-match multi-pattern scanner.
//!
//! Every registered terminal pattern is tried at the current position; the
//! longest match wins, with the earliest-registered pattern winning exact
//! ties. Discard terminals (no lhs) are consumed silently. A zero-length
//! match cannot advance and is fatal, as is a position no pattern matches.

use regex::Regex;

use crate::error::{GrammarError, TokenizeError};

/// One entry of the terminal table. `lhs` is `None` for ignore patterns,
/// otherwise the (possibly synthetic) nonterminal the pattern tokenizes to.
pub(crate) struct Terminal {
    pub(crate) pattern: String,
    pub(crate) re: Regex,
    pub(crate) lhs: Option<String>,
}

impl Terminal {
    pub(crate) fn compile(pattern: &str, lhs: Option<String>) -> Result<Terminal, GrammarError> {
        let re = Regex::new(&format!(r"\A(?:{})", pattern)).map_err(|source| {
            GrammarError::BadPattern { pattern: pattern.to_string(), source }
        })?;
        Ok(Terminal { pattern: pattern.to_string(), re, lhs })
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    /// The renamed terminal symbol (`*N`, or an optional's own name).
    pub terminal: String,
    pub lexeme: String,
}

impl Token {
    pub fn new(terminal: impl Into<String>, lexeme: impl Into<String>) -> Token {
        Token { terminal: terminal.into(), lexeme: lexeme.into() }
    }
}

pub(crate) fn tokenize(terminals: &[Terminal], input: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        // Longest match wins; strict `>` keeps the first-registered
        // pattern on ties.
        let mut best: Option<(&Terminal, usize)> = None;
        for term in terminals {
            if let Some(m) = term.re.find(&input[pos..]) {
                let end = pos + m.end();
                if best.map_or(true, |(_, best_end)| end > best_end) {
                    best = Some((term, end));
                }
            }
        }

        if pos == input.len() {
            // A nullable pattern may still match (emptily) at the very end.
            if let Some((term, end)) = best {
                if let Some(lhs) = &term.lhs {
                    tokens.push(Token::new(lhs, &input[pos..end]));
                }
            }
            break;
        }

        match best {
            Some((_, end)) if end == pos => {
                return Err(TokenizeError::EmptyMatch { at: pos });
            }
            Some((term, end)) => {
                if let Some(lhs) = &term.lhs {
                    tokens.push(Token::new(lhs, &input[pos..end]));
                }
                pos = end;
            }
            None => {
                return Err(TokenizeError::NoMatch {
                    at: pos,
                    context: context_window(input, pos),
                });
            }
        }
    }

    Ok(tokens)
}

/// Five characters of context either side of `at`. `at` is always a match
/// boundary, hence a char boundary.
fn context_window(input: &str, at: usize) -> String {
    let before: String = input[..at]
        .chars()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let after: String = input[at..].chars().take(5).collect();
    before + &after
}
