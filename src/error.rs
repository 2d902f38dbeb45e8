//! Error taxonomy. Construction-time problems are `GrammarError` and abort
//! the parser build; the rest are scoped to a single tokenize or parse
//! attempt, and the parser's persistent state (grammar, terminal table)
//! survives them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("nonterminal {0} multiply defined")]
    MultiplyDefined(String),
    #[error("symbol \"{0}\" not defined")]
    Undefined(String),
    #[error("name {0} uses a reserved prefix")]
    ReservedName(String),
    #[error("epsilon must be the only symbol of its production (rule {0})")]
    MalformedEpsilon(String),
    #[error("production for {lhs} carries {got} actions for {want} symbols")]
    BadActions { lhs: String, got: usize, want: usize },
    #[error("invalid terminal pattern /{pattern}/: {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("unknown semantic action \"{0}\"")]
    UnknownAction(String),
    #[error("%prec names operator /{0}/, which has no associativity declaration")]
    UndeclaredOperator(String),
    #[error("start symbol \"{0}\" has no rule")]
    NoStartRule(String),
    #[error("malformed grammar definition: {0}")]
    Parse(String),
    #[error("cannot read grammar file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum TokenizeError {
    #[error("zero-length token match at position {at}")]
    EmptyMatch { at: usize },
    #[error("no token matches at position {at}, near {context:?}")]
    NoMatch { at: usize, context: String },
}

/// No viable completion exists. `at` is the index of the offending token:
/// the one just before the earliest position with no in-progress edge.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("bad syntax at token {at}: {lexeme}")]
pub struct SyntaxError {
    pub at: usize,
    pub lexeme: String,
}

/// A user semantic action failed during attribute evaluation. Fatal for
/// that parse; never masked as a syntax error.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("semantic action failed: {message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> ActionError {
        ActionError { message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Action(#[from] ActionError),
}
