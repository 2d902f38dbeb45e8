//! Grammar-driven Earley parsing with attribute evaluation.
//!
//! A `Grammar` (written in the grammar-definition language or built
//! programmatically) compiles into an `EarleyParser`; each `ParseRun`
//! consumes tokens incrementally and, once a start production spans the
//! whole input, runs the grammar's registered semantic actions bottom-up
//! to produce a `Val`.
//!
//! ```no_run
//! use charta::{ActionRegistry, EarleyParser, ParseResult, grammar_parser};
//!
//! let gram = grammar_parser::parse(
//!     "%left '+'\n%%\nexpr -> expr '+' expr %{ add %} | /[0-9]+/ ;",
//! )?;
//! let mut registry = ActionRegistry::new();
//! registry.register("add", |vals| Ok(charta::Val::node("add", vals.to_vec())));
//! let parser = EarleyParser::new(&gram, &registry)?;
//!
//! let tokens = parser.tokenize("1+2+3")?;
//! let mut run = parser.parse_run();
//! match run.feed(&tokens)? {
//!     ParseResult::Done(val) => println!("{}", val),
//!     ParseResult::Pending => println!("need more input"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use] extern crate lalrpop_util;

pub mod attr;
mod display;
mod earley;
pub mod error;
pub mod grammar;
pub mod grammar_parser;
mod preprocess;
mod scanner;

lalrpop_mod!(grm); // synthesized by LALRPOP

pub use crate::attr::{ActionFn, ActionRegistry, Val};
pub use crate::earley::{Ambiguity, EarleyParser, ParseResult, ParseRun};
pub use crate::error::{ActionError, Error, GrammarError, SyntaxError, TokenizeError};
pub use crate::grammar::{Assoc, Grammar, Production, Rule, Symbol};
pub use crate::scanner::Token;
