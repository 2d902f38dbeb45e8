//! Human-readable renderings. Values print as s-expressions; grammars and
//! compiled parsers print one production or terminal per line, with
//! factored terminals shown as their source pattern again.

use std::fmt;

use crate::attr::Val;
use crate::earley::EarleyParser;
use crate::grammar::{Assoc, Symbol};

impl fmt::Display for Val {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Val::Nil => write!(w, "()"),
            Val::Bool(b) => write!(w, "{}", b),
            Val::Int(i) => write!(w, "{}", i),
            Val::Str(s) => write!(w, "{:?}", s),
            Val::List(items) => {
                write!(w, "(")?;
                for (ix, item) in items.iter().enumerate() {
                    if ix > 0 {
                        write!(w, " ")?;
                    }
                    write!(w, "{}", item)?;
                }
                write!(w, ")")
            }
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::NonTerm(name) => write!(w, "{}", name),
            Symbol::Term(pattern) => write!(w, "/{}/", pattern),
            Symbol::Epsilon => write!(w, "_"),
        }
    }
}

impl fmt::Display for Assoc {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Assoc::Left => write!(w, "left"),
            Assoc::Right => write!(w, "right"),
        }
    }
}

impl EarleyParser {
    /// Write the preprocessed production table and the terminal table,
    /// one entry per line. Synthetic terminal nonterminals are rendered
    /// as the pattern they were factored from.
    pub fn dump(&self, w: &mut impl fmt::Write) -> fmt::Result {
        for prod in &self.prods {
            write!(w, "{} ->", prod.lhs)?;
            if prod.rhs.is_empty() {
                write!(w, " _")?;
            }
            for sym in &prod.rhs {
                match self.inv_renamed.get(sym) {
                    Some(pattern) => write!(w, " /{}/", pattern)?,
                    None => write!(w, " {}", sym)?,
                }
            }
            writeln!(w)?;
        }
        for term in &self.terminals {
            let lhs = term.lhs.as_deref().unwrap_or("(ignore)");
            writeln!(w, "{} -> /{}/", lhs, term.pattern)?;
        }
        Ok(())
    }
}
