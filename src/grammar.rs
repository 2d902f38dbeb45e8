//! The abstract grammar model: symbols, productions, rules, and the
//! declarations (operator associativity, ignore patterns, optional
//! terminals) that surround them.
//!
//! A `Grammar` is a passive data structure. It is usually built by the
//! grammar-definition-language parser (`crate::grammar_parser`), but can be
//! assembled programmatically; either way it is handed to
//! `EarleyParser::new`, which validates and preprocesses it without
//! mutating it.

use std::collections::HashSet;

use crate::error::GrammarError;

/// Prefix of synthetic nonterminals minted for factored terminal patterns.
pub(crate) const TERM_PFX: char = '*';
/// Reserved prefix for engine-introduced nonterminals over long right-hand
/// sides (unused by the Earley path, but reserved all the same).
pub(crate) const NONTERM_PFX: char = '@';

pub(crate) fn is_synthetic(name: &str) -> bool {
    name.starts_with(TERM_PFX) || name.starts_with(NONTERM_PFX)
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Symbol {
    /// A nonterminal, referred to by name.
    NonTerm(String),
    /// A terminal, carried as regex pattern text until preprocessing
    /// factors it into a synthetic nonterminal.
    Term(String),
    /// The empty right-hand side marker.
    Epsilon,
}

impl Symbol {
    pub fn nt(name: impl Into<String>) -> Symbol {
        Symbol::NonTerm(name.into())
    }

    /// A literal terminal: the text is matched verbatim.
    pub fn lit(text: &str) -> Symbol {
        Symbol::Term(regex::escape(text))
    }

    /// A terminal given directly as a regex pattern.
    pub fn pat(pattern: impl Into<String>) -> Symbol {
        Symbol::Term(pattern.into())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Assoc {
    Left,
    Right,
}

/// One alternative of a rule. `actions` always holds `|rhs| + 1` entries:
/// one optional inherited-attribute action per RHS position, evaluated
/// before that symbol's subtree, and a final optional synthesized-attribute
/// action evaluated over the whole production. Actions are names, resolved
/// against an `ActionRegistry` during preprocessing.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Production {
    pub rhs: Vec<Symbol>,
    pub actions: Vec<Option<String>>,
    /// Explicit disambiguation priority (`%dprec`).
    pub dprec: Option<i64>,
    /// `%prec`-style override: a terminal pattern whose global
    /// associativity/precedence applies to this production.
    pub assoc: Option<String>,
}

impl Production {
    pub fn new(rhs: Vec<Symbol>) -> Production {
        let actions = vec![None; rhs.len() + 1];
        Production { rhs, actions, dprec: None, assoc: None }
    }

    pub fn with_s_action(mut self, name: impl Into<String>) -> Production {
        let last = self.actions.len() - 1;
        self.actions[last] = Some(name.into());
        self
    }

    /// Attach the inherited-attribute action run before RHS position `at`.
    pub fn with_i_action(mut self, at: usize, name: impl Into<String>) -> Production {
        assert!(at < self.rhs.len(), "i-action index {} out of range", at);
        self.actions[at] = Some(name.into());
        self
    }

    pub fn with_dprec(mut self, dprec: i64) -> Production {
        self.dprec = Some(dprec);
        self
    }

    /// `%prec 'op'`: borrow the named operator's precedence/associativity.
    pub fn with_prec_of(mut self, op_pattern: impl Into<String>) -> Production {
        self.assoc = Some(op_pattern.into());
        self
    }
}

/// Maps one nonterminal to its ordered list of productions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Rule {
    pub lhs: String,
    pub productions: Vec<Production>,
}

impl Rule {
    pub fn new(lhs: impl Into<String>) -> Rule {
        Rule { lhs: lhs.into(), productions: vec![] }
    }

    pub fn production(mut self, p: Production) -> Rule {
        self.productions.push(p);
        self
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Grammar {
    pub rules: Vec<Rule>,
    pub start: String,
    /// Terminal patterns matched and discarded during tokenization.
    pub ignores: Vec<String>,
    /// `(symbol, pattern)`: terminals that tokenize directly to `symbol`
    /// and count as defined nonterminals without a rule of their own.
    pub optionals: Vec<(String, String)>,
    assoc_decls: Vec<(String, u32, Assoc)>,
    next_prec: u32,
}

impl Grammar {
    pub fn new() -> Grammar {
        Grammar::default()
    }

    pub fn set_start(&mut self, start: impl Into<String>) {
        self.start = start.into();
    }

    pub fn add_rule(&mut self, rule: Rule) {
        if self.start.is_empty() {
            self.start = rule.lhs.clone();
        }
        self.rules.push(rule);
    }

    pub fn declare_ignore(&mut self, pattern: impl Into<String>) {
        self.ignores.push(pattern.into());
    }

    pub fn declare_optional(&mut self, symbol: impl Into<String>, pattern: impl Into<String>) {
        self.optionals.push((symbol.into(), pattern.into()));
    }

    /// Declare one associativity group. Each call opens a new precedence
    /// rank; later groups bind strictly tighter than earlier ones.
    pub fn declare_operator_assocs<I, S>(&mut self, operators: I, assoc: Assoc)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for op in operators {
            self.assoc_decls.push((op.into(), self.next_prec, assoc));
        }
        self.next_prec += 1;
    }

    /// The flat `(pattern, rank, assoc)` declaration list, in declaration
    /// order.
    pub fn assoc_decls(&self) -> &[(String, u32, Assoc)] {
        &self.assoc_decls
    }

    pub fn rule(&self, nonterm: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.lhs == nonterm)
    }

    /// Semantic checks: no multiply-defined nonterminal (optional-declared
    /// symbols count as defined), no reserved-prefix names, and every RHS
    /// symbol either a terminal, epsilon, or a defined nonterminal.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let mut defined: HashSet<&str> = HashSet::new();
        for (sym, _pattern) in &self.optionals {
            if is_synthetic(sym) {
                return Err(GrammarError::ReservedName(sym.clone()));
            }
            defined.insert(sym);
        }

        for rule in &self.rules {
            if is_synthetic(&rule.lhs) {
                return Err(GrammarError::ReservedName(rule.lhs.clone()));
            }
            if !defined.insert(&rule.lhs) {
                return Err(GrammarError::MultiplyDefined(rule.lhs.clone()));
            }
        }

        for rule in &self.rules {
            for prod in &rule.productions {
                for sym in &prod.rhs {
                    if let Symbol::NonTerm(name) = sym {
                        if !defined.contains(name.as_str()) {
                            return Err(GrammarError::Undefined(name.clone()));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
