//! Rewrites a validated `Grammar` into its Earley-ready form.
//!
//! Terminal patterns embedded in right-hand sides are factored into
//! synthetic single-symbol nonterminals (`*0`, `*1`, ...), duplicate
//! patterns sharing one name; epsilon productions become empty right-hand
//! sides; action names are resolved against the registry; and every
//! production gets its `(precedence, associativity, dprec)` disambiguation
//! info. This is a pure transform: the input grammar is never mutated.

use std::collections::HashMap;

use linear_map::LinearMap;

use crate::attr::{ActionFn, ActionRegistry};
use crate::error::GrammarError;
use crate::grammar::{Assoc, Grammar, Symbol, TERM_PFX};
use crate::scanner::Terminal;

/// A preprocessed production. `rhs` holds only nonterminal names, original
/// or synthetic.
pub(crate) struct Prod {
    pub(crate) lhs: String,
    pub(crate) rhs: Vec<String>,
    pub(crate) s_action: ActionFn,
    /// Resolved inherited-attribute actions, one slot per original RHS
    /// position. Resolution happens here so a bad name fails at
    /// construction; the evaluation walk itself only runs S-actions.
    #[allow(dead_code)]
    pub(crate) i_actions: Vec<Option<ActionFn>>,
    pub(crate) info: ProdInfo,
}

/// Disambiguation info resolved for one production.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct ProdInfo {
    pub(crate) op: Option<(u32, Assoc)>,
    pub(crate) dprec: Option<i64>,
}

pub(crate) struct Compiled {
    pub(crate) prods: Vec<Prod>,
    pub(crate) by_lhs: HashMap<String, Vec<usize>>,
    pub(crate) start: String,
    pub(crate) terminals: Vec<Terminal>,
    /// Synthetic terminal name back to its source pattern, for diagnostics.
    pub(crate) inv_renamed: HashMap<String, String>,
}

pub(crate) fn preprocess(
    gram: &Grammar,
    registry: &ActionRegistry,
) -> Result<Compiled, GrammarError> {
    gram.validate()?;

    // Ignore patterns first (lhs None marks a discard terminal), then
    // optionals; factored terminals are appended as they are discovered.
    let mut terminals = Vec::new();
    for pattern in &gram.ignores {
        terminals.push(Terminal::compile(pattern, None)?);
    }
    for (sym, pattern) in &gram.optionals {
        terminals.push(Terminal::compile(pattern, Some(sym.clone()))?);
    }

    // Operator lookup keyed by pattern text. Re-declaring a pattern keeps
    // the later declaration.
    let mut operators: LinearMap<&str, (u32, Assoc)> = LinearMap::new();
    for (pattern, rank, assoc) in gram.assoc_decls() {
        operators.insert(pattern.as_str(), (*rank, *assoc));
    }

    let mut renamed: HashMap<String, String> = HashMap::new();
    let mut prods: Vec<Prod> = Vec::new();
    let mut by_lhs: HashMap<String, Vec<usize>> = HashMap::new();
    let mut next_term = 0usize;

    for rule in &gram.rules {
        for production in &rule.productions {
            if production.actions.len() != production.rhs.len() + 1 {
                return Err(GrammarError::BadActions {
                    lhs: rule.lhs.clone(),
                    got: production.actions.len(),
                    want: production.rhs.len() + 1,
                });
            }

            // Walk the RHS left to right: factor terminals, erase epsilon.
            let mut rhs: Vec<String> = Vec::with_capacity(production.rhs.len());
            let mut op_info: Option<(u32, Assoc)> = None;
            for sym in &production.rhs {
                match sym {
                    Symbol::Epsilon => {
                        if production.rhs.len() != 1 {
                            return Err(GrammarError::MalformedEpsilon(rule.lhs.clone()));
                        }
                        // an empty RHS models the epsilon production
                    }
                    Symbol::Term(pattern) => {
                        let name = match renamed.get(pattern) {
                            Some(name) => name.clone(),
                            None => {
                                let name = format!("{}{}", TERM_PFX, next_term);
                                next_term += 1;
                                renamed.insert(pattern.clone(), name.clone());
                                terminals.push(Terminal::compile(pattern, Some(name.clone()))?);
                                name
                            }
                        };
                        if let Some(&op) = operators.get(pattern.as_str()) {
                            // candidate operator info; the last declared
                            // terminal on the RHS wins, and %prec below
                            // overrides both
                            op_info = Some(op);
                        }
                        rhs.push(name);
                    }
                    Symbol::NonTerm(name) => rhs.push(name.clone()),
                }
            }

            let mut i_actions = Vec::with_capacity(production.rhs.len());
            for name in &production.actions[..production.rhs.len()] {
                i_actions.push(match name {
                    Some(n) => Some(registry.resolve(n)?),
                    None => None,
                });
            }
            let s_action = match &production.actions[production.rhs.len()] {
                Some(name) => registry.resolve(name)?,
                None => ActionRegistry::default_s_action(),
            };

            // Resolve final (precedence, assoc): explicit %prec override,
            // else operator info from a factored terminal, else undefined.
            let op = match &production.assoc {
                Some(over) => match operators.get(over.as_str()) {
                    Some(&op) => Some(op),
                    None => return Err(GrammarError::UndeclaredOperator(over.clone())),
                },
                None => op_info,
            };
            let info = ProdInfo { op, dprec: production.dprec };

            let ix = prods.len();
            prods.push(Prod { lhs: rule.lhs.clone(), rhs, s_action, i_actions, info });
            by_lhs.entry(rule.lhs.clone()).or_default().push(ix);
        }
    }

    if !by_lhs.contains_key(&gram.start) {
        return Err(GrammarError::NoStartRule(gram.start.clone()));
    }

    let inv_renamed = renamed.into_iter().map(|(orig, new)| (new, orig)).collect();

    Ok(Compiled {
        prods,
        by_lhs,
        start: gram.start.clone(),
        terminals,
        inv_renamed,
    })
}
