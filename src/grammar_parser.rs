//! Front end for the grammar-definition language.
//!
//! The LALRPOP-generated parser (`grm.lalrpop`) produces a flat AST;
//! `assemble` turns it into a `Grammar`, deciding action placement and
//! rejecting the interleavings the flat parse admits but the language
//! does not.
//!
//! ```text
//! %left '+' '-'
//! %ignore /[ \t]+/
//! %%
//! expr -> expr '+' expr %{ add %}
//!       | /[0-9]+/      %{ num %}
//!       ;
//! ```

use std::path::Path;

use crate::error::GrammarError;
use crate::grammar::{Grammar, Production, Rule, Symbol};
use crate::grm;

pub(crate) mod ast {
    use crate::grammar::Assoc;

    pub struct SpecAst {
        pub decls: Vec<DeclAst>,
        pub rules: Vec<RuleAst>,
    }

    pub enum DeclAst {
        Assoc { ops: Vec<String>, assoc: Assoc },
        Ignore(String),
        Optional { sym: String, pattern: String },
    }

    pub struct RuleAst {
        pub lhs: String,
        pub prods: Vec<ProdAst>,
    }

    pub enum ProdAst {
        Empty { s_action: Option<String> },
        Seq { elems: Vec<ElemAst>, tail: Option<TailAst> },
    }

    pub enum ElemAst {
        Action(String),
        Sym(SymAst),
    }

    pub enum SymAst {
        NonTerm(String),
        Term(String),
    }

    pub enum TailAst {
        Dprec { dprec: i64, s_action: Option<String> },
        Prec { op: String, s_action: Option<String> },
    }
}

use ast::{DeclAst, ElemAst, ProdAst, SymAst, TailAst};

/// Strip the quotes of `'...'` and escape the text into a verbatim-match
/// pattern.
pub(crate) fn literal_pattern(tok: &str) -> String {
    regex::escape(&tok[1..tok.len() - 1])
}

/// Strip the slashes of `/.../`; the body is already regex syntax
/// (including `\/` escapes, which the regex engine accepts as-is).
pub(crate) fn regex_pattern(tok: &str) -> String {
    tok[1..tok.len() - 1].to_string()
}

/// Strip `%{ ... %}` and surrounding whitespace; what remains is the
/// registered action's name.
pub(crate) fn action_name(tok: &str) -> String {
    tok[2..tok.len() - 2].trim().to_string()
}

/// Parse grammar-definition text into a `Grammar`. The result is
/// syntactically sound but not yet validated; `EarleyParser::new` runs the
/// semantic checks.
pub fn parse(src: &str) -> Result<Grammar, GrammarError> {
    let spec = grm::SpecParser::new()
        .parse(src)
        .map_err(|e| GrammarError::Parse(e.to_string()))?;
    assemble(spec)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Grammar, GrammarError> {
    let src = fs_err::read_to_string(path.as_ref())?;
    parse(&src)
}

fn assemble(spec: ast::SpecAst) -> Result<Grammar, GrammarError> {
    let mut g = Grammar::new();

    for decl in spec.decls {
        match decl {
            DeclAst::Assoc { ops, assoc } => g.declare_operator_assocs(ops, assoc),
            DeclAst::Ignore(pattern) => g.declare_ignore(pattern),
            DeclAst::Optional { sym, pattern } => g.declare_optional(sym, pattern),
        }
    }

    for rule_ast in spec.rules {
        let lhs = rule_ast.lhs.clone();
        let mut rule = Rule::new(rule_ast.lhs);
        for prod_ast in rule_ast.prods {
            let p = assemble_production(&lhs, prod_ast)?;
            rule = rule.production(p);
        }
        g.add_rule(rule);
    }

    Ok(g)
}

fn assemble_production(lhs: &str, prod: ProdAst) -> Result<Production, GrammarError> {
    let (elems, tail) = match prod {
        ProdAst::Empty { s_action } => {
            let mut p = Production::new(vec![Symbol::Epsilon]);
            if let Some(name) = s_action {
                p = p.with_s_action(name);
            }
            return Ok(p);
        }
        ProdAst::Seq { elems, tail } => (elems, tail),
    };

    // An action binds to the symbol after it (inherited); an action with no
    // following symbol must be the last element (synthesized).
    let mut rhs = Vec::new();
    let mut i_actions: Vec<Option<String>> = Vec::new();
    let mut pending: Option<String> = None;
    for elem in elems {
        match elem {
            ElemAst::Action(name) => {
                if pending.is_some() {
                    return Err(GrammarError::Parse(format!(
                        "rule {}: two consecutive actions",
                        lhs
                    )));
                }
                pending = Some(name);
            }
            ElemAst::Sym(sym) => {
                rhs.push(match sym {
                    SymAst::NonTerm(name) => Symbol::NonTerm(name),
                    SymAst::Term(pattern) => Symbol::Term(pattern),
                });
                i_actions.push(pending.take());
            }
        }
    }

    let (dprec, prec_of, tail_action) = match tail {
        Some(TailAst::Dprec { dprec, s_action }) => (Some(dprec), None, s_action),
        Some(TailAst::Prec { op, s_action }) => (None, Some(op), s_action),
        None => (None, None, None),
    };

    let s_action = if dprec.is_some() || prec_of.is_some() {
        if pending.is_some() {
            return Err(GrammarError::Parse(format!(
                "rule {}: the production action must follow %dprec/%prec",
                lhs
            )));
        }
        tail_action
    } else {
        pending
    };

    let mut p = Production::new(rhs);
    for (ix, action) in i_actions.into_iter().enumerate() {
        if let Some(name) = action {
            p = p.with_i_action(ix, name);
        }
    }
    if let Some(name) = s_action {
        p = p.with_s_action(name);
    }
    if let Some(d) = dprec {
        p = p.with_dprec(d);
    }
    if let Some(op) = prec_of {
        p = p.with_prec_of(op);
    }
    Ok(p)
}
