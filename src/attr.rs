//! Attribute values and semantic actions.
//!
//! An AST, by the convention of this system, is a nested ordered list whose
//! first element is a tag string (`"if"`, `"call"`, ...) and whose remaining
//! elements are operands. The engine imposes no schema beyond what the
//! grammar's actions construct.
//!
//! Actions are registered callbacks, resolved by name while the grammar is
//! preprocessed. Each synthesized-attribute action receives one evaluated
//! value per right-hand-side position, in order.

use std::collections::HashMap;
use std::rc::Rc;

use derive_more::From;

use crate::error::{ActionError, GrammarError};

#[derive(Clone, PartialEq, Debug, From)]
pub enum Val {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Val>),
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::Str(s.to_string())
    }
}

impl Val {
    /// Build a tagged node: `(tag operand ...)`.
    pub fn node(tag: &str, operands: impl IntoIterator<Item = Val>) -> Val {
        let mut items = vec![Val::from(tag)];
        items.extend(operands);
        Val::List(items)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::Str(s) => Some(s),
            _ => None,
        }
    }
}

pub type ActionFn = Rc<dyn Fn(&[Val]) -> Result<Val, ActionError>>;

/// Name -> callback table. The grammar refers to actions by name; an
/// unresolved name is a construction error, the moral equivalent of the
/// action failing to compile.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionFn>,
}

impl ActionRegistry {
    pub fn new() -> ActionRegistry {
        ActionRegistry::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Val]) -> Result<Val, ActionError> + 'static,
    {
        self.actions.insert(name.into(), Rc::new(f));
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<ActionFn, GrammarError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| GrammarError::UnknownAction(name.to_string()))
    }

    /// The implicit S-action: return the first attribute's value.
    pub(crate) fn default_s_action() -> ActionFn {
        Rc::new(|vals| Ok(vals.first().cloned().unwrap_or(Val::Nil)))
    }
}

/// The attribute-evaluation tree reconstructed from a completed parse.
/// Leaves wrap a token's lexeme (or `Nil` for epsilon); interior nodes pair
/// a production's S-action with the attributes of its children.
pub(crate) enum Attr {
    Leaf(Val),
    Node { action: ActionFn, children: Vec<Attr> },
}

impl Attr {
    /// Post-order evaluation: children first, then the node's action over
    /// their values.
    pub(crate) fn eval(&self) -> Result<Val, ActionError> {
        match self {
            Attr::Leaf(v) => Ok(v.clone()),
            Attr::Node { action, children } => {
                let mut vals = Vec::with_capacity(children.len());
                for child in children {
                    vals.push(child.eval()?);
                }
                action(&vals)
            }
        }
    }
}
