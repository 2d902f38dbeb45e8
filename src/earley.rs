//! The Earley chart engine.
//!
//! A parse is a fixpoint over dotted edges `(from, to, prod, dot)`. The
//! chart is partitioned by `(to, status)`; each partition keeps the same
//! edges twice, in an insertion-ordered list (so closure passes can walk a
//! partition while new edges land in it) and a hash set (for fast
//! membership). Competing complete edges over the same span and
//! nonterminal are resolved immediately on insertion, so each partition
//! holds at most one survivor per `(from, lhs)` pair.

use std::collections::{HashMap, HashSet};

use crate::attr::{ActionRegistry, Attr, Val};
use crate::error::{ActionError, Error, GrammarError, SyntaxError, TokenizeError};
use crate::grammar::{is_synthetic, Assoc, Grammar};
use crate::preprocess::{preprocess, Compiled, Prod};
use crate::scanner::{self, Terminal, Token};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Edge {
    pub(crate) from: usize,
    pub(crate) to: usize,
    /// Index into the preprocessed production table.
    pub(crate) prod: usize,
    pub(crate) dot: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
enum Status {
    InProgress,
    Complete,
}

/// One constituent of a completed edge: either a sub-edge or the token an
/// ADVANCE step consumed.
#[derive(Clone, PartialEq, Eq, Debug)]
enum Child {
    Edge(Edge),
    Token { at: usize, token: Token },
}

impl Child {
    fn span(&self) -> (usize, usize) {
        match self {
            Child::Edge(e) => (e.from, e.to),
            Child::Token { at, .. } => (*at, *at + 1),
        }
    }
}

#[derive(Default)]
struct Partition {
    list: Vec<Edge>,
    set: HashSet<Edge>,
}

#[derive(Default)]
struct Chart {
    partitions: HashMap<(usize, Status), Partition>,
}

impl Chart {
    /// Positional access for live iteration: the partition may grow (or
    /// shrink, on a disambiguation replacement) between calls.
    fn edge_at(&self, pos: usize, status: Status, ix: usize) -> Option<Edge> {
        self.partitions
            .get(&(pos, status))
            .and_then(|p| p.list.get(ix).copied())
    }

    fn contains(&self, pos: usize, status: Status, e: &Edge) -> bool {
        self.partitions
            .get(&(pos, status))
            .map_or(false, |p| p.set.contains(e))
    }

    fn is_empty_at(&self, pos: usize, status: Status) -> bool {
        self.partitions
            .get(&(pos, status))
            .map_or(true, |p| p.list.is_empty())
    }
}

/// Which edge a disambiguation kept.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Choice {
    New,
    Old,
}

/// Ambiguity status of one parse run. `ambiguous` means at least two
/// derivations competed for some span; `resolved` means every such
/// conflict was settled by a real rule (associativity, precedence, or
/// `%dprec`) rather than by the arbitrary keep-the-old-edge default.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Ambiguity {
    pub ambiguous: bool,
    pub resolved: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ParseResult {
    /// The input so far is a viable prefix; feed more tokens.
    Pending,
    /// A start production spans the whole input; this is its value.
    Done(Val),
}

/// A compiled grammar ready to tokenize and parse. Immutable once built;
/// every `ParseRun` borrows it.
pub struct EarleyParser {
    pub(crate) prods: Vec<Prod>,
    pub(crate) by_lhs: HashMap<String, Vec<usize>>,
    pub(crate) start: String,
    pub(crate) terminals: Vec<Terminal>,
    pub(crate) inv_renamed: HashMap<String, String>,
}

impl EarleyParser {
    pub fn new(gram: &Grammar, registry: &ActionRegistry) -> Result<EarleyParser, GrammarError> {
        let Compiled { prods, by_lhs, start, terminals, inv_renamed } =
            preprocess(gram, registry)?;
        Ok(EarleyParser { prods, by_lhs, start, terminals, inv_renamed })
    }

    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, TokenizeError> {
        scanner::tokenize(&self.terminals, input)
    }

    /// Begin an incremental parse, seeded with one edge per start
    /// production.
    pub fn parse_run(&self) -> ParseRun<'_> {
        let mut run = ParseRun {
            parser: self,
            chart: Chart::default(),
            children: HashMap::new(),
            inp: Vec::new(),
            cursor: 0,
            ambiguous: false,
            resolved: true,
            done: false,
        };
        if let Some(starts) = self.by_lhs.get(&self.start) {
            for &pix in starts {
                run.add_edge(Edge { from: 0, to: 0, prod: pix, dot: 0 }, None, None);
            }
        }
        run
    }
}

/// One incremental parse over a borrowed `EarleyParser`. Chart, token
/// buffer, cursor, and ambiguity flags all persist across `feed` calls.
pub struct ParseRun<'g> {
    parser: &'g EarleyParser,
    chart: Chart,
    /// Back-pointers: each edge's most recent constituent and the
    /// in-progress edge it advanced from.
    children: HashMap<Edge, (Option<Child>, Option<Edge>)>,
    inp: Vec<Token>,
    cursor: usize,
    ambiguous: bool,
    resolved: bool,
    done: bool,
}

impl ParseRun<'_> {
    /// Append `tokens` to the run's input and extend the chart over them.
    ///
    /// Completion is tested only at the end of the accumulated input: a
    /// start production spanning all of it yields `Done`, a surviving
    /// in-progress edge at the frontier yields `Pending`, and otherwise
    /// the earliest dead position determines the `SyntaxError`.
    ///
    /// Panics if called again after `Done`.
    pub fn feed(&mut self, tokens: &[Token]) -> Result<ParseResult, Error> {
        assert!(!self.done, "feed called on a completed parse");

        self.inp.extend(tokens.iter().cloned());
        while self.cursor <= self.inp.len() {
            if self.cursor > 0 {
                self.advance(self.cursor);
            }
            self.closure(self.cursor);
            self.cursor += 1;
        }

        let parser = self.parser;
        let n = self.inp.len();
        if let Some(starts) = parser.by_lhs.get(&parser.start) {
            for &pix in starts {
                let goal = Edge { from: 0, to: n, prod: pix, dot: parser.prods[pix].rhs.len() };
                if self.chart.contains(n, Status::Complete, &goal) {
                    self.done = true;
                    return Ok(ParseResult::Done(self.evaluate(goal)?));
                }
            }
        }

        if !self.chart.is_empty_at(n, Status::InProgress) {
            return Ok(ParseResult::Pending);
        }

        // No way forward. The earliest position with no in-progress edge
        // pins the blame on the token just before it.
        let stuck = (0..=n)
            .find(|&i| self.chart.is_empty_at(i, Status::InProgress))
            .unwrap_or(n);
        let at = stuck.saturating_sub(1);
        let lexeme = self.inp.get(at).map(|t| t.lexeme.clone()).unwrap_or_default();
        Err(SyntaxError { at, lexeme }.into())
    }

    pub fn ambiguity(&self) -> Ambiguity {
        Ambiguity { ambiguous: self.ambiguous, resolved: self.resolved }
    }

    /// ADVANCE: move the dot of every edge expecting `inp[j-1]`'s terminal.
    fn advance(&mut self, j: usize) {
        let parser = self.parser;
        let tok = self.inp[j - 1].clone();
        let mut ix = 0;
        while let Some(q) = self.chart.edge_at(j - 1, Status::InProgress, ix) {
            if parser.prods[q.prod].rhs[q.dot] == tok.terminal {
                let adv = Edge { from: q.from, to: j, prod: q.prod, dot: q.dot + 1 };
                self.add_edge(adv, Some(q), Some(Child::Token { at: j - 1, token: tok.clone() }));
            }
            ix += 1;
        }
    }

    /// COMPLETE and PREDICT at position `j`, to fixpoint.
    fn closure(&mut self, j: usize) {
        let parser = self.parser;
        let mut inserted = true;
        while inserted {
            inserted = false;

            // COMPLETE: each finished edge advances every edge that was
            // waiting on its lhs at its origin.
            let mut cix = 0;
            while let Some(e) = self.chart.edge_at(j, Status::Complete, cix) {
                let lhs = &parser.prods[e.prod].lhs;
                let mut qix = 0;
                while let Some(q) = self.chart.edge_at(e.from, Status::InProgress, qix) {
                    if parser.prods[q.prod].rhs[q.dot] == *lhs {
                        let adv = Edge { from: q.from, to: j, prod: q.prod, dot: q.dot + 1 };
                        inserted |= self.add_edge(adv, Some(q), Some(Child::Edge(e)));
                    }
                    qix += 1;
                }
                cix += 1;
            }

            // PREDICT: seed zero-width edges for every nonterminal some
            // dot is facing. Synthetic terminals and optionals have no
            // productions to predict; ADVANCE consumes them directly.
            let mut pix = 0;
            while let Some(e) = self.chart.edge_at(j, Status::InProgress, pix) {
                let next = parser.prods[e.prod].rhs[e.dot].as_str();
                if !is_synthetic(next) {
                    if let Some(predicted) = parser.by_lhs.get(next) {
                        for &p in predicted {
                            inserted |=
                                self.add_edge(Edge { from: j, to: j, prod: p, dot: 0 }, None, None);
                        }
                    }
                }
                pix += 1;
            }
        }
    }

    /// Insert `e`, resolving any conflict with an existing complete edge
    /// over the same `(from, to, lhs)`. Returns true iff the chart changed.
    fn add_edge(&mut self, mut e: Edge, pred: Option<Edge>, child: Option<Child>) -> bool {
        let parser = self.parser;
        let status = if e.dot == parser.prods[e.prod].rhs.len() {
            Status::Complete
        } else {
            Status::InProgress
        };

        let mut to_remove = None;
        let mut changed = true;
        if status == Status::Complete {
            let mut competitor = None;
            if let Some(p) = self.chart.partitions.get(&(e.to, Status::Complete)) {
                for old in &p.list {
                    if old.from == e.from && parser.prods[old.prod].lhs == parser.prods[e.prod].lhs
                    {
                        competitor = Some(*old);
                        break;
                    }
                }
            }
            if let Some(old) = competitor {
                let (choice, ambiguous, resolved) = self.disambiguate(e, old, pred, child.as_ref());
                self.ambiguous |= ambiguous;
                self.resolved &= resolved;
                match choice {
                    Choice::Old => {
                        e = old;
                        changed = false;
                    }
                    Choice::New => to_remove = Some(old),
                }
            }
        }

        {
            let part = self.chart.partitions.entry((e.to, status)).or_default();
            if let Some(old) = to_remove {
                if let Some(ix) = part.list.iter().position(|x| *x == old) {
                    part.list.remove(ix);
                }
                part.set.remove(&old);
            }
            if part.set.contains(&e) {
                return false;
            }
            part.list.push(e);
            part.set.insert(e);
        }
        if changed {
            self.children.insert(e, (child, pred));
        }
        true
    }

    /// Pick between a freshly derived complete edge `e1` (whose would-be
    /// constituents are `pred`'s chain plus `child`) and the edge `e2`
    /// already in the chart.
    ///
    /// Returns `(choice, ambiguous, resolved)`. Identical constituents are
    /// the same derivation, not an ambiguity. Operator info is consulted
    /// first: a lower precedence rank wins the outermost position, and at
    /// equal rank the associativity decides by comparing spans (left favors
    /// the longer first constituent, right the longer last one). Failing
    /// that, a higher `%dprec` wins. Anything else keeps the old edge and
    /// reports the conflict unresolved.
    fn disambiguate(
        &self,
        e1: Edge,
        e2: Edge,
        pred: Option<Edge>,
        child: Option<&Child>,
    ) -> (Choice, bool, bool) {
        let parser = self.parser;
        let info1 = parser.prods[e1.prod].info;
        let info2 = parser.prods[e2.prod].info;

        let mut c1 = match pred {
            Some(p) => self.children_of(p),
            None => Vec::new(),
        };
        if let Some(child) = child {
            c1.push(child.clone());
        }
        let c2 = self.children_of(e2);

        if c1 == c2 {
            return (Choice::Old, false, true);
        }

        if let (Some((rank1, assoc1)), Some((rank2, assoc2))) = (info1.op, info2.op) {
            if rank1 == rank2 {
                return match (assoc1, assoc2) {
                    (Assoc::Left, Assoc::Left) => {
                        let end1 = c1.first().map(|c| c.span().1);
                        let end2 = c2.first().map(|c| c.span().1);
                        match (end1, end2) {
                            (Some(a), Some(b)) if a > b => (Choice::New, false, true),
                            (Some(a), Some(b)) if a < b => (Choice::Old, false, true),
                            // both constituents cover the same text
                            _ => (Choice::New, true, false),
                        }
                    }
                    (Assoc::Right, Assoc::Right) => {
                        let start1 = c1.last().map(|c| c.span().0);
                        let start2 = c2.last().map(|c| c.span().0);
                        match (start1, start2) {
                            (Some(a), Some(b)) if a < b => (Choice::New, false, true),
                            (Some(a), Some(b)) if a > b => (Choice::Old, false, true),
                            _ => (Choice::New, true, false),
                        }
                    }
                    // mixed associativity at one rank cannot be ordered
                    _ => (Choice::Old, true, false),
                };
            }
            return if rank1 < rank2 {
                (Choice::New, true, true)
            } else {
                (Choice::Old, true, true)
            };
        }

        if let (Some(d1), Some(d2)) = (info1.dprec, info2.dprec) {
            if d1 != d2 {
                return if d1 > d2 {
                    (Choice::New, true, true)
                } else {
                    (Choice::Old, true, true)
                };
            }
            return (Choice::Old, true, false);
        }

        (Choice::Old, true, false)
    }

    /// Rebuild an edge's ordered constituent list from the back-pointer
    /// chain.
    fn children_of(&self, e: Edge) -> Vec<Child> {
        let mut children = Vec::new();
        let mut cur = self.children.get(&e);
        while let Some((child, pred)) = cur {
            if let Some(c) = child {
                children.insert(0, c.clone());
            }
            cur = pred.as_ref().and_then(|p| self.children.get(p));
        }
        children
    }

    /// Run the synthesized-attribute actions bottom-up over the winning
    /// derivation of `goal`.
    fn evaluate(&self, goal: Edge) -> Result<Val, ActionError> {
        let top = Attr::Node {
            action: self.parser.prods[goal.prod].s_action.clone(),
            children: self.attrs_of(goal),
        };
        top.eval()
    }

    fn attrs_of(&self, e: Edge) -> Vec<Attr> {
        let children = self.children_of(e);
        if children.is_empty() {
            // epsilon
            return vec![Attr::Leaf(Val::Nil)];
        }
        children
            .into_iter()
            .map(|c| match c {
                Child::Edge(sub) => Attr::Node {
                    action: self.parser.prods[sub.prod].s_action.clone(),
                    children: self.attrs_of(sub),
                },
                Child::Token { token, .. } => Attr::Leaf(Val::Str(token.lexeme)),
            })
            .collect()
    }
}
