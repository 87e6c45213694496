//! Sum types, constructors, and the pattern/pattern-tree data model
//! used by match lowering (spec.md §4.1.5).

use loom_base::Symbol;
use std::rc::Rc;

/// One constructor of a [`Sum`], with its declared field arity.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: Symbol,
    pub arity: usize,
}

/// A nominal algebraic type with a fixed, ordered list of constructors.
///
/// Sums are shared by reference (`Rc<Sum>`) everywhere they're used —
/// `Construct`, `Destruct`, and `Get` IR nodes, and surface
/// [`Pattern`]s — so that two uses of the same sum compare by pointer
/// identity via [`Rc::ptr_eq`].
#[derive(Debug, Clone)]
pub struct Sum {
    pub name: Symbol,
    pub constructors: Vec<Constructor>,
}

impl Sum {
    pub fn new(name: Symbol, constructors: Vec<Constructor>) -> Rc<Sum> {
        Rc::new(Sum { name, constructors })
    }

    /// The built-in two-constructor Bool sum (`False` at index 0,
    /// `True` at index 1), used by match-guard lowering to desugar a
    /// guard into a `Destruct` that short-circuits exactly like any
    /// other pattern match (spec.md §4.1.5, guards). Not a
    /// user-addressable type — constructed fresh per call, since
    /// nothing compares it by identity.
    pub fn bool_sum() -> Rc<Sum> {
        Sum::new(
            Symbol::EMPTY,
            vec![
                Constructor { name: Symbol::EMPTY, arity: 0 },
                Constructor { name: Symbol::EMPTY, arity: 0 },
            ],
        )
    }

    /// Index of a constructor by name, if present.
    pub fn index_of(&self, name: Symbol) -> Option<usize> {
        self.constructors.iter().position(|c| c.name == name)
    }

    pub fn arity_of(&self, ctor: usize) -> usize {
        self.constructors[ctor].arity
    }
}

/// A surface pattern, as produced by the parser, prior to lowering.
///
/// `Wildcard` matches anything (optionally binding a name); `Ctor`
/// commits to one constructor of a sum and recurses into its fields.
/// Constructor patterns must have arity equal to the constructor's
/// declared arity (spec.md §3 invariant); lowering never proceeds on a
/// mismatch (checked in `loom_resolve`).
#[derive(Debug, Clone)]
pub enum Pattern {
    Wildcard { bind: Option<Symbol> },
    Ctor { sum: Rc<Sum>, ctor: usize, fields: Vec<Pattern> },
}

impl Pattern {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Pattern::Wildcard { .. })
    }
}

/// A refinement node in the decision-tree prototype built during
/// pattern lowering (spec.md §4.1.5).
///
/// Each node is either `Unrefined` (no pattern has yet committed to a
/// constructor at this position) or `Committed` to one constructor,
/// with one child tree per field of that constructor.
#[derive(Debug, Clone)]
pub enum PatternNode {
    Unrefined,
    Committed { sum: Rc<Sum>, ctor: usize, children: Vec<PatternNode> },
}

impl PatternNode {
    pub fn is_unrefined(&self) -> bool {
        matches!(self, PatternNode::Unrefined)
    }
}
