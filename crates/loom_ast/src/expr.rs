//! The shared expression tree: the AST the parser produces and, after
//! the variants the resolver fills in (`addr` on `VarRef`, the
//! `DefBinding` variant), the IR the evaluator consumes.
//!
//! spec.md §3 describes this as a single tagged variant with common
//! `location`/type-variable fields; `DefBinding` "only appears in the
//! IR". We keep one `Expr`/`ExprKind` pair for both stages rather than
//! two parallel trees, matching the source material's own "AST nodes
//! are... partially transformed in place by the resolver, and become
//! IR" lifecycle (spec.md §3, Lifecycle).

use crate::sum::Sum;
use crate::typevar::TypeVar;
use loom_base::{Span, Symbol};
use num_bigint::BigInt;
use std::rc::Rc;

/// Shared, reference-counted handle to a sub-expression.
///
/// `Rc` (not `Box`) because the same IR body is referenced by every
/// thunk built from it — spec.md §4.2.3: "a thunk's `expr`... [is]
/// released when the Promise is fulfilled", which for a shared `Rc`
/// simply means dropping one reference, not deep-copying the subtree.
pub type ExprRef = Rc<Expr>;

/// One node of the AST/IR, with the fields spec.md §3 says every node
/// carries: a location for diagnostics and an optional type-variable
/// handle for the external type checker.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Span,
    pub type_var: Option<TypeVar>,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Span) -> ExprRef {
        Rc::new(Expr { kind, location, type_var: None })
    }

    pub fn with_type_var(kind: ExprKind, location: Span, type_var: TypeVar) -> ExprRef {
        Rc::new(Expr { kind, location, type_var: Some(type_var) })
    }
}

/// A resolved lexical address: walk `depth` enclosing binding frames,
/// then read slot `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub depth: usize,
    pub offset: usize,
}

/// Opaque, primitive-specific configuration baked in at the call site
/// (e.g. a regex literal pattern, or which arithmetic operator a
/// shared numeric primitive should perform). The primitive's
/// executable behavior itself is looked up by `name` in the
/// evaluator's primitive table (see `loom_eval::prim`); this crate
/// only carries the per-call-site data the executor will need.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimData {
    None,
    Text(String),
    Integer(i64),
}

/// A literal constant, as produced by the lexer/parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(BigInt),
    Double(f64),
    RegExp(String),
}

/// One definition inside a `DefMap`, prior to dependency stratification.
#[derive(Debug, Clone)]
pub struct Def {
    pub name: Symbol,
    pub value: ExprRef,
    pub exported: bool,
    pub location: Span,
}

/// One arm of a `Match`: one pattern per scrutinee argument, an
/// optional guard, and a right-hand side.
///
/// spec.md §9's Open Question on guards: "evaluate the guard thunk;
/// on true, force the rhs thunk" — this struct keeps `guard` and
/// `rhs` as two independent expressions rather than modeling the
/// source's `Pair` datatype, since Rust's native field access gives
/// us the same "force one, then maybe force the other" contract
/// without an intermediate value.
#[derive(Debug, Clone)]
pub struct MatchArm {
    pub patterns: Vec<crate::sum::Pattern>,
    pub guard: Option<ExprRef>,
    pub rhs: ExprRef,
    pub location: Span,
}

/// The tagged variant at the heart of the data model (spec.md §3).
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A reference to a binding. `addr` is `None` until the resolver
    /// fills it in; IR handed to the evaluator never has `addr ==
    /// None` (spec.md §3 invariant).
    VarRef { name: Symbol, addr: Option<Address> },

    /// Function application.
    App { func: ExprRef, arg: ExprRef },

    /// A single-argument lambda. `fnname` is the optional
    /// user-provided name used in stack traces.
    Lambda { param: Symbol, body: ExprRef, fnname: Option<Symbol> },

    /// A literal constant.
    Literal { value: Literal },

    /// A call to a registered primitive. `data` is resolved from the
    /// call site's literal arguments (if any); `nargs` is copied from
    /// the primitive registry's declared arity.
    Prim { name: Symbol, nargs: usize, data: PrimData },

    /// A (not yet stratified) map of local definitions plus imports,
    /// as produced by the parser. The resolver consumes this and
    /// replaces it with nested `DefBinding`s.
    DefMap { defs: Vec<Def>, body: ExprRef, imports: Vec<crate::module::Import> },

    /// A pattern match over `args.len()` scrutinees.
    Match { args: Vec<ExprRef>, arms: Vec<MatchArm>, otherwise: Option<ExprRef>, refutable: bool },

    /// A reference to a topic's accumulated value (spec.md §4.1.3).
    /// Resolved away into a `VarRef` against the topic's mangled
    /// global before reaching the evaluator — never an evaluator-level
    /// reduction target itself.
    Subscribe { topic: Symbol },

    /// A type ascription; evaluates to its body unchanged.
    Ascribe { body: ExprRef },

    /// Curried construction of one constructor of `sum`. The
    /// constructor's `arity` nearest-enclosing single-argument lambda
    /// promises supply its fields (spec.md §4.2.2).
    Construct { sum: Rc<Sum>, ctor: usize },

    /// Destructures `arg` (a `Record` of `sum`) by dispatching to the
    /// matching entry of `cases`, one curried lambda per constructor.
    Destruct { sum: Rc<Sum>, arg: ExprRef, cases: Vec<ExprRef> },

    /// Reads field `index` of constructor `ctor`'s record, found in
    /// the enclosing binding frame's slot 0.
    Get { sum: Rc<Sum>, ctor: usize, index: usize },

    /// IR-only: one level of mutually recursive definitions. `vals[i]`
    /// are non-lambda definitions; `funs[i]` are lambdas; `scc[i]`
    /// names `funs[i]`'s strongly connected component index.
    /// `order` records the original source order of the combined
    /// `vals`/`funs` slots, for stack-trace rendering.
    DefBinding {
        vals: Vec<ExprRef>,
        funs: Vec<ExprRef>,
        scc: Vec<usize>,
        body: ExprRef,
        order: Vec<usize>,
    },
}
