//! Runtime values (spec.md §3).
//!
//! `Closure` drops the source material's `applied_count` field: every
//! `loom_ast::ExprKind::Lambda` is already single-parameter (mirroring
//! the single-param convention `loom_resolve::bind` establishes for
//! `Destruct` cases), so a multi-argument function is always a chain
//! of nested single-argument closures rather than one closure tracking
//! how many of its arguments have arrived. Partial application falls
//! out of ordinary currying — applying a `Closure` just yields another
//! value, possibly itself a `Closure` — with no counter to maintain.
//! See `DESIGN.md`.
//!
//! `PartialPrim` has no counterpart in spec.md §3's literal Value list;
//! it exists to reconcile §4.2.2's "collect nargs argument promises
//! from the nearest enclosing lambdas" with how `loom_resolve::topic`
//! actually builds primitive calls — as ordinary curried `App` chains
//! against a bare `Prim` node (see `loom_resolve::topic::cons`), not as
//! a `Prim` sitting beneath `nargs` synthetic wrapper lambdas. Treating
//! a not-yet-saturated primitive as a value `App` can curry against,
//! exactly like a `Closure`, lets one reduction rule (`ApplyReceiver`)
//! serve both. See `DESIGN.md`.

use crate::frame::FrameRef;
use crate::trace::StackTrace;
use loom_ast::{ExprRef, PrimData, Sum};
use loom_base::Symbol;
use num_bigint::BigInt;
use std::rc::Rc;

/// Shared handle to a fulfilled value. Values are immutable once built
/// (spec.md §3: "Values are immutable once fulfilled"), so sharing a
/// reference is always safe.
pub type ValueRef = Rc<Value>;

/// A fulfilled result of evaluation (spec.md §3).
#[derive(Debug, Clone)]
pub enum Value {
    String(Rc<str>),
    Integer(BigInt),
    Double(f64),
    /// A regular-expression literal, stored as source text. Compilation
    /// is a `loom_prims` concern — the evaluator core carries no regex
    /// dependency (see `DESIGN.md`).
    RegExp(Rc<str>),
    Closure(ClosureData),
    Record(RecordData),
    Exception(ExceptionData),
    /// A primitive call partway through currying its arguments. Never
    /// produced by surface programs directly — only by `Prim`
    /// reduction and `ApplyReceiver` while accumulating args.
    PartialPrim(PartialPrimData),
}

/// A lambda value: its body IR plus the frame it closes over.
#[derive(Debug, Clone)]
pub struct ClosureData {
    pub body: ExprRef,
    pub frame: FrameRef,
}

/// An instance of one constructor of a sum type. Fields are promises,
/// not values — construction never forces its arguments (spec.md
/// §4.2.2: "fulfill with a `Record` holding those promises").
#[derive(Debug, Clone)]
pub struct RecordData {
    pub sum: Rc<Sum>,
    pub ctor: usize,
    pub fields: Vec<crate::promise::PromiseRef>,
}

/// A first-class error value (spec.md §4.2.4, §7: "first-class values
/// of tag `Exception`, not process faults").
#[derive(Debug, Clone)]
pub struct ExceptionData {
    pub causes: Vec<Cause>,
}

impl ExceptionData {
    pub fn new(reason: impl Into<String>, trace: StackTrace) -> Self {
        ExceptionData { causes: vec![Cause { reason: reason.into(), trace }] }
    }
}

/// One link in an exception's cause chain (spec.md §4.2.4).
#[derive(Debug, Clone)]
pub struct Cause {
    pub reason: String,
    pub trace: StackTrace,
}

/// A primitive call with some arguments already collected, curried the
/// same way a `Closure` is.
#[derive(Debug, Clone)]
pub struct PartialPrimData {
    pub name: Symbol,
    pub data: PrimData,
    pub nargs: usize,
    pub collected: Vec<crate::promise::PromiseRef>,
}
