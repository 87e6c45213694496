//! Hand-built IR constructors shared by the end-to-end and invariant
//! tests. This crate owns no parser (spec.md §1), so every scenario is
//! assembled directly as the IR the resolver would have produced.

#![allow(dead_code)]

use loom_ast::{Address, Constructor, Expr, ExprKind, ExprRef, Literal, PrimData, Sum};
use loom_base::{Interner, Span, Symbol};
use loom_eval::{exception, Evaluator, PrimTable, Value, ValueRef, WorkQueue};
use loom_prims::{standard_table, JobRunner, JobSpec};
use num_bigint::BigInt;
use std::cell::Cell;
use std::rc::Rc;

pub fn lit_int(n: i64) -> ExprRef {
    Expr::new(ExprKind::Literal { value: Literal::Integer(BigInt::from(n)) }, Span::default())
}

pub fn lit_str(s: &str) -> ExprRef {
    Expr::new(ExprKind::Literal { value: Literal::String(s.to_string()) }, Span::default())
}

pub fn var(depth: usize, offset: usize) -> ExprRef {
    Expr::new(
        ExprKind::VarRef { name: Symbol::default(), addr: Some(Address { depth, offset }) },
        Span::default(),
    )
}

pub fn app(func: ExprRef, arg: ExprRef) -> ExprRef {
    Expr::new(ExprKind::App { func, arg }, Span::default())
}

pub fn app2(func: ExprRef, a: ExprRef, b: ExprRef) -> ExprRef {
    app(app(func, a), b)
}

pub fn lambda(body: ExprRef) -> ExprRef {
    Expr::new(ExprKind::Lambda { param: Symbol::EMPTY, body, fnname: None }, Span::default())
}

pub fn def_binding(vals: Vec<ExprRef>, funs: Vec<ExprRef>, scc: Vec<usize>, body: ExprRef) -> ExprRef {
    let order: Vec<usize> = (0..(vals.len() + funs.len())).collect();
    Expr::new(ExprKind::DefBinding { vals, funs, scc, body, order }, Span::default())
}

pub fn construct(sum: Rc<Sum>, ctor: usize) -> ExprRef {
    Expr::new(ExprKind::Construct { sum, ctor }, Span::default())
}

pub fn destruct(sum: Rc<Sum>, arg: ExprRef, cases: Vec<ExprRef>) -> ExprRef {
    Expr::new(ExprKind::Destruct { sum, arg, cases }, Span::default())
}

pub fn get(sum: Rc<Sum>, ctor: usize, index: usize) -> ExprRef {
    Expr::new(ExprKind::Get { sum, ctor, index }, Span::default())
}

/// A curried two-field constructor: `(\_ -> \_ -> Construct(sum, ctor))
/// a b` — the `Construct` rule (spec.md §4.2.2) collects its fields
/// from the nearest enclosing single-argument lambdas, innermost first.
pub fn construct2(sum: Rc<Sum>, ctor: usize, a: ExprRef, b: ExprRef) -> ExprRef {
    let inner = lambda(construct(sum, ctor));
    let outer = lambda(inner);
    app2(outer, a, b)
}

pub fn bool_sum() -> Rc<Sum> {
    Sum::bool_sum()
}

pub fn bool_true() -> ExprRef {
    construct(bool_sum(), 1)
}

pub fn bool_false() -> ExprRef {
    construct(bool_sum(), 0)
}

/// `if cond then on_true else on_false`, desugared exactly as a guard
/// would be (spec.md §9's guard Open Question; see DESIGN.md): a
/// `Destruct` over `Sum::bool_sum()` whose `False` case (index 0) is
/// `on_false` and whose `True` case (index 1) is `on_true`.
pub fn if_then_else(cond: ExprRef, on_true: ExprRef, on_false: ExprRef) -> ExprRef {
    destruct(bool_sum(), cond, vec![lambda(on_false), lambda(on_true)])
}

pub fn pair_sum() -> Rc<Sum> {
    Sum::new(Symbol::EMPTY, vec![Constructor { name: Symbol::EMPTY, arity: 2 }])
}

pub struct RefusingRunner;
impl JobRunner for RefusingRunner {
    fn submit(&self, _spec: JobSpec, on_done: Box<dyn FnOnce(ValueRef)>) {
        on_done(exception("no job runner configured for this test"));
    }
}

/// A runner that completes every job immediately with a fixed integer
/// value, counting how many times it was actually invoked — the
/// vehicle for scenario 6's "invoked exactly once despite two demands"
/// assertion.
pub struct CountingRunner {
    pub calls: Rc<Cell<u32>>,
    pub result: i64,
}

impl JobRunner for CountingRunner {
    fn submit(&self, _spec: JobSpec, on_done: Box<dyn FnOnce(ValueRef)>) {
        self.calls.set(self.calls.get() + 1);
        on_done(Rc::new(Value::Integer(BigInt::from(self.result))));
    }
}

/// Owns the interner/queue/primitive-table triple every scenario needs,
/// and exposes the standard catalogue's primitives under their actual
/// registered `Symbol`s (re-interning a name already interned by
/// [`standard_table`] is idempotent — `loom_base::Interner::intern`'s
/// own doc comment — so this never drifts from what the table
/// dispatches on).
pub struct Harness {
    interner: Interner,
    queue: WorkQueue,
    table: Rc<PrimTable>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_runner(Rc::new(RefusingRunner))
    }

    pub fn with_runner(runner: Rc<dyn JobRunner>) -> Self {
        let mut interner = Interner::new();
        let queue = WorkQueue::new();
        let table = standard_table(&mut interner, queue.clone(), runner);
        Harness { interner, queue, table }
    }

    pub fn symbol(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    /// A two-argument call to the shared `arith` primitive (spec.md
    /// §4.4), configured by `op` via `PrimData::Text` exactly as
    /// `loom_prims::integers::Arithmetic` dispatches on it.
    pub fn arith(&mut self, op: &str, a: ExprRef, b: ExprRef) -> ExprRef {
        let name = self.symbol("arith");
        let data = PrimData::Text(op.to_string());
        let prim = Expr::new(ExprKind::Prim { name, nargs: 2, data }, Span::default());
        app2(prim, a, b)
    }

    /// A two-argument call to the shared `compare` primitive.
    pub fn compare(&mut self, op: &str, a: ExprRef, b: ExprRef) -> ExprRef {
        let name = self.symbol("compare");
        let data = PrimData::Text(op.to_string());
        let prim = Expr::new(ExprKind::Prim { name, nargs: 2, data }, Span::default());
        app2(prim, a, b)
    }

    /// A zero-argument call to a custom single-use primitive registered
    /// just for this scenario (e.g. scenario 1's `expensive`), alongside
    /// the standard catalogue.
    pub fn register(&mut self, name: &str, arity: usize, prim: Rc<dyn loom_eval::Primitive>) {
        Rc::get_mut(&mut self.table)
            .expect("Harness table not yet shared")
            .register(self.interner.intern(name), arity, prim);
    }

    pub fn prim_call(&mut self, name: &str, arg: ExprRef) -> ExprRef {
        let symbol = self.interner.intern(name);
        let prim = Expr::new(
            ExprKind::Prim { name: symbol, nargs: 1, data: PrimData::None },
            Span::default(),
        );
        app(prim, arg)
    }

    pub fn clone_queue(&self) -> WorkQueue {
        self.queue.clone()
    }

    /// Re-registers `submit_job` against a different runner than the
    /// one `Harness::new`/`with_runner` wired in at construction.
    pub fn set_runner(&mut self, runner: Rc<dyn JobRunner>) {
        self.register("submit_job", 1, Rc::new(loom_prims::job::SubmitJob { runner }));
    }

    pub fn run(&mut self, expr: ExprRef) -> ValueRef {
        let mut evaluator = Evaluator::new(self.queue.clone(), self.table.clone());
        evaluator.evaluate(expr)
    }
}

pub fn as_integer(value: &ValueRef) -> BigInt {
    match &**value {
        Value::Integer(i) => i.clone(),
        other => panic!("expected Integer, got {other:?}"),
    }
}

pub fn as_string(value: &ValueRef) -> String {
    match &**value {
        Value::String(s) => s.to_string(),
        other => panic!("expected String, got {other:?}"),
    }
}

pub fn is_exception(value: &ValueRef) -> bool {
    matches!(&**value, Value::Exception(_))
}

pub fn bool_ctor(value: &ValueRef) -> usize {
    match &**value {
        Value::Record(rec) => rec.ctor,
        other => panic!("expected a bool Record, got {other:?}"),
    }
}
