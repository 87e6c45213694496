//! The six end-to-end scenarios of spec.md §8, one test function each.

mod common;

use common::*;
use loom_ast::{ExprKind, PrimData};
use loom_base::Span;
use loom_eval::{PrimReceiver, Primitive, Value, ValueRef};
use num_bigint::BigInt;
use std::cell::Cell;
use std::rc::Rc;

/// `expensive(n)`: counts its own invocations and returns `n` doubled,
/// standing in for scenario 1's opaque "expensive" computation.
struct Expensive {
    calls: Rc<Cell<u32>>,
}

impl Primitive for Expensive {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        self.calls.set(self.calls.get() + 1);
        let n = match &*args[0] {
            Value::Integer(i) => i.clone(),
            other => panic!("expected Integer, got {other:?}"),
        };
        receiver.complete(Rc::new(Value::Integer(n * 2)));
    }
}

/// `def x = expensive 1; def y = x + x; y` — `expensive` invoked
/// exactly once, and the result equals `2 * expensive(1)`.
#[test]
fn scenario_1_shared_computation_invokes_expensive_exactly_once() {
    let mut h = Harness::new();
    let calls = Rc::new(Cell::new(0u32));
    h.register("expensive", 1, Rc::new(Expensive { calls: calls.clone() }));

    // DefBinding level 0: vals = [x, y], no funs.
    // x = expensive(1)            -> slot 0
    // y = x + x                   -> slot 1, x is VarRef{depth:0, offset:0}
    // body = y                    -> VarRef{depth:0, offset:1}
    let x = h.prim_call("expensive", lit_int(1));
    let y = h.arith("add", var(0, 0), var(0, 0));
    let body = var(0, 1);
    let program = def_binding(vec![x, y], vec![], vec![], body);

    let result = h.run(program);

    assert_eq!(calls.get(), 1, "expensive must be invoked exactly once");
    assert_eq!(as_integer(&result), BigInt::from(4));
}

/// `def even n = if n==0 then T else odd (n-1);
///  def odd n = if n==0 then F else even (n-1);
///  even 4` evaluates to `T`; both functions share one `DefBinding.funs`
/// SCC (spec.md §8 scenario 2).
#[test]
fn scenario_2_mutual_lambda_recursion_reduces_to_true() {
    let mut h = Harness::new();

    // DefBinding level 0: funs = [even, odd] (same SCC), slots 0 and 1.
    // Each is a lambda over `n` (frame depth 0 relative to its own
    // call, i.e. depth 1 relative to the DefBinding level once inside
    // the lambda body, offset 0 for the lambda's own param slot).
    //
    // even = \n -> if n == 0 then True else odd (n - 1)
    // odd  = \n -> if n == 0 then False else even (n - 1)
    //
    // Inside a lambda body, VarRef(depth 0, offset 0) is the lambda's
    // own parameter frame; VarRef(depth 1, offset k) reaches back into
    // the enclosing DefBinding's slot k (even=0, odd=1).
    let even_body = if_then_else(
        h.compare("eq", var(0, 0), lit_int(0)),
        bool_true(),
        app(var(1, 1), h.arith("sub", var(0, 0), lit_int(1))),
    );
    let odd_body = if_then_else(
        h.compare("eq", var(0, 0), lit_int(0)),
        bool_false(),
        app(var(1, 0), h.arith("sub", var(0, 0), lit_int(1))),
    );
    let even = lambda(even_body);
    let odd = lambda(odd_body);

    let body = app(var(0, 0), lit_int(4));
    let program = def_binding(vec![], vec![even, odd], vec![0, 0], body);

    let result = h.run(program);
    assert_eq!(bool_ctor(&result), 1, "expected True (ctor index 1)");
}

/// `def a = b + 1; def b = a + 1` is illegal value recursion. This
/// crate owns no resolver-facing parser, so the resolver-side rejection
/// itself is exercised by `loom_resolve::stratify`'s own unit tests;
/// this scenario instead confirms the IR shape that *would* trigger the
/// rejection is recognized as cyclic by the same stratifier the
/// resolver calls.
#[test]
fn scenario_3_illegal_value_recursion_is_detected_as_a_cycle() {
    use loom_resolve::stratify::{stratify_levels, Edge};

    // a depends on b, b depends on a — neither is a lambda, so both
    // edges carry weight 1 (spec.md §4.1.4): a genuine value-recursion
    // cycle, the IR-level shape of `def a = b + 1; def b = a + 1`.
    let is_lambda = [false, false];
    let edges = vec![Edge { from: 0, to: 1 }, Edge { from: 1, to: 0 }];
    let (levels, cycles) = stratify_levels(2, &is_lambda, &edges);

    assert_eq!(cycles.len(), 1, "mutual non-lambda recursion must be reported as exactly one illegal cycle");
    assert_eq!(cycles[0].members.len(), 2, "both a and b sit on the reported cycle");
    assert!(levels.iter().all(Option::is_none), "both erased definitions have no stratified level");
}

/// `match pair | Pair x y if lt x y = "less" | _ = "other"` against
/// `Pair 1 2` yields `"less"`, against `Pair 2 1` yields `"other"`
/// (spec.md §8 scenario 4). This implementation lowers pattern-bound
/// fields to `Get` nodes reading the scrutinee's frame slot 0 rather
/// than named `VarRef`s (see DESIGN.md), so `x`/`y` below are
/// `Get{pair_sum, 0, 0}` / `Get{pair_sum, 0, 1}`.
#[test]
fn scenario_4_pattern_match_with_guard() {
    let mut h = Harness::new();
    let sum = pair_sum();

    let case = {
        let x = get(sum.clone(), 0, 0);
        let y = get(sum.clone(), 0, 1);
        let guard = h.compare("lt", x, y);
        let on_true = lit_str("less");
        let on_false = lit_str("other");
        lambda(if_then_else(guard, on_true, on_false))
    };

    let less_pair = construct2(sum.clone(), 0, lit_int(1), lit_int(2));
    let less_result = h.run(destruct(sum.clone(), less_pair, vec![case.clone()]));
    assert_eq!(as_string(&less_result), "less");

    let other_pair = construct2(sum.clone(), 0, lit_int(2), lit_int(1));
    let other_result = h.run(destruct(sum, other_pair, vec![case]));
    assert_eq!(as_string(&other_result), "other");
}

/// Builds the list `[1, 2, 3]` out of `list_cons`/`list_nil`.
fn build_list(items: &[i64]) -> loom_ast::ExprRef {
    let nil = prim_text_call(loom_prims::list::NIL_PRIM, 0);
    items.iter().rev().fold(nil, |tail, &n| {
        let cons = prim_text_call(loom_prims::list::CONS_PRIM, 2);
        app2(cons, lit_int(n), tail)
    })
}

/// A `Prim` node reachable only by `PrimData::Text` name (spec.md
/// §4.4, the synthesized list primitives — `loom_resolve::topic`
/// builds calls the same way).
fn prim_text_call(name: &str, nargs: usize) -> loom_ast::ExprRef {
    loom_ast::Expr::new(
        ExprKind::Prim { name: loom_base::Symbol::EMPTY, nargs, data: PrimData::Text(name.to_string()) },
        Span::default(),
    )
}

/// Two syntactically different programs constructing `[1, 2, 3]`
/// (one right-folded, one built by explicit nested `App`s) hash
/// identically; a program constructing `[1, 2, 4]` hashes differently
/// (spec.md §8 scenario 5).
#[test]
fn scenario_5_deep_hash_stability_across_structurally_equal_lists() {
    let mut h1 = Harness::new();
    let list_a = build_list(&[1, 2, 3]);
    let hash_a = h1.prim_call("deep_hash", list_a);
    let digest_a = as_integer(&h1.run(hash_a));

    let mut h2 = Harness::new();
    // Built independently, via a differently-shaped fold (left nested
    // `App`s wrapping a hand-spelled cons chain) but structurally
    // identical once evaluated.
    let nil = prim_text_call(loom_prims::list::NIL_PRIM, 0);
    let cons = prim_text_call(loom_prims::list::CONS_PRIM, 2);
    let tail = app2(cons.clone(), lit_int(3), nil);
    let tail = app2(cons.clone(), lit_int(2), tail);
    let list_b = app2(cons, lit_int(1), tail);
    let hash_b = h2.prim_call("deep_hash", list_b);
    let digest_b = as_integer(&h2.run(hash_b));

    assert_eq!(digest_a, digest_b, "structurally identical lists must hash identically");

    let mut h3 = Harness::new();
    let list_c = build_list(&[1, 2, 4]);
    let hash_c = h3.prim_call("deep_hash", list_c);
    let digest_c = as_integer(&h3.run(hash_c));

    assert_ne!(digest_a, digest_c, "a differing element must change the digest");
}

/// A job runner that defers completion by recursively re-entering the
/// evaluator's queue one turn later, rather than completing inline
/// from within `Primitive::call` — modeling "the external job runner...
/// calls the receiver, which enqueues a work item on the evaluator's
/// queue" (spec.md §5) instead of `CountingRunner`'s fully synchronous
/// completion. `WorkQueue` is `Clone` precisely so a primitive can hold
/// its own handle to push onto it later (`loom_eval::queue`'s own doc
/// comment): here "later" is simulated as "after this primitive call
/// returns" by pushing a zero-argument closure application that
/// resolves immediately on the next queue turn, rather than completing
/// within `submit`'s own call frame.
struct DeferredRunner {
    calls: Rc<Cell<u32>>,
    queue: loom_eval::WorkQueue,
}

impl loom_prims::JobRunner for DeferredRunner {
    fn submit(&self, _spec: loom_prims::JobSpec, on_done: Box<dyn FnOnce(ValueRef)>) {
        self.calls.set(self.calls.get() + 1);
        let result = Rc::new(Value::Integer(BigInt::from(21)));
        // Enqueued rather than called inline: the receiver fires on a
        // later turn of the same cooperative scheduler, not inside
        // this stack frame.
        self.queue.push(loom_eval::WorkItem::Receive {
            receiver: Rc::new(DeferredReceiver { on_done: std::cell::RefCell::new(Some(on_done)) }),
            value: result,
        });
    }
}

struct DeferredReceiver {
    on_done: std::cell::RefCell<Option<Box<dyn FnOnce(ValueRef)>>>,
}

impl loom_eval::Receiver for DeferredReceiver {
    fn receive(&self, _queue: &loom_eval::WorkQueue, value: ValueRef) {
        if let Some(on_done) = self.on_done.borrow_mut().take() {
            on_done(value);
        }
    }
}

/// A primitive `job` that defers its receiver to a later queue turn
/// still delivers its result into the demanding thunk's Promise; a
/// second, independent demand on the same `DefBinding` slot returns
/// the cached value without re-invoking the primitive (spec.md §8
/// scenario 6).
#[test]
fn scenario_6_deferred_primitive_delivers_once_and_is_cached() {
    let calls = Rc::new(Cell::new(0u32));
    let mut h = Harness::new();
    let runner = Rc::new(DeferredRunner { calls: calls.clone(), queue: h.clone_queue() });
    h.set_runner(runner);

    let job = h.prim_call("submit_job", lit_str("build"));
    // Two independent demands on the same DefBinding slot.
    let shared_a = var(0, 0);
    let shared_b = var(0, 0);
    let pair = h.arith("add", shared_a, shared_b);
    let program = def_binding(vec![job], vec![], vec![], pair);

    let result = h.run(program);

    assert_eq!(calls.get(), 1, "submit_job must be invoked exactly once even though its result is shared");
    assert_eq!(as_integer(&result), BigInt::from(42));
}

/// `refutable match pair | Empty = 0` against a `Pair 3 4` (a
/// constructor the match never names) reconstructs `Pair 3 4` rather
/// than erroring — the identity fallthrough of a `refutable` match with
/// no `otherwise` (spec.md §4.1.5, §8; Glossary's "Refutable match").
///
/// The match itself is resolved through `loom_resolve::bind::resolve_expr`
/// (the actual lowering code this exercises), then the resolved IR is
/// wrapped in a second, hand-built `Destruct` that sums the reconstructed
/// record's two fields — `7` confirms both the constructor and the field
/// values survived the reconstruction; `0` or an exception would mean
/// they didn't.
#[test]
fn identity_fallthrough_reconstructs_an_unmatched_constructor_end_to_end() {
    use loom_ast::sum::{Constructor, Pattern};
    use loom_ast::{MatchArm, PrimitiveRegistry, Sum};
    use loom_base::{Span, Symbol};
    use loom_resolve::bind::resolve_expr;
    use loom_resolve::scope::{GlobalTable, Scope};

    struct EmptyRegistry;
    impl PrimitiveRegistry for EmptyRegistry {
        fn lookup(&self, _name: Symbol) -> Option<&loom_ast::PrimDescriptor> {
            None
        }
    }

    // ctor 0 = Pair(a, b), ctor 1 = Empty — only Empty has a row.
    let sum = Sum::new(
        Symbol::EMPTY,
        vec![Constructor { name: Symbol::EMPTY, arity: 2 }, Constructor { name: Symbol::EMPTY, arity: 0 }],
    );

    let scrutinee = construct2(sum.clone(), 0, lit_int(3), lit_int(4));
    let pattern = Pattern::Ctor { sum: sum.clone(), ctor: 1, fields: vec![] };
    let rhs = lit_int(0);
    let arms = vec![MatchArm { patterns: vec![pattern], guard: None, rhs, location: Span::default() }];
    let match_expr = loom_ast::Expr::new(
        ExprKind::Match { args: vec![scrutinee], arms, otherwise: None, refutable: true },
        Span::default(),
    );

    let file_local = loom_ast::SymbolTable::new();
    let file_imports = loom_ast::SymbolTable::new();
    let package_exports = loom_ast::SymbolTable::new();
    let globals_qualified = loom_ast::SymbolTable::new();
    let globals = GlobalTable::new();
    let mut scope = Scope::new(&file_local, &file_imports, &package_exports, &globals_qualified, &globals);
    let mut reporter = loom_diagnostic::Reporter::new();
    let registry = EmptyRegistry;

    let resolved = resolve_expr(&match_expr, &mut scope, &mut reporter, &registry);
    assert!(!reporter.has_errors());

    // Dispatch on the reconstructed value: ctor 0 (Pair) sums its two
    // fields, ctor 1 (Empty, i.e. the match rewrote the record instead of
    // reconstructing it) returns -1.
    let mut h = Harness::new();
    let pair_case = lambda(h.arith("add", get(sum.clone(), 0, 0), get(sum.clone(), 0, 1)));
    let empty_case = lambda(lit_int(-1));
    let check = destruct(sum, resolved, vec![pair_case, empty_case]);

    let result = h.run(check);
    assert_eq!(as_integer(&result), BigInt::from(7), "expected the reconstructed Pair's fields, 3 + 4");
}
