//! The evaluator (spec.md §4.2): a single-threaded, cooperative
//! scheduler draining a FIFO work queue, driving IR to values.

use crate::frame::{BindingFrame, FrameRef, InvokerLink};
use crate::prim::PrimTable;
use crate::promise::{Promise, PromiseRef};
use crate::queue::{WorkItem, WorkQueue};
use crate::receivers::{ApplyReceiver, DestructReceiver, ForceArgReceiver, ForwardReceiver, Receiver};
use crate::thunk;
use crate::trace::{self, StackTrace};
use crate::value::{ClosureData, ExceptionData, PartialPrimData, Value, ValueRef};
use loom_ast::{ExprKind, ExprRef, Literal, PrimData};
use loom_base::{Span, Symbol};
use std::rc::Rc;

/// The single-threaded, cooperative evaluator (spec.md §5). Owns the
/// work queue and the registered primitive catalogue; drives one IR
/// tree to a terminal value via [`Evaluator::evaluate`].
pub struct Evaluator {
    queue: WorkQueue,
    prims: Rc<PrimTable>,
}

impl Evaluator {
    /// `queue` must be the same [`WorkQueue`] any primitive in `prims`
    /// was wired up with (`hash_prim::DeepHash` pumps it directly) —
    /// they share one scheduler, not two independent ones.
    pub fn new(queue: WorkQueue, prims: Rc<PrimTable>) -> Self {
        Evaluator { queue, prims }
    }

    /// Convenience for callers with no primitive that needs to observe
    /// the queue (e.g. a catalogue with `deep_hash`/`submit_job`
    /// omitted): builds a fresh, private queue.
    pub fn with_fresh_queue(prims: Rc<PrimTable>) -> Self {
        Self::new(WorkQueue::new(), prims)
    }

    /// The queue this evaluator drains, for constructing primitives
    /// (e.g. [`crate::hash::Hasher`]) that must share it.
    pub fn queue(&self) -> WorkQueue {
        self.queue.clone()
    }

    /// Evaluates `expr` under an empty root frame (spec.md §9:
    /// "globals are ordinary top-level definitions reachable through
    /// the outermost `DefBinding` frame" — callers evaluating a whole
    /// resolved program pass the outermost `DefBinding` as `expr`
    /// directly; this root frame is the sentinel its `VarRef`s never
    /// walk past).
    pub fn evaluate(&mut self, expr: ExprRef) -> ValueRef {
        let root_frame = BindingFrame::root();
        let root_promise = Promise::new();
        self.queue.push(WorkItem::Eval { expr, frame: root_frame, promise: root_promise.clone() });
        self.run_to_completion(&root_promise);
        root_promise
            .value()
            .expect("internal invariant violation: work queue exhausted before the root promise was fulfilled")
    }

    /// Drains the queue until `root` is fulfilled. An empty queue
    /// before that happens is the fatal internal-invariant-violation
    /// class of error named in spec.md §7 — every well-formed program
    /// either fulfills its root promise with a value or an Exception.
    fn run_to_completion(&mut self, root: &PromiseRef) {
        pump_until(&self.queue, &self.prims, root);
    }
}

/// Drains `queue` until `target` is fulfilled, returning its value.
/// This is the only place outside `Evaluator::evaluate` allowed to run
/// the scheduler — `hash::deep_hash` uses it to force a still-
/// suspended Promise it needs to descend into (spec.md §4.3: "the
/// traversal suspends and resumes when the promise fulfills"), since
/// this evaluator has no generator/coroutine primitive to suspend a
/// Rust call stack natively.
pub fn pump_until(queue: &WorkQueue, prims: &Rc<PrimTable>, target: &PromiseRef) -> ValueRef {
    while target.value().is_none() {
        match queue.pop() {
            Some(WorkItem::Eval { expr, frame, promise }) => eval_step(queue, prims, &expr, &frame, &promise),
            Some(WorkItem::Receive { receiver, value }) => receiver.receive(queue, value),
            None => panic!(
                "internal invariant violation: work queue exhausted before the demanded promise was fulfilled"
            ),
        }
    }
    target.value().expect("just checked Some above")
}

/// Fulfills `promise` and enqueues a `Receive` work item for every
/// receiver that was waiting, so waking them happens on the next
/// queue turn rather than recursively on this call stack.
pub fn fulfill(queue: &WorkQueue, promise: &PromiseRef, value: ValueRef) {
    let waiters = promise.fulfill(value.clone());
    for receiver in waiters {
        queue.push(WorkItem::Receive { receiver, value: value.clone() });
    }
}

/// Subscribes `receiver` to `promise`, immediately enqueuing it if the
/// promise has already settled.
pub fn subscribe(queue: &WorkQueue, promise: &PromiseRef, receiver: Rc<dyn Receiver>) {
    if let Some(value) = promise.subscribe(receiver.clone()) {
        queue.push(WorkItem::Receive { receiver, value });
    }
}

/// Forwards `source`'s value into `target` once available — the
/// demand pattern shared by `VarRef` and `Get` (spec.md §4.2.2).
fn forward_or_subscribe(queue: &WorkQueue, source: &PromiseRef, target: PromiseRef) {
    match source.value() {
        Some(value) => fulfill(queue, &target, value),
        None => subscribe(queue, source, Rc::new(ForwardReceiver { target })),
    }
}

fn exception_value(reason: impl Into<String>, trace: StackTrace) -> ValueRef {
    Rc::new(Value::Exception(ExceptionData::new(reason, trace)))
}

/// Builds an `Exception` value with no captured stack trace, for use
/// by primitives (`loom_prims`) that have no `FrameRef` to walk — a
/// `Primitive::call` only ever sees forced argument values, never the
/// call-site frame (spec.md §4.4).
pub fn exception(reason: impl Into<String>) -> ValueRef {
    exception_value(reason, StackTrace::default())
}

/// The single dispatch point for one IR node, given its binding frame
/// and the promise its result must land in. Implements every
/// reduction rule of spec.md §4.2.2.
fn eval_step(queue: &WorkQueue, prims: &Rc<PrimTable>, expr: &ExprRef, frame: &FrameRef, promise: &PromiseRef) {
    match &expr.kind {
        ExprKind::VarRef { addr, .. } => {
            let addr = addr.expect("internal invariant violation: unresolved VarRef reached the evaluator");
            let target_frame = frame.at_depth(addr.depth);
            let target_promise = target_frame.slot(addr.offset);
            forward_or_subscribe(queue, &target_promise, promise.clone());
        }

        ExprKind::App { func, arg } => {
            let fn_promise = thunk::spawn(queue, func.clone(), frame.clone());
            let arg_promise = thunk::spawn(queue, arg.clone(), frame.clone());
            let receiver = Rc::new(ApplyReceiver {
                arg: arg_promise,
                invoker: frame.clone(),
                call_site: expr.location,
                target: promise.clone(),
                prims: prims.clone(),
            });
            subscribe(queue, &fn_promise, receiver);
        }

        ExprKind::Lambda { body, .. } => {
            let closure = ClosureData { body: body.clone(), frame: frame.clone() };
            fulfill(queue, promise, Rc::new(Value::Closure(closure)));
        }

        ExprKind::Literal { value } => {
            fulfill(queue, promise, Rc::new(literal_value(value)));
        }

        ExprKind::Prim { name, nargs, data } => {
            if *nargs == 0 {
                invoke_primitive(queue, prims, *name, data, Vec::new(), promise.clone());
            } else {
                let partial = PartialPrimData { name: *name, data: data.clone(), nargs: *nargs, collected: Vec::new() };
                fulfill(queue, promise, Rc::new(Value::PartialPrim(partial)));
            }
        }

        ExprKind::DefMap { .. } => {
            unreachable!("internal invariant violation: unresolved DefMap reached the evaluator")
        }

        ExprKind::Match { .. } => {
            unreachable!("internal invariant violation: unresolved Match reached the evaluator")
        }

        ExprKind::Subscribe { .. } => {
            unreachable!("internal invariant violation: unresolved Subscribe reached the evaluator")
        }

        ExprKind::Ascribe { body } => {
            queue.push(WorkItem::Eval { expr: body.clone(), frame: frame.clone(), promise: promise.clone() });
        }

        ExprKind::Construct { sum, ctor } => {
            let arity = sum.arity_of(*ctor);
            let fields = (0..arity)
                .map(|i| {
                    let depth = arity - 1 - i;
                    frame.at_depth(depth).slot(0)
                })
                .collect();
            let record = Value::Record(crate::value::RecordData { sum: sum.clone(), ctor: *ctor, fields });
            fulfill(queue, promise, Rc::new(record));
        }

        ExprKind::Destruct { cases, arg, .. } => {
            let scrutinee = thunk::spawn(queue, arg.clone(), frame.clone());
            let receiver = Rc::new(DestructReceiver {
                cases: cases.clone(),
                scrutinee: scrutinee.clone(),
                frame: frame.clone(),
                call_site: expr.location,
                target: promise.clone(),
                prims: prims.clone(),
            });
            subscribe(queue, &scrutinee, receiver);
        }

        ExprKind::Get { ctor, index, .. } => {
            let record_promise = frame.slot(0);
            let record = record_promise
                .value()
                .expect("internal invariant violation: Get reduced before its scrutinee settled");
            match &*record {
                Value::Record(rec) => {
                    debug_assert_eq!(rec.ctor, *ctor, "Get's ctor must match the record it reads");
                    let field_promise = rec.fields[*index].clone();
                    forward_or_subscribe(queue, &field_promise, promise.clone());
                }
                Value::Exception(_) => fulfill(queue, promise, record),
                _ => panic!("internal invariant violation: Get read a non-record, non-exception value"),
            }
        }

        ExprKind::DefBinding { vals, funs, body, .. } => {
            let slot_count = vals.len() + funs.len();
            let slots: Vec<PromiseRef> = (0..slot_count).map(|_| Promise::new()).collect();
            let new_frame = BindingFrame::extend(frame, slots, None);

            for (i, val) in vals.iter().enumerate() {
                let slot = new_frame.slot(i);
                queue.push(WorkItem::Eval { expr: val.clone(), frame: new_frame.clone(), promise: slot });
            }
            for (j, fun) in funs.iter().enumerate() {
                let slot = new_frame.slot(vals.len() + j);
                let closure = ClosureData { body: fun.clone(), frame: new_frame.clone() };
                fulfill(queue, &slot, Rc::new(Value::Closure(closure)));
            }

            queue.push(WorkItem::Eval { expr: body.clone(), frame: new_frame, promise: promise.clone() });
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(Rc::from(s.as_str())),
        Literal::Integer(i) => Value::Integer(i.clone()),
        Literal::Double(d) => Value::Double(*d),
        Literal::RegExp(pattern) => Value::RegExp(Rc::from(pattern.as_str())),
    }
}

/// Applies `func_value` to `arg`: dispatches on whether the received
/// value is a `Closure`, a not-yet-saturated `PartialPrim`, an
/// `Exception` (propagated unchanged, spec.md §4.2.4), or anything
/// else (a type error, reified as an `Exception`).
pub fn apply_value(
    queue: &WorkQueue,
    prims: &Rc<PrimTable>,
    func_value: ValueRef,
    arg: PromiseRef,
    invoker: FrameRef,
    call_site: Span,
    target: PromiseRef,
) {
    match &*func_value {
        Value::Closure(closure) => apply_closure(queue, closure, arg, invoker, call_site, target),
        Value::PartialPrim(partial) => apply_partial_prim(queue, prims, partial, arg, target),
        Value::Exception(_) => fulfill(queue, &target, func_value),
        _ => {
            let trace = trace::capture(&invoker);
            fulfill(queue, &target, exception_value("cannot apply a non-function value", trace));
        }
    }
}

/// Extends `closure`'s captured frame with `arg` and evaluates its
/// body directly into `target` (spec.md §4.2.2's `App` rule, case b —
/// every `Lambda` is single-parameter, so there is no partial-closure
/// case to distinguish; see `crate::value`'s doc comment).
fn apply_closure(
    queue: &WorkQueue,
    closure: &ClosureData,
    arg: PromiseRef,
    invoker: FrameRef,
    call_site: Span,
    target: PromiseRef,
) {
    let new_frame = BindingFrame::extend(&closure.frame, vec![arg], Some(InvokerLink { frame: invoker, call_site }));
    queue.push(WorkItem::Eval { expr: closure.body.clone(), frame: new_frame, promise: target });
}

fn apply_partial_prim(
    queue: &WorkQueue,
    prims: &Rc<PrimTable>,
    partial: &PartialPrimData,
    arg: PromiseRef,
    target: PromiseRef,
) {
    let mut collected = partial.collected.clone();
    collected.push(arg);
    if collected.len() == partial.nargs {
        force_prim_args(queue, prims.clone(), partial.name, partial.data.clone(), collected, Vec::new(), target);
    } else {
        let next = PartialPrimData { name: partial.name, data: partial.data.clone(), nargs: partial.nargs, collected };
        fulfill(queue, &target, Rc::new(Value::PartialPrim(next)));
    }
}

/// Dispatches `value` (the forced scrutinee of a `Destruct`) to the
/// matching case, reusing `scrutinee` itself as the case lambda's
/// slot-0 binding (spec.md §4.2.2's `Get` rule: "the enclosing binding
/// frame's slot 0 holds the record").
pub fn destruct_on(
    queue: &WorkQueue,
    prims: &Rc<PrimTable>,
    cases: &[ExprRef],
    value: ValueRef,
    scrutinee: PromiseRef,
    frame: FrameRef,
    call_site: Span,
    target: PromiseRef,
) {
    match &*value {
        Value::Record(rec) => {
            let case = cases[rec.ctor].clone();
            let case_promise = thunk::spawn(queue, case, frame.clone());
            let receiver = Rc::new(ApplyReceiver { arg: scrutinee, invoker: frame, call_site, target, prims: prims.clone() });
            subscribe(queue, &case_promise, receiver);
        }
        Value::Exception(_) => fulfill(queue, &target, value),
        _ => {
            let trace = trace::capture(&frame);
            fulfill(queue, &target, exception_value("destruct applied to a non-record value", trace));
        }
    }
}

/// Forces `promises` to values one at a time, left to right,
/// short-circuiting on the first `Exception` (spec.md §4.2.4), then
/// invokes the primitive once every argument is forced.
pub fn force_prim_args(
    queue: &WorkQueue,
    prims: Rc<PrimTable>,
    name: Symbol,
    data: PrimData,
    promises: Vec<PromiseRef>,
    forced: Vec<ValueRef>,
    target: PromiseRef,
) {
    if forced.len() == promises.len() {
        invoke_primitive(queue, &prims, name, &data, forced, target);
        return;
    }
    let next = promises[forced.len()].clone();
    match next.value() {
        Some(value) => continue_forcing_prim_args(queue, prims, name, data, promises, forced, value, target),
        None => {
            let receiver = Rc::new(ForceArgReceiver { prims, name, data, promises, forced, target });
            subscribe(queue, &next, receiver);
        }
    }
}

/// The continuation half of [`force_prim_args`]: having just forced
/// one more argument to `value`, either short-circuits on an
/// `Exception` or continues forcing the rest.
pub fn continue_forcing_prim_args(
    queue: &WorkQueue,
    prims: Rc<PrimTable>,
    name: Symbol,
    data: PrimData,
    promises: Vec<PromiseRef>,
    mut forced: Vec<ValueRef>,
    value: ValueRef,
    target: PromiseRef,
) {
    if let Value::Exception(_) = &*value {
        fulfill(queue, &target, value);
        return;
    }
    forced.push(value);
    force_prim_args(queue, prims, name, data, promises, forced, target);
}

fn invoke_primitive(
    queue: &WorkQueue,
    prims: &PrimTable,
    name: Symbol,
    data: &PrimData,
    values: Vec<ValueRef>,
    target: PromiseRef,
) {
    match prims.dispatch(name, data) {
        Some((_, primitive)) => {
            let receiver = Rc::new(crate::prim::QueueReceiver { queue: queue.clone(), target });
            primitive.call(data, values, receiver);
        }
        None => {
            let message = format!("unregistered primitive (symbol #{})", name.index());
            fulfill(queue, &target, exception_value(message, StackTrace::default()));
        }
    }
}
