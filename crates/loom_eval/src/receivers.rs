//! Receivers: continuations subscribed to a [`crate::promise::Promise`]
//! (spec.md §3, §4.2.1).
//!
//! "A closed set of variants" (spec.md §9) dispatched by the evaluator
//! itself via `receive`; each variant here corresponds to exactly one
//! suspension point named in §4.2.2's reduction rules.

use crate::frame::FrameRef;
use crate::prim::PrimTable;
use crate::promise::PromiseRef;
use crate::queue::WorkQueue;
use crate::value::ValueRef;
use loom_ast::ExprRef;
use loom_base::Span;
use std::rc::Rc;

/// A continuation awaiting a Value (spec.md §3).
pub trait Receiver {
    fn receive(&self, queue: &WorkQueue, value: ValueRef);
}

/// Forwards a value, unchanged, into `target`. Used for `VarRef` and
/// `Get` demand on an already-suspended promise, and for `Ascribe`'s
/// pass-through (spec.md §4.2.2).
pub struct ForwardReceiver {
    pub target: PromiseRef,
}

impl Receiver for ForwardReceiver {
    fn receive(&self, queue: &WorkQueue, value: ValueRef) {
        crate::eval::fulfill(queue, &self.target, value);
    }
}

/// Attached to an `App`'s function-position promise (or, for
/// `Destruct`, to the forced case-lambda's promise): on receiving a
/// callable value, applies `arg` to it (spec.md §4.2.2's `App` rule).
pub struct ApplyReceiver {
    pub arg: PromiseRef,
    pub invoker: FrameRef,
    pub call_site: Span,
    pub target: PromiseRef,
    pub prims: Rc<PrimTable>,
}

impl Receiver for ApplyReceiver {
    fn receive(&self, queue: &WorkQueue, value: ValueRef) {
        crate::eval::apply_value(
            queue,
            &self.prims,
            value,
            self.arg.clone(),
            self.invoker.clone(),
            self.call_site,
            self.target.clone(),
        );
    }
}

/// Attached to a `Destruct`'s scrutinee promise: on receiving a
/// `Record`, dispatches to `cases[ctor]`, applying it to the very same
/// promise that was just forced (which becomes the case lambda's
/// slot-0 binding — see `Get`'s reduction rule).
pub struct DestructReceiver {
    pub cases: Vec<ExprRef>,
    pub scrutinee: PromiseRef,
    pub frame: FrameRef,
    pub call_site: Span,
    pub target: PromiseRef,
    pub prims: Rc<PrimTable>,
}

impl Receiver for DestructReceiver {
    fn receive(&self, queue: &WorkQueue, value: ValueRef) {
        crate::eval::destruct_on(
            queue,
            &self.prims,
            &self.cases,
            value,
            self.scrutinee.clone(),
            self.frame.clone(),
            self.call_site,
            self.target.clone(),
        );
    }
}

/// Forces the next of a primitive call's argument promises, in order.
/// Short-circuits the whole call the moment any argument is an
/// `Exception` (spec.md §4.2.4: "Prim (inputs)").
pub struct ForceArgReceiver {
    pub prims: Rc<PrimTable>,
    pub name: loom_base::Symbol,
    pub data: loom_ast::PrimData,
    pub promises: Vec<PromiseRef>,
    pub forced: Vec<ValueRef>,
    pub target: PromiseRef,
}

impl Receiver for ForceArgReceiver {
    fn receive(&self, queue: &WorkQueue, value: ValueRef) {
        crate::eval::continue_forcing_prim_args(
            queue,
            self.prims.clone(),
            self.name,
            self.data.clone(),
            self.promises.clone(),
            self.forced.clone(),
            value,
            self.target.clone(),
        );
    }
}
