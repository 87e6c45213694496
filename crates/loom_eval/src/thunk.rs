//! Thunk spawning (spec.md §4.2.1, §4.2.3).
//!
//! "A thunk's `expr` and `bindings` references are released when the
//! Promise is fulfilled so that transitively reachable garbage may be
//! collected." A `Thunk` is therefore not a persistent heap object in
//! this implementation — it's exactly the `(expr, frame, promise)`
//! triple carried by a `WorkItem::Eval`. Once that work item is popped
//! and evaluated, it's dropped, releasing `expr` and `frame`; only the
//! `Promise` (already handed out to whoever is demanding the value)
//! survives.

use crate::frame::FrameRef;
use crate::promise::{Promise, PromiseRef};
use crate::queue::{WorkItem, WorkQueue};
use loom_ast::ExprRef;

/// Allocates a fresh promise and enqueues a thunk to fulfill it,
/// returning the promise so the caller can subscribe to or forward it.
/// Used wherever a *new* suspended computation is created (an `App`'s
/// function/argument positions, a `Destruct`'s scrutinee) — as opposed
/// to evaluating directly into a promise that already exists (a
/// `DefBinding` slot, or forwarding into the current thunk's own
/// promise), which callers do by pushing a `WorkItem::Eval` directly.
pub fn spawn(queue: &WorkQueue, expr: ExprRef, frame: FrameRef) -> PromiseRef {
    let promise = Promise::new();
    queue.push(WorkItem::Eval { expr, frame, promise: promise.clone() });
    promise
}
