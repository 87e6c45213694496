//! The runnable work queue (spec.md §3, §4.2.1, §5).
//!
//! "Runnable queue. FIFO of work items; a single worker drains it."
//! Modeled as `Rc<RefCell<VecDeque<_>>>` rather than a literal
//! cross-thread channel: spec.md §5 itself frames the model as "one
//! evaluator worker... no shared mutable state between workers (there
//! is one worker)", and every runtime type reachable from a work item
//! (`Value`, `Promise`, `BindingFrame`) is built on `Rc`, which is
//! `!Send` by design — sharing them across an actual OS thread
//! boundary would be unsound. `WorkQueue` is `Clone`, so a primitive
//! that captures one to enqueue a deferred completion (spec.md §5,
//! "a primitive may suspend by capturing its receiver for later
//! invocation") still only ever touches it from the same thread that
//! drives the evaluator. See `DESIGN.md`.

use crate::frame::FrameRef;
use crate::promise::PromiseRef;
use crate::receivers::Receiver;
use crate::value::ValueRef;
use loom_ast::ExprRef;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One runnable task: either advance a thunk (evaluate `expr` under
/// `frame`, fulfilling `promise`) or fire a continuation already
/// holding the value it was waiting for.
pub enum WorkItem {
    Eval { expr: ExprRef, frame: FrameRef, promise: PromiseRef },
    Receive { receiver: Rc<dyn Receiver>, value: ValueRef },
}

#[derive(Clone)]
pub struct WorkQueue(Rc<RefCell<VecDeque<WorkItem>>>);

impl WorkQueue {
    pub fn new() -> Self {
        WorkQueue(Rc::new(RefCell::new(VecDeque::new())))
    }

    pub fn push(&self, item: WorkItem) {
        self.0.borrow_mut().push_back(item);
    }

    pub fn pop(&self) -> Option<WorkItem> {
        self.0.borrow_mut().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
