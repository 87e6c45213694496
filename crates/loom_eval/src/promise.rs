//! Promises: single-assignment cells (spec.md §3, §4.2.1).
//!
//! "A single-assignment cell that either holds a Value or a list of
//! suspended Receivers waiting for it... transitions exactly once from
//! *empty* to *fulfilled*." Fulfillment and waking waiters are split
//! across two calls on purpose: [`Promise::fulfill`] only mutates the
//! promise itself and hands back the waiters that were waiting, since
//! waking them (enqueuing `Receive` work items) is the evaluator
//! queue's job, not the promise's — a `Promise` has no reference to
//! any queue, keeping the sharing-and-laziness core independent of the
//! scheduler that drives it.

use crate::receivers::Receiver;
use crate::value::ValueRef;
use std::cell::RefCell;
use std::rc::Rc;

pub type PromiseRef = Rc<Promise>;

enum State {
    Empty(Vec<Rc<dyn Receiver>>),
    Fulfilled(ValueRef),
}

pub struct Promise {
    state: RefCell<State>,
}

impl Promise {
    pub fn new() -> PromiseRef {
        Rc::new(Promise { state: RefCell::new(State::Empty(Vec::new())) })
    }

    /// The stored value, if this promise has already been fulfilled.
    pub fn value(&self) -> Option<ValueRef> {
        match &*self.state.borrow() {
            State::Fulfilled(v) => Some(v.clone()),
            State::Empty(_) => None,
        }
    }

    /// Fulfills this promise with `value`, returning every receiver
    /// that was waiting so the caller can wake them. Panics if this
    /// promise was already fulfilled — per spec.md §3's invariant, a
    /// Promise transitions at most once; a second fulfillment is an
    /// internal invariant violation, not reachable from any
    /// well-formed IR program (spec.md §7, "fatal runtime conditions").
    pub fn fulfill(&self, value: ValueRef) -> Vec<Rc<dyn Receiver>> {
        let mut state = self.state.borrow_mut();
        match std::mem::replace(&mut *state, State::Fulfilled(value)) {
            State::Empty(waiters) => waiters,
            State::Fulfilled(_) => {
                panic!("internal invariant violation: promise fulfilled twice")
            }
        }
    }

    /// Subscribes `receiver` to this promise. Returns the already-
    /// fulfilled value immediately (without recording the receiver as
    /// a waiter) if one is present, so the caller can wake it without
    /// ever touching the waiter list for an already-settled promise.
    pub fn subscribe(&self, receiver: Rc<dyn Receiver>) -> Option<ValueRef> {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            State::Fulfilled(v) => Some(v.clone()),
            State::Empty(waiters) => {
                waiters.push(receiver);
                None
            }
        }
    }
}
