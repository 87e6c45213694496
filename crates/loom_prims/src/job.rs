//! Job submission (spec.md §4.4, §5): "the only primitive whose
//! receiver completion is externally driven."
//!
//! [`JobRunner`] is the seam a host embeds an external job executor
//! through (spec.md §1's "external job executor" the language
//! orchestrates but never implements itself). The primitive only
//! forwards to it — no execution, sandboxing, or caching lives here;
//! that remains the host's responsibility.
//!
//! **Deviation from a literal `+ Send` bound.** The completion
//! callback ultimately calls `receiver.complete`, and `receiver` is an
//! `Rc<dyn PrimReceiver>` — `Rc` is `!Send` by construction, matching
//! this evaluator's single-threaded, `Rc`-based core (see
//! `loom_eval::queue`'s own doc comment on the same point). A runner
//! backed by a real OS thread or async task must re-enter by some
//! other thread-safe channel and only call `on_done` back on the
//! evaluator's own thread; that hop is the host's concern, not this
//! trait's. See `DESIGN.md`.

use loom_ast::PrimData;
use loom_eval::{exception, PrimReceiver, Primitive, Value, ValueRef};
use std::rc::Rc;

/// An opaque description of one external job. Kept minimal — this
/// language doesn't prescribe a job shape beyond "something an
/// external runner can execute and eventually produce a value for"
/// (spec.md §1, §5).
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub command: String,
}

/// The host-provided job executor.
pub trait JobRunner {
    fn submit(&self, spec: JobSpec, on_done: Box<dyn FnOnce(ValueRef)>);
}

/// `submit_job(command)`: builds a `JobSpec` from `command` and hands
/// it, with a receiver-forwarding callback, to the injected runner.
pub struct SubmitJob {
    pub runner: Rc<dyn JobRunner>,
}

impl Primitive for SubmitJob {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let command = args.into_iter().next().expect("submit_job called with no arguments");
        let command = match &*command {
            Value::String(s) => s.to_string(),
            _ => {
                receiver.complete(exception("submit_job: expected a string command"));
                return;
            }
        };
        self.runner.submit(JobSpec { command }, Box::new(move |value| receiver.complete(value)));
    }
}
