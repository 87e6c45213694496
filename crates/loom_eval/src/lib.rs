#![cfg_attr(docsrs, feature(doc_cfg))]

//! # loom-eval
//!
//! The lazy evaluator (spec.md §4.2, §5): binding frames, single-
//! assignment promises, a cooperative FIFO work queue, the primitive-
//! call protocol, and deep structural value hashing. Consumes the IR
//! `loom_resolve` produces; knows nothing about source syntax,
//! packages, or diagnostics beyond the `Span`s it threads through for
//! stack traces.
//!
//! # Modules
//!
//! - [`value`] — the runtime [`value::Value`] enum and its payloads
//! - [`frame`] — [`frame::BindingFrame`], lexical/call-site frame chains
//! - [`promise`] — [`promise::Promise`], the single-assignment cell
//! - [`queue`] — [`queue::WorkQueue`], the cooperative scheduler's FIFO
//! - [`thunk`] — spawning a fresh suspended computation
//! - [`receivers`] — the closed set of promise continuations
//! - [`prim`] — the primitive-call protocol and [`prim::PrimTable`]
//! - [`eval`] — [`eval::Evaluator`], the reduction rules, and the
//!   application/primitive-forcing machinery
//! - [`hash`] — deep structural value hashing (§4.3)
//! - [`trace`] — stack-trace reconstruction from `invoker` chains

pub mod eval;
pub mod frame;
pub mod hash;
pub mod prim;
pub mod promise;
pub mod queue;
pub mod receivers;
pub mod thunk;
pub mod trace;
pub mod value;

pub use eval::{exception, Evaluator};
pub use frame::{BindingFrame, FrameRef, InvokerLink};
pub use prim::{PrimReceiver, PrimTable, Primitive, QueueReceiver};
pub use promise::{Promise, PromiseRef};
pub use queue::{WorkItem, WorkQueue};
pub use receivers::Receiver;
pub use trace::StackTrace;
pub use value::{Cause, ClosureData, ExceptionData, PartialPrimData, RecordData, Value, ValueRef};
