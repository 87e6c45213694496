#![cfg_attr(docsrs, feature(doc_cfg))]

//! # loom-prims
//!
//! The concrete standard primitive catalogue (spec.md §4.4's "common
//! primitives" list): string operations, arbitrary-precision integer
//! arithmetic and comparisons, regex match/tokenize/replace, list
//! construction, deep-hash, and job submission. `loom_eval` defines
//! the primitive-call *protocol*; this crate supplies everything
//! that actually implements it, and is the only crate in the
//! workspace that depends on `regex`.
//!
//! # Modules
//!
//! - [`strings`] — concatenation, length, slicing, case conversion
//! - [`integers`] — shared arithmetic/comparison primitives, dispatched by `PrimData`
//! - [`regex_prims`] — regex match/tokenize/replace
//! - [`list`] — the `list_nil`/`list_cons` primitives `loom_resolve::topic` targets
//! - [`hash_prim`] — `loom_eval::hash::deep_hash` exposed as a primitive
//! - [`job`] — [`job::JobRunner`], the external job-execution seam

pub mod hash_prim;
pub mod integers;
pub mod job;
pub mod list;
pub mod regex_prims;
pub mod strings;

pub use job::{JobRunner, JobSpec};

use loom_base::Interner;
use loom_eval::{PrimTable, WorkQueue};
use std::rc::Rc;

/// Assembles the full standard catalogue, interning every primitive's
/// name through `interner` so the symbols registered here are the
/// same ones source identifiers resolve to, and wiring `queue` through
/// to the primitives (`hash_prim::DeepHash`) that need to pump the
/// evaluator's scheduler. `runner` backs job submission; callers with
/// no job-execution story can pass a `JobRunner` that always completes
/// with an `Exception`.
pub fn standard_table(interner: &mut Interner, queue: WorkQueue, runner: Rc<dyn JobRunner>) -> Rc<PrimTable> {
    let list_sum = list::list_sum();

    Rc::new_cyclic(|weak| {
        let mut table = PrimTable::new();

        table.register(interner.intern("concat"), 2, Rc::new(strings::Concat));
        table.register(interner.intern("length"), 1, Rc::new(strings::Length));
        table.register(interner.intern("slice"), 3, Rc::new(strings::Slice));
        table.register(interner.intern("upper"), 1, Rc::new(strings::Upper));
        table.register(interner.intern("lower"), 1, Rc::new(strings::Lower));

        table.register(interner.intern("arith"), 2, Rc::new(integers::Arithmetic));
        table.register(interner.intern("compare"), 2, Rc::new(integers::Compare));

        table.register(interner.intern("regex_match"), 1, Rc::new(regex_prims::RegexMatch::new()));
        table.register(interner.intern("regex_tokenize"), 1, Rc::new(regex_prims::RegexTokenize::new(list_sum.clone())));
        table.register(interner.intern("regex_replace"), 2, Rc::new(regex_prims::RegexReplace::new()));

        table.register_synthetic(list::NIL_PRIM, 0, Rc::new(list::ListNil { sum: list_sum.clone() }));
        table.register_synthetic(list::CONS_PRIM, 2, Rc::new(list::ListCons { sum: list_sum }));

        table.register(interner.intern("deep_hash"), 1, Rc::new(hash_prim::DeepHash { queue, table: weak.clone() }));

        table.register(interner.intern("submit_job"), 1, Rc::new(job::SubmitJob { runner }));

        table
    })
}
