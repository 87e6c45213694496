//! Exposes `loom_eval::hash::deep_hash` as a callable primitive
//! (spec.md §4.4, "deep-hash").
//!
//! The primitive needs the evaluator's own `WorkQueue` (to pump
//! still-unfulfilled child promises, spec.md §4.3) and a handle back
//! to the very `PrimTable` it's registered in (deep-hash may need to
//! force a promise whose expression is itself another `Prim` call).
//! That handle is necessarily a `Weak` — the table can't hold a
//! strong `Rc` to itself during its own construction — built with
//! `std::rc::Rc::new_cyclic` in `crate::standard_table`.

use loom_ast::PrimData;
use loom_eval::{hash, PrimReceiver, PrimTable, Primitive, Value, ValueRef, WorkQueue};
use num_bigint::{BigInt, Sign};
use std::rc::{Rc, Weak};

pub struct DeepHash {
    pub queue: WorkQueue,
    pub table: Weak<PrimTable>,
}

impl Primitive for DeepHash {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let value = args.into_iter().next().expect("deep_hash called with no arguments");
        let table = self.table.upgrade().expect("primitive table dropped while the evaluator was still running");
        let digest = hash::deep_hash(&self.queue, &table, value);
        let as_integer = BigInt::from_bytes_le(Sign::Plus, &digest);
        receiver.complete(Rc::new(Value::Integer(as_integer)));
    }
}
