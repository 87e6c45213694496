//! List construction (spec.md §4.4, "list construction").
//!
//! `loom_resolve::topic::{NIL_PRIM, CONS_PRIM}` synthesizes `Prim`
//! nodes under these exact string names — `"list_nil"`/`"list_cons"` —
//! addressed through `PrimData::Text` rather than a `Symbol`, since
//! they're built after resolution runs. Both primitives share one
//! `Sum` instance so every list value built by a given [`PrimTable`]
//! compares consistently by constructor index.

use loom_ast::{Constructor, Sum};
use loom_base::Symbol;
use loom_eval::{PrimReceiver, Primitive, Promise, RecordData, Value, ValueRef};
use std::rc::Rc;

pub const NIL_PRIM: &str = "list_nil";
pub const CONS_PRIM: &str = "list_cons";

/// Builds the shared two-constructor list `Sum`: `Nil` (arity 0) at
/// index 0, `Cons` (arity 2, head then tail) at index 1.
pub fn list_sum() -> Rc<Sum> {
    Sum::new(
        Symbol::EMPTY,
        vec![
            Constructor { name: Symbol::EMPTY, arity: 0 },
            Constructor { name: Symbol::EMPTY, arity: 2 },
        ],
    )
}

pub struct ListNil {
    pub sum: Rc<Sum>,
}

impl Primitive for ListNil {
    fn call(&self, _data: &loom_ast::PrimData, _args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let record = RecordData { sum: self.sum.clone(), ctor: 0, fields: Vec::new() };
        receiver.complete(Rc::new(Value::Record(record)));
    }
}

pub struct ListCons {
    pub sum: Rc<Sum>,
}

impl Primitive for ListCons {
    fn call(&self, _data: &loom_ast::PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let mut args = args.into_iter();
        let head = args.next().expect("list_cons called with fewer than 2 arguments");
        let tail = args.next().expect("list_cons called with fewer than 2 arguments");

        let head_slot = Promise::new();
        head_slot.fulfill(head);
        let tail_slot = Promise::new();
        tail_slot.fulfill(tail);

        let record = RecordData { sum: self.sum.clone(), ctor: 1, fields: vec![head_slot, tail_slot] };
        receiver.complete(Rc::new(Value::Record(record)));
    }
}
