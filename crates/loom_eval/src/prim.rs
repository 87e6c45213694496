//! The primitive-call protocol (spec.md §4.4).
//!
//! A [`Primitive`] is "a function pointer plus opaque data and a
//! declared arity"; its contract is to call a [`PrimReceiver`] exactly
//! once, synchronously or after an external event. [`PrimTable`] is
//! the evaluator-side, *executing* counterpart to
//! `loom_ast::PrimitiveRegistry` (which only validates arity/name
//! during resolution) — this crate implements that trait too, so one
//! table serves both the resolver and the evaluator (see
//! `loom_ast::prim`'s own doc comment on why the trait lives there).
//!
//! **Dual-keyed lookup.** Ordinary primitives are registered under
//! their interned [`Symbol`]. But `loom_resolve::topic`'s synthesized
//! `list_nil`/`list_cons` calls are built with `name: Symbol::EMPTY`
//! and the real name carried instead in `PrimData::Text` (see
//! `loom_resolve::topic::{nil, cons}`) — deliberately bypassing
//! resolver validation, since they're constructed after resolution
//! runs, not during it. [`PrimTable::dispatch`] therefore tries the
//! symbol table first and falls back to the name table only when the
//! symbol is empty, keeping both conventions served by one type. See
//! `DESIGN.md`.

use crate::value::ValueRef;
use loom_ast::{PrimData, PrimDescriptor, PrimitiveRegistry};
use loom_base::Symbol;
use std::collections::HashMap;
use std::rc::Rc;

/// The callback a [`Primitive`] invokes exactly once with its result
/// (spec.md §4.4). May be invoked synchronously, during `call`, or
/// later — e.g. by an external job runner once a job completes
/// (spec.md §5).
pub trait PrimReceiver {
    fn complete(&self, value: ValueRef);
}

/// A `PrimReceiver` that completes by enqueuing a `fulfill` of the
/// demanding thunk's promise — the only seam a primitive ever touches
/// on the evaluator (spec.md §5: "a primitive may suspend by capturing
/// its receiver for later invocation... which enqueues a work item on
/// the evaluator's queue").
pub struct QueueReceiver {
    pub queue: crate::queue::WorkQueue,
    pub target: crate::promise::PromiseRef,
}

impl PrimReceiver for QueueReceiver {
    fn complete(&self, value: ValueRef) {
        crate::eval::fulfill(&self.queue, &self.target, value);
    }
}

/// An executable primitive: per-call-site `data`, already-forced
/// argument values, and a receiver to deliver the result to (spec.md
/// §4.4).
pub trait Primitive {
    fn call(&self, data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>);
}

/// The evaluator's registered primitive catalogue: dual-keyed by
/// `Symbol` (ordinary primitives) and by string name (the synthesized
/// list primitives — see the module doc comment).
#[derive(Default)]
pub struct PrimTable {
    descriptors: HashMap<Symbol, PrimDescriptor>,
    by_symbol: HashMap<Symbol, Rc<dyn Primitive>>,
    by_name: HashMap<String, (usize, Rc<dyn Primitive>)>,
}

impl PrimTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ordinary, name-addressable primitive, reachable
    /// both for resolver validation ([`PrimitiveRegistry::lookup`])
    /// and evaluator dispatch.
    pub fn register(&mut self, name: Symbol, arity: usize, prim: Rc<dyn Primitive>) {
        self.register_with_data(name, arity, PrimData::None, prim);
    }

    /// Registers a primitive whose descriptor carries fixed
    /// per-call-site configuration (`data`), copied into every `Prim`
    /// IR node the resolver builds for `name` — the mechanism behind
    /// "which arithmetic operator a shared numeric primitive should
    /// perform" (`loom_ast::PrimData`'s doc comment): several distinct
    /// surface names (`add`, `sub`, ...) can all register the same
    /// `Rc<dyn Primitive>` here under different `name`/`data` pairs,
    /// since the primitive itself reads its operator from `data`, not
    /// from which symbol it was looked up by.
    pub fn register_with_data(&mut self, name: Symbol, arity: usize, data: PrimData, prim: Rc<dyn Primitive>) {
        self.descriptors.insert(name, PrimDescriptor { arity, data, type_rule: None });
        self.by_symbol.insert(name, prim);
    }

    /// Registers a synthesized primitive reachable only by string name
    /// (see `loom_resolve::topic::{NIL_PRIM, CONS_PRIM}`), never by
    /// `Symbol`, since its call sites never carry a real symbol.
    pub fn register_synthetic(&mut self, name: &str, arity: usize, prim: Rc<dyn Primitive>) {
        self.by_name.insert(name.to_string(), (arity, prim));
    }

    /// Resolves a `Prim` node's callable, trying the symbol table
    /// first (ordinary primitives) then the name table (the
    /// synthesized list primitives, whose `name` is always
    /// `Symbol::EMPTY`).
    pub fn dispatch(&self, name: Symbol, data: &PrimData) -> Option<(usize, Rc<dyn Primitive>)> {
        if name != Symbol::EMPTY {
            if let Some(prim) = self.by_symbol.get(&name) {
                let arity = self.descriptors.get(&name).map(|d| d.arity).unwrap_or(0);
                return Some((arity, prim.clone()));
            }
        }
        if let PrimData::Text(text) = data {
            if let Some((arity, prim)) = self.by_name.get(text) {
                return Some((*arity, prim.clone()));
            }
        }
        None
    }
}

impl PrimitiveRegistry for PrimTable {
    fn lookup(&self, name: Symbol) -> Option<&PrimDescriptor> {
        self.descriptors.get(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    struct Echo;
    impl Primitive for Echo {
        fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
            receiver.complete(args.into_iter().next().unwrap_or_else(|| Rc::new(Value::Double(0.0))));
        }
    }

    struct RecordedReceiver(std::cell::RefCell<Option<ValueRef>>);
    impl PrimReceiver for RecordedReceiver {
        fn complete(&self, value: ValueRef) {
            *self.0.borrow_mut() = Some(value);
        }
    }

    #[test]
    fn dispatch_by_symbol_finds_a_registered_primitive() {
        let mut table = PrimTable::new();
        let name = Symbol::default();
        table.register(name, 1, Rc::new(Echo));
        let (arity, prim) = table.dispatch(name, &PrimData::None).expect("registered");
        assert_eq!(arity, 1);
        let receiver = Rc::new(RecordedReceiver(std::cell::RefCell::new(None)));
        prim.call(&PrimData::None, vec![Rc::new(Value::Double(7.0))], receiver.clone());
        assert!(matches!(*receiver.0.borrow(), Some(ref v) if matches!(**v, Value::Double(n) if n == 7.0)));
    }

    #[test]
    fn dispatch_falls_back_to_name_for_empty_symbol() {
        let mut table = PrimTable::new();
        table.register_synthetic("list_nil", 0, Rc::new(Echo));
        let data = PrimData::Text("list_nil".to_string());
        let (arity, _prim) = table.dispatch(Symbol::EMPTY, &data).expect("registered by name");
        assert_eq!(arity, 0);
    }

    #[test]
    fn dispatch_misses_unregistered_name() {
        let table = PrimTable::new();
        assert!(table.dispatch(Symbol::default(), &PrimData::None).is_none());
    }

    #[test]
    fn registry_lookup_exposes_descriptor_for_resolver_validation() {
        let mut table = PrimTable::new();
        let name = Symbol::default();
        table.register(name, 2, Rc::new(Echo));
        let descriptor = PrimitiveRegistry::lookup(&table, name).expect("registered");
        assert_eq!(descriptor.arity, 2);
    }
}
