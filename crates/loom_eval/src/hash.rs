//! Deep structural value hashing (spec.md §4.3), exposed to primitives
//! as [`deep_hash`].
//!
//! Traversal assigns each reachable value a *virtual address* equal to
//! its visit index, deduping by `Rc` pointer identity so that shared
//! substructure (and cycles, should any ever arise through external
//! tampering) contribute a back-reference rather than being
//! re-traversed — this is also what keeps two independently-built but
//! structurally-equal graphs hashing identically: the word stream is
//! driven entirely by traversal order and shallow per-node bits, never
//! by a pointer's numeric value. Unfulfilled child promises are forced
//! by pumping the evaluator's queue (`crate::eval::pump_until`),
//! matching spec.md §4.3's "the traversal suspends and resumes when
//! the promise fulfills" — this implementation has no native
//! coroutine to suspend a Rust call stack with, so it drives the
//! scheduler synchronously instead. See `DESIGN.md`.

pub mod murmur3;

use crate::eval::pump_until;
use crate::prim::PrimTable;
use crate::promise::PromiseRef;
use crate::value::{Value, ValueRef};
use crate::queue::WorkQueue;
use std::collections::HashMap;
use std::rc::Rc;

struct Hasher<'a> {
    queue: &'a WorkQueue,
    prims: &'a Rc<PrimTable>,
    visited: HashMap<usize, usize>,
    next_addr: usize,
    bytes: Vec<u8>,
}

impl<'a> Hasher<'a> {
    fn visit_value(&mut self, value: &ValueRef) -> usize {
        let ptr = Rc::as_ptr(value) as usize;
        if let Some(&addr) = self.visited.get(&ptr) {
            return addr;
        }
        let addr = self.next_addr;
        self.next_addr += 1;
        self.visited.insert(ptr, addr);

        self.contribute_shallow(value);

        match &**value {
            Value::Record(rec) => {
                self.bytes.extend_from_slice(&(rec.fields.len() as u64).to_le_bytes());
                for field in rec.fields.clone() {
                    let child = self.visit_promise(&field);
                    self.bytes.extend_from_slice(&(child as u64).to_le_bytes());
                }
            }
            Value::PartialPrim(partial) => {
                self.bytes.extend_from_slice(&(partial.collected.len() as u64).to_le_bytes());
                for promise in partial.collected.clone() {
                    let child = self.visit_promise(&promise);
                    self.bytes.extend_from_slice(&(child as u64).to_le_bytes());
                }
            }
            Value::Exception(exc) => {
                self.bytes.extend_from_slice(&(exc.causes.len() as u64).to_le_bytes());
                for cause in &exc.causes {
                    self.bytes.extend_from_slice(cause.reason.as_bytes());
                }
            }
            Value::String(_) | Value::Integer(_) | Value::Double(_) | Value::RegExp(_) | Value::Closure(_) => {}
        }

        addr
    }

    fn visit_promise(&mut self, promise: &PromiseRef) -> usize {
        let value = match promise.value() {
            Some(value) => value,
            None => pump_until(self.queue, self.prims, promise),
        };
        self.visit_value(&value)
    }

    /// Pushes the tag discriminant and each value's "self-describing
    /// bits (tag, atoms, arities)" (spec.md §4.3) — everything except
    /// child references, which the caller appends afterward.
    fn contribute_shallow(&mut self, value: &Value) {
        match value {
            Value::String(s) => {
                self.bytes.push(0);
                self.bytes.extend_from_slice(s.as_bytes());
            }
            Value::Integer(i) => {
                self.bytes.push(1);
                self.bytes.extend_from_slice(&i.to_signed_bytes_le());
            }
            Value::Double(d) => {
                self.bytes.push(2);
                self.bytes.extend_from_slice(&d.to_bits().to_le_bytes());
            }
            Value::RegExp(pattern) => {
                self.bytes.push(3);
                self.bytes.extend_from_slice(pattern.as_bytes());
            }
            Value::Closure(_) => {
                // Functions carry no structural identity worth hashing
                // beyond their tag — two closures are never expected
                // to compare equal by content. See `DESIGN.md`.
                self.bytes.push(4);
            }
            Value::Record(rec) => {
                self.bytes.push(5);
                self.bytes.extend_from_slice(&(rec.sum.name.index() as u64).to_le_bytes());
                self.bytes.extend_from_slice(&(rec.ctor as u64).to_le_bytes());
            }
            Value::Exception(_) => {
                self.bytes.push(6);
            }
            Value::PartialPrim(partial) => {
                self.bytes.push(7);
                self.bytes.extend_from_slice(&(partial.name.index() as u64).to_le_bytes());
                self.bytes.extend_from_slice(&(partial.nargs as u64).to_le_bytes());
            }
        }
    }
}

/// Computes the 128-bit deep structural digest of `value`, forcing any
/// unfulfilled child promises it needs to descend into.
pub fn deep_hash(queue: &WorkQueue, prims: &Rc<PrimTable>, value: ValueRef) -> [u8; 16] {
    let mut hasher = Hasher { queue, prims, visited: HashMap::new(), next_addr: 0, bytes: Vec::new() };
    hasher.visit_value(&value);
    let (h1, h2) = murmur3::hash128(&hasher.bytes);
    let mut digest = [0u8; 16];
    digest[..8].copy_from_slice(&h1.to_le_bytes());
    digest[8..].copy_from_slice(&h2.to_le_bytes());
    digest
}
