//! Binding frames (spec.md §3, §4.2.1).
//!
//! A frame is a vector of argument/definition promises, a link to the
//! lexically enclosing frame (walked by `VarRef`'s `depth`), and an
//! optional link to the frame that was active at the call site that
//! created this one (walked by `trace::capture` to rebuild a stack
//! trace). Only frames created by applying a `Closure` or a saturated
//! `PartialPrim` (see `crate::eval::apply_closure`) carry an `invoker`
//! — frames created for a `DefBinding` level are lexical, not calls,
//! so their `invoker` is `None` (spec.md §3: "`Binding.invoker` is
//! never circular; traversal terminates at a sentinel root").

use crate::promise::PromiseRef;
use loom_base::Span;
use std::rc::Rc;

pub type FrameRef = Rc<BindingFrame>;

/// The frame and call-site span active when a call-created frame was
/// built, bundled together since `trace::capture` always needs both.
#[derive(Clone)]
pub struct InvokerLink {
    pub frame: FrameRef,
    pub call_site: Span,
}

pub struct BindingFrame {
    pub slots: Vec<PromiseRef>,
    pub parent: Option<FrameRef>,
    pub invoker: Option<InvokerLink>,
}

impl BindingFrame {
    /// The sentinel root frame: no slots, no parent, no invoker.
    pub fn root() -> FrameRef {
        Rc::new(BindingFrame { slots: Vec::new(), parent: None, invoker: None })
    }

    pub fn extend(parent: &FrameRef, slots: Vec<PromiseRef>, invoker: Option<InvokerLink>) -> FrameRef {
        Rc::new(BindingFrame { slots, parent: Some(parent.clone()), invoker })
    }

    /// Walks `depth` parent links outward from `self`.
    pub fn at_depth(self: &FrameRef, depth: usize) -> FrameRef {
        let mut current = self.clone();
        for _ in 0..depth {
            current = current
                .parent
                .clone()
                .expect("internal invariant violation: VarRef depth exceeds the live frame chain");
        }
        current
    }

    pub fn slot(&self, offset: usize) -> PromiseRef {
        self.slots[offset].clone()
    }
}
