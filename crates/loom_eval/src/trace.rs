//! Stack trace reconstruction (spec.md §4.2.5).
//!
//! A trace is built by walking `invoker` links upward from a frame,
//! collecting the call-site span recorded on each link, coalescing
//! adjacent duplicates ("Adjacent identical locations are coalesced").

use crate::frame::FrameRef;
use loom_base::Span;

/// A reconstructed call stack, outermost call first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    pub frames: Vec<Span>,
}

/// Walks `frame`'s `invoker` chain, collecting one span per call site.
pub fn capture(frame: &FrameRef) -> StackTrace {
    let mut frames = Vec::new();
    let mut current = frame.invoker.clone();
    while let Some(link) = current {
        if frames.last() != Some(&link.call_site) {
            frames.push(link.call_site);
        }
        current = link.frame.invoker.clone();
    }
    StackTrace { frames }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{BindingFrame, InvokerLink};

    #[test]
    fn capture_over_root_frame_is_empty() {
        let root = BindingFrame::root();
        let trace = capture(&root);
        assert!(trace.frames.is_empty());
    }

    #[test]
    fn capture_collects_one_span_per_call() {
        let root = BindingFrame::root();
        let call_site = Span::new(0, 3);
        let called = BindingFrame::extend(&root, vec![], Some(InvokerLink { frame: root.clone(), call_site }));
        let trace = capture(&called);
        assert_eq!(trace.frames, vec![call_site]);
    }

    #[test]
    fn capture_coalesces_adjacent_identical_spans() {
        let root = BindingFrame::root();
        let call_site = Span::new(1, 2);
        let mid = BindingFrame::extend(&root, vec![], Some(InvokerLink { frame: root.clone(), call_site }));
        let outer = BindingFrame::extend(&mid, vec![], Some(InvokerLink { frame: mid.clone(), call_site }));
        let trace = capture(&outer);
        assert_eq!(trace.frames, vec![call_site]);
    }
}
