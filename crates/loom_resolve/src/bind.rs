//! Expression-level resolution: walks an AST expression, resolving
//! every `VarRef` to a lexical address, stratifying every `DefMap`
//! into nested `DefBinding`s (spec.md §4.1.3, §4.1.4), and lowering
//! every `Match` to a `Destruct`/`Get` decision tree (spec.md §4.1.5).
//!
//! This is the workhorse tying [`crate::scope`], [`crate::stratify`],
//! and [`crate::pattern`] together over one file's body.

use crate::error::ResolveError;
use crate::pattern::{lower_rows, Decision, Row as MatchRow};
use crate::scope::{Scope, ScopeFrame};
use crate::stratify::{cycle_names, stratify_levels, tarjan_scc, Edge};
use loom_ast::{Def, Expr, ExprKind, ExprRef, MatchArm, Pattern, PrimitiveRegistry};
use loom_base::{Span, Symbol};
use loom_diagnostic::Reporter;
use std::collections::HashSet;

/// Collects the names in `known` that `expr` references directly (not
/// descending into nested `DefMap`s/`Lambda`s that would shadow them —
/// a deliberate simplification of true free-variable analysis, noted
/// in `DESIGN.md`, adequate for building the sibling-reference graph
/// one `DefMap` level needs).
fn collect_refs(expr: &ExprRef, known: &HashSet<Symbol>, out: &mut HashSet<Symbol>) {
    match &expr.kind {
        ExprKind::VarRef { name, .. } => {
            if known.contains(name) {
                out.insert(*name);
            }
        }
        ExprKind::App { func, arg } => {
            collect_refs(func, known, out);
            collect_refs(arg, known, out);
        }
        ExprKind::Lambda { body, .. } => collect_refs(body, known, out),
        ExprKind::Literal { .. } => {}
        ExprKind::Prim { .. } => {}
        ExprKind::DefMap { body, .. } => collect_refs(body, known, out),
        ExprKind::Match { args, arms, otherwise, .. } => {
            for a in args {
                collect_refs(a, known, out);
            }
            for arm in arms {
                if let Some(guard) = &arm.guard {
                    collect_refs(guard, known, out);
                }
                collect_refs(&arm.rhs, known, out);
            }
            if let Some(o) = otherwise {
                collect_refs(o, known, out);
            }
        }
        ExprKind::Ascribe { body } => collect_refs(body, known, out),
        ExprKind::Construct { .. } => {}
        // A topic name lives in a separate namespace from `known`'s
        // def-names (`Scope::resolve_topic`, not `Scope::resolve`), so
        // it never contributes a sibling-reference edge here.
        ExprKind::Subscribe { .. } => {}
        ExprKind::Destruct { arg, cases, .. } => {
            collect_refs(arg, known, out);
            for c in cases {
                collect_refs(c, known, out);
            }
        }
        ExprKind::Get { .. } => {}
        ExprKind::DefBinding { vals, funs, body, .. } => {
            for v in vals {
                collect_refs(v, known, out);
            }
            for f in funs {
                collect_refs(f, known, out);
            }
            collect_refs(body, known, out);
        }
    }
}

/// Resolves a single expression under `scope`, recursively. Reports
/// unbound references to `reporter` rather than failing fast, per the
/// "accumulate all errors before returning" contract (spec.md §7).
pub fn resolve_expr(
    expr: &ExprRef,
    scope: &mut Scope<'_>,
    reporter: &mut Reporter,
    registry: &dyn PrimitiveRegistry,
) -> ExprRef {
    match &expr.kind {
        ExprKind::VarRef { name, .. } => {
            let addr = scope.resolve(*name);
            if addr.is_none() {
                let err = ResolveError::UnboundVariable { name: *name, location: expr.location };
                reporter.push(loom_diagnostic::Diagnostic::error(expr.location, err.to_string()));
            }
            Expr::new(ExprKind::VarRef { name: *name, addr }, expr.location)
        }
        ExprKind::App { func, arg } => {
            let func = resolve_expr(func, scope, reporter, registry);
            let arg = resolve_expr(arg, scope, reporter, registry);
            Expr::new(ExprKind::App { func, arg }, expr.location)
        }
        ExprKind::Lambda { param, body, fnname } => {
            scope.push(ScopeFrame::lambda(*param));
            let body = resolve_expr(body, scope, reporter, registry);
            scope.pop();
            Expr::new(ExprKind::Lambda { param: *param, body, fnname: *fnname }, expr.location)
        }
        ExprKind::Literal { value } => Expr::new(ExprKind::Literal { value: value.clone() }, expr.location),
        ExprKind::Prim { name, nargs, data } => {
            if registry.lookup(*name).is_none() {
                reporter.push(loom_diagnostic::Diagnostic::error(
                    expr.location,
                    format!("unregistered primitive (symbol #{})", name.index()),
                ));
            }
            Expr::new(ExprKind::Prim { name: *name, nargs: *nargs, data: data.clone() }, expr.location)
        }
        ExprKind::DefMap { defs, body, imports: _ } => {
            resolve_def_map(defs, body, expr.location, scope, reporter, registry)
        }
        ExprKind::Match { args, arms, otherwise, refutable } => {
            resolve_match(args, arms, otherwise.as_ref(), *refutable, expr.location, scope, reporter, registry)
        }
        ExprKind::Subscribe { topic } => {
            // "A Subscribe expression becomes a VarRef to the mangled
            // global `topic <name>@<pkg>`" (spec.md §4.1.3) — resolved
            // through the same qualified-name-to-slot path an ordinary
            // global `VarRef` uses, against the topic's own namespace
            // (`SymbolKind::Topic`) rather than `SymbolKind::Def`.
            let (mangled, addr) = match scope.resolve_topic(*topic) {
                Some((mangled, addr)) => (mangled, Some(addr)),
                None => {
                    let err = ResolveError::UnboundTopic { name: *topic, location: expr.location };
                    reporter.push(loom_diagnostic::Diagnostic::error(expr.location, err.to_string()));
                    (*topic, None)
                }
            };
            Expr::new(ExprKind::VarRef { name: mangled, addr }, expr.location)
        }
        ExprKind::Ascribe { body } => {
            let body = resolve_expr(body, scope, reporter, registry);
            Expr::new(ExprKind::Ascribe { body }, expr.location)
        }
        ExprKind::Construct { sum, ctor } => {
            Expr::new(ExprKind::Construct { sum: sum.clone(), ctor: *ctor }, expr.location)
        }
        ExprKind::Destruct { sum, arg, cases } => {
            let arg = resolve_expr(arg, scope, reporter, registry);
            let cases = cases.iter().map(|c| resolve_expr(c, scope, reporter, registry)).collect();
            Expr::new(ExprKind::Destruct { sum: sum.clone(), arg, cases }, expr.location)
        }
        ExprKind::Get { sum, ctor, index } => {
            Expr::new(ExprKind::Get { sum: sum.clone(), ctor: *ctor, index: *index }, expr.location)
        }
        ExprKind::DefBinding { vals, funs, scc, body, order } => {
            // Already-lowered IR passed back through (e.g. re-resolution); pass through unchanged.
            let vals = vals.iter().map(|v| resolve_expr(v, scope, reporter, registry)).collect();
            let funs = funs.iter().map(|f| resolve_expr(f, scope, reporter, registry)).collect();
            let body = resolve_expr(body, scope, reporter, registry);
            Expr::new(
                ExprKind::DefBinding { vals, funs, scc: scc.clone(), body, order: order.clone() },
                expr.location,
            )
        }
    }
}

/// Stratifies one `DefMap`'s definitions into nested `DefBinding`s
/// (spec.md §4.1.4) and resolves the body and every definition's value
/// under the resulting scope frames.
pub(crate) fn resolve_def_map(
    defs: &[Def],
    body: &ExprRef,
    location: loom_base::Span,
    scope: &mut Scope<'_>,
    reporter: &mut Reporter,
    registry: &dyn PrimitiveRegistry,
) -> ExprRef {
    let n = defs.len();
    let names: Vec<Symbol> = defs.iter().map(|d| d.name).collect();
    let known: HashSet<Symbol> = names.iter().copied().collect();
    let is_lambda: Vec<bool> = defs.iter().map(|d| matches!(d.value.kind, ExprKind::Lambda { .. })).collect();

    let mut seen = HashSet::new();
    for def in defs {
        if !seen.insert(def.name) {
            let err = ResolveError::DuplicateDefinition { name: def.name, location: def.location };
            reporter.push(loom_diagnostic::Diagnostic::error(def.location, err.to_string()));
        }
    }

    let mut edges = Vec::new();
    for (i, def) in defs.iter().enumerate() {
        let mut refs = HashSet::new();
        collect_refs(&def.value, &known, &mut refs);
        for r in refs {
            if let Some(j) = names.iter().position(|&n| n == r) {
                edges.push(Edge { from: i, to: j });
            }
        }
    }

    let (levels, cycles) = stratify_levels(n, &is_lambda, &edges);
    for cycle in &cycles {
        let members = cycle_names(cycle, &names);
        let err = ResolveError::IllegalValueRecursion { cycle: members, location };
        reporter.push(loom_diagnostic::Diagnostic::error(location, err.to_string()));
    }

    let max_level = levels.iter().flatten().copied().max();
    let Some(max_level) = max_level else {
        // Every definition was erased on an illegal cycle, or the map was empty:
        // pass the body through unchanged (spec.md §8 boundary: "Empty DefMap body
        // passes through the body unchanged").
        return resolve_expr(body, scope, reporter, registry);
    };

    // Push frames outermost (highest level) to innermost (level 0), so that
    // depth is computed relative to this group's final nesting.
    let mut pushed = 0;
    for level in (0..=max_level).rev() {
        let members: Vec<usize> = (0..n).filter(|&i| levels[i] == Some(level)).collect();
        // vals-then-funs, matching the runtime BindingFrame layout the
        // evaluator builds for a DefBinding (spec.md §4.2.2).
        let (val_indices, fun_indices): (Vec<usize>, Vec<usize>) = members.iter().partition(|&&i| !is_lambda[i]);
        let ordered: Vec<Symbol> = val_indices.iter().chain(fun_indices.iter()).map(|&i| names[i]).collect();
        scope.push(ScopeFrame::def_binding(&ordered));
        pushed += 1;
    }

    let resolved_body = resolve_expr(body, scope, reporter, registry);
    let resolved_defs: Vec<ExprRef> =
        defs.iter().map(|d| resolve_expr(&d.value, scope, reporter, registry)).collect();

    for _ in 0..pushed {
        scope.pop();
    }

    // Build nested DefBindings from level 0 (innermost) outward.
    let mut current = resolved_body;
    for level in 0..=max_level {
        let members: Vec<usize> = (0..n).filter(|&i| levels[i] == Some(level)).collect();
        if members.is_empty() {
            continue;
        }
        let (val_indices, fun_indices): (Vec<usize>, Vec<usize>) =
            members.iter().partition(|&&i| !is_lambda[i]);

        let adj: Vec<Vec<usize>> = fun_indices
            .iter()
            .map(|&i| {
                edges
                    .iter()
                    .filter(|e| e.from == i && fun_indices.contains(&e.to))
                    .filter_map(|e| fun_indices.iter().position(|&f| f == e.to))
                    .collect()
            })
            .collect();
        let components = tarjan_scc(fun_indices.len(), &adj);
        let mut scc_of = vec![0usize; fun_indices.len()];
        for (comp_idx, members) in components.iter().enumerate() {
            for &local in members {
                scc_of[local] = comp_idx;
            }
        }

        let vals: Vec<ExprRef> = val_indices.iter().map(|&i| resolved_defs[i].clone()).collect();
        let funs: Vec<ExprRef> = fun_indices.iter().map(|&i| resolved_defs[i].clone()).collect();
        let scc: Vec<usize> = (0..fun_indices.len()).map(|local| scc_of[local]).collect();
        let order: Vec<usize> = val_indices.iter().chain(fun_indices.iter()).copied().collect();

        current = Expr::new(ExprKind::DefBinding { vals, funs, scc, body: current, order }, location);
    }

    current
}

/// Lowers a `Match` to nested `Destruct`/`Get` IR using
/// [`crate::pattern::lower_rows`], then resolves scrutinees and the
/// surviving right-hand sides. `otherwise` backs every `Fail` branch
/// for a `refutable` match; a total match with a `Fail` branch
/// reachable is a resolution error (a missing case).
#[allow(clippy::too_many_arguments)]
fn resolve_match(
    args: &[ExprRef],
    arms: &[MatchArm],
    otherwise: Option<&ExprRef>,
    refutable: bool,
    location: loom_base::Span,
    scope: &mut Scope<'_>,
    reporter: &mut Reporter,
    registry: &dyn PrimitiveRegistry,
) -> ExprRef {
    let resolved_args: Vec<ExprRef> = args.iter().map(|a| resolve_expr(a, scope, reporter, registry)).collect();

    for arm in arms {
        for pattern in &arm.patterns {
            check_pattern_arity(pattern, location, reporter);
        }
    }

    let rows: Vec<MatchRow> = arms
        .iter()
        .map(|arm| MatchRow {
            patterns: arm.patterns.clone(),
            guard: arm.guard.as_ref().map(|g| resolve_expr(g, scope, reporter, registry)),
            rhs: resolve_expr(&arm.rhs, scope, reporter, registry),
        })
        .collect();

    let decision = lower_rows(rows);
    if decision_has_fail(&decision) && !refutable && otherwise.is_none() {
        reporter.push(loom_diagnostic::Diagnostic::error(location, "non-exhaustive match"));
    }

    let resolved_otherwise = otherwise.map(|o| resolve_expr(o, scope, reporter, registry));
    build_decision_expr(&decision, &resolved_args, resolved_otherwise.as_ref(), None, location)
}

/// Checks every `Pattern::Ctor` against its constructor's declared
/// arity (spec.md §3: "Constructor patterns have arity equal to their
/// constructor's declared arity; pattern expansion never proceeds on a
/// mismatch"), recursing into nested fields. Mismatches are reported
/// as `ResolveError::ArityMismatch`, fatal to IR emission (spec.md §7).
fn check_pattern_arity(pattern: &Pattern, location: Span, reporter: &mut Reporter) {
    if let Pattern::Ctor { sum, ctor, fields } = pattern {
        let expected = sum.arity_of(*ctor);
        if fields.len() != expected {
            let err = ResolveError::ArityMismatch { expected, found: fields.len(), location };
            reporter.push(loom_diagnostic::Diagnostic::error(location, err.to_string()));
        }
        for field in fields {
            check_pattern_arity(field, location, reporter);
        }
    }
}

fn decision_has_fail(decision: &Decision) -> bool {
    match decision {
        Decision::Fail => true,
        Decision::Leaf(_) => false,
        Decision::GuardedLeaf { or_else, .. } => decision_has_fail(or_else),
        Decision::Refine { branches, .. } => branches.iter().any(decision_has_fail),
    }
}

/// Builds the `Destruct`/`App` IR for one lowered decision tree,
/// against the already-resolved scrutinee list. `current` names the
/// constructor the innermost enclosing `Refine` branch just dispatched
/// on (sum and constructor index), if any — the context a `Fail` leaf
/// needs to reconstruct an identity fallthrough via `Get` against the
/// frame that constructor's case lambda was just extended with
/// (spec.md §4.2.2's Get rule reads only the current frame's slot 0).
fn build_decision_expr(
    decision: &Decision,
    scrutinees: &[ExprRef],
    otherwise: Option<&ExprRef>,
    current: Option<(std::rc::Rc<loom_ast::Sum>, usize)>,
    location: loom_base::Span,
) -> ExprRef {
    match decision {
        Decision::Leaf(row) => row.rhs.clone(),
        Decision::GuardedLeaf { row, or_else } => {
            // "evaluate the guard thunk; on true, force the rhs thunk" (spec.md
            // §9): lowered as a Destruct over the built-in Bool sum so that
            // the false branch (the remaining rows) is never even allocated
            // as a running computation unless the guard actually fails.
            let guard = row.guard.clone().expect("GuardedLeaf always carries a guard");
            let bool_sum = loom_ast::Sum::bool_sum();
            let false_branch = build_decision_expr(or_else, scrutinees, otherwise, current.clone(), location);
            let false_case = Expr::new(
                ExprKind::Lambda { param: Symbol::EMPTY, body: false_branch, fnname: None },
                location,
            );
            let true_case =
                Expr::new(ExprKind::Lambda { param: Symbol::EMPTY, body: row.rhs.clone(), fnname: None }, location);
            Expr::new(
                ExprKind::Destruct { sum: bool_sum, arg: guard, cases: vec![false_case, true_case] },
                location,
            )
        }
        // A refutable match with no `otherwise` reconstructs the
        // scrutinee instead of failing (spec.md §4.1.5, §8; Glossary's
        // "Refutable match"), grounded on the original C++'s
        // `build_identity()` (examples/original_source/src/dst/bind.cpp):
        // rebuild the just-dispatched constructor applied to its own
        // fields read back out via `Get`. A non-refutable match with no
        // surviving `Fail` branch never reaches this arm at all —
        // `resolve_match` already reports it as non-exhaustive.
        Decision::Fail => match otherwise {
            Some(handler) => handler.clone(),
            None => build_identity(current.as_ref(), scrutinees, location),
        },
        Decision::Refine { sum, column, branches } => {
            let scrutinee = scrutinees.get(*column).cloned().unwrap_or_else(|| {
                Expr::new(ExprKind::Literal { value: loom_ast::Literal::String(String::new()) }, location)
            });
            let cases: Vec<ExprRef> = sum
                .constructors
                .iter()
                .enumerate()
                .map(|(c, _ctor)| {
                    let branch = branches.get(c).cloned().unwrap_or(Decision::Fail);
                    let body =
                        build_decision_expr(&branch, scrutinees, otherwise, Some((sum.clone(), c)), location);
                    // The case lambda's single parameter is the record itself;
                    // a field is read, where the lowered branch needs it, via
                    // `Get{sum, ctor, index}` against this frame's slot 0
                    // (spec.md §4.2.2's Get rule) rather than a synthetic
                    // per-field binding threaded through here.
                    Expr::new(ExprKind::Lambda { param: Symbol::EMPTY, body, fnname: None }, location)
                })
                .collect();
            Expr::new(ExprKind::Destruct { sum: sum.clone(), arg: scrutinee, cases }, location)
        }
    }
}

/// Reconstructs the record a `Fail` leaf was reached against: a curried
/// `Construct{sum, ctor}` applied to `Get{sum, ctor, index}` for every
/// field, in field order — the identity fallthrough of a `refutable`
/// match with no `otherwise` (spec.md §4.1.5). Mirrors the original
/// C++'s `build_identity`, which recurses into each field's own
/// committed constructor; this IR has no per-field `PatternTree` to
/// recurse into (a field's own refinement, if any, is itself a nested
/// `Refine`/`Get` pair the decision tree already lowers), so a field is
/// always read back whole via `Get` rather than rebuilt recursively.
/// With no enclosing `Refine` at all (a degenerate zero-column match),
/// falls back to the first scrutinee unchanged.
fn build_identity(
    current: Option<&(std::rc::Rc<loom_ast::Sum>, usize)>,
    scrutinees: &[ExprRef],
    location: loom_base::Span,
) -> ExprRef {
    let Some((sum, ctor)) = current else {
        return scrutinees.first().cloned().unwrap_or_else(|| {
            Expr::new(ExprKind::Literal { value: loom_ast::Literal::String(String::new()) }, location)
        });
    };
    let arity = sum.arity_of(*ctor);
    let mut curried = Expr::new(ExprKind::Construct { sum: sum.clone(), ctor: *ctor }, location);
    for _ in 0..arity {
        curried = Expr::new(ExprKind::Lambda { param: Symbol::EMPTY, body: curried, fnname: None }, location);
    }
    let mut result = curried;
    for index in 0..arity {
        let field = Expr::new(ExprKind::Get { sum: sum.clone(), ctor: *ctor, index }, location);
        result = Expr::new(ExprKind::App { func: result, arg: field }, location);
    }
    result
}
