//! Pattern lowering into decision trees (spec.md §4.1.5).
//!
//! A `Match` with k arguments and m pattern rows is lowered by
//! repeatedly choosing the leftmost column of the first surviving row
//! that still commits to a constructor, expanding it into one branch
//! per constructor of that column's sum, and recursing. Per
//! constructor `c`: rows already committed to `c` are retained with
//! their sub-patterns spliced into the row; rows still wildcard at
//! that column are duplicated into every branch with fresh wildcards
//! for `c`'s fields; rows committed to a different constructor are
//! dropped. A row with no remaining committed column is a leaf: its
//! guard (if any) is checked, then its right-hand side is taken.

use loom_ast::{ExprRef, Pattern, Sum};
use std::rc::Rc;

/// One row of a match: a pattern per scrutinee column, an optional
/// guard, and the arm's right-hand side.
#[derive(Debug, Clone)]
pub struct Row {
    pub patterns: Vec<Pattern>,
    pub guard: Option<ExprRef>,
    pub rhs: ExprRef,
}

/// The decision tree produced by lowering: either a leaf (no more
/// committed patterns to refine), a refinement on one column, or
/// exhaustion (no row survives — a missing-case diagnostic at
/// resolution time, or the `otherwise`/identity-fallthrough path for
/// a `refutable` match).
#[derive(Debug, Clone)]
pub enum Decision {
    Leaf(Row),
    /// A leaf whose row carries a guard: on the guard evaluating
    /// false, fall through to `or_else` (the decision over the
    /// remaining rows) rather than terminating — guards never shadow
    /// later rows the way an unconditional wildcard does.
    GuardedLeaf { row: Row, or_else: Box<Decision> },
    Refine { sum: Rc<Sum>, column: usize, branches: Vec<Decision> },
    Fail,
}

/// Leftmost column of `row` still committed to a constructor, or
/// `None` if every column is a wildcard (the row is a leaf).
fn first_refining_column(row: &Row) -> Option<usize> {
    row.patterns.iter().position(|p| !p.is_wildcard())
}

/// Partitions `rows` by constructor at `column`, per the three rules
/// in the module doc comment. `sum` names the column's sum type, read
/// from whichever row committed to a constructor there.
fn expand_rows(sum: &Sum, column: usize, rows: &[Row]) -> Vec<Vec<Row>> {
    let mut branches: Vec<Vec<Row>> = (0..sum.constructors.len()).map(|_| Vec::new()).collect();

    for row in rows {
        match &row.patterns[column] {
            Pattern::Ctor { ctor, fields, .. } => {
                let mut patterns = row.patterns.clone();
                patterns.splice(column..=column, fields.iter().cloned());
                branches[*ctor].push(Row { patterns, guard: row.guard.clone(), rhs: row.rhs.clone() });
            }
            Pattern::Wildcard { .. } => {
                for (c, constructor) in sum.constructors.iter().enumerate() {
                    let mut patterns = row.patterns.clone();
                    let fresh = vec![Pattern::Wildcard { bind: None }; constructor.arity];
                    patterns.splice(column..=column, fresh);
                    branches[c].push(Row { patterns, guard: row.guard.clone(), rhs: row.rhs.clone() });
                }
            }
        }
    }

    branches
}

/// Lowers `rows` (already ordered top-to-bottom, per source order) to
/// a decision tree. Ties are broken deterministically: sum members in
/// declaration order, patterns top-to-bottom, leftmost-outermost
/// column selection — all guaranteed by iterating `rows` and
/// `sum.constructors` in their stored order.
pub fn lower_rows(rows: Vec<Row>) -> Decision {
    let Some(top) = rows.first().cloned() else {
        return Decision::Fail;
    };

    match first_refining_column(&top) {
        None if top.guard.is_some() => {
            let or_else = lower_rows(rows[1..].to_vec());
            Decision::GuardedLeaf { row: top, or_else: Box::new(or_else) }
        }
        None => Decision::Leaf(top),
        Some(column) => {
            let sum = match &top.patterns[column] {
                Pattern::Ctor { sum, .. } => sum.clone(),
                Pattern::Wildcard { .. } => unreachable!("first_refining_column only returns Ctor columns"),
            };
            let branches = expand_rows(&sum, column, &rows);
            let lowered = branches.into_iter().map(lower_rows).collect();
            Decision::Refine { sum, column, branches: lowered }
        }
    }
}

/// Every row consumed by a leaf at least once: used to detect unused
/// pattern rows (spec.md §4.1.5, "Unused pattern rows emit a
/// diagnostic") by comparing against the full row set the caller
/// started with.
pub fn reachable_rhs(decision: &Decision, out: &mut Vec<ExprRef>) {
    match decision {
        Decision::Leaf(row) => out.push(row.rhs.clone()),
        Decision::GuardedLeaf { row, or_else } => {
            out.push(row.rhs.clone());
            reachable_rhs(or_else, out);
        }
        Decision::Refine { branches, .. } => {
            for branch in branches {
                reachable_rhs(branch, out);
            }
        }
        Decision::Fail => {}
    }
}
