//! The resolver-side primitive signature registry.
//!
//! spec.md §4.4 describes primitives as carrying `fn`/`data`/arity,
//! with the callable dispatched at evaluation time. The resolver only
//! needs to validate a `Prim` reference against a declared arity and
//! optional type rule — it never invokes anything — so this crate
//! defines a lightweight [`PrimitiveRegistry`] trait the resolver
//! depends on, independent of whatever executes primitives at runtime.
//! `loom_eval` provides the executing implementation; keeping the
//! trait here (rather than a concrete table) avoids a dependency cycle
//! between the AST crate and the evaluator crate.

use loom_base::Symbol;

/// What the resolver needs to know about a primitive: how many
/// arguments it expects, any per-call-site configuration baked into
/// the IR node (see [`crate::expr::PrimData`]), and optionally the
/// name of a type rule the type checker should apply.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimDescriptor {
    pub arity: usize,
    pub data: crate::expr::PrimData,
    pub type_rule: Option<Symbol>,
}

/// A read-only lookup table of known primitive names.
///
/// Implemented by whichever crate owns the concrete catalogue
/// (`loom_eval`'s primitive table, in this workspace); the resolver
/// only ever sees it through this trait.
pub trait PrimitiveRegistry {
    fn lookup(&self, name: Symbol) -> Option<&PrimDescriptor>;
}
