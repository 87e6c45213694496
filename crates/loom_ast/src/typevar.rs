//! Type-variable handles owned by the (external) type checker.
//!
//! spec.md §3 says every AST/IR node "carries an optional type-variable
//! handle owned by the type checker", and §6 says "for each IR node
//! the resolver creates a type variable; the type checker walks the IR
//! and unifies variables per standard Hindley-Milner rules." The
//! resolver and evaluator never interpret a [`TypeVar`]'s meaning —
//! they only carry the handle so the type checker (a collaborator
//! outside this crate's scope) has somewhere to hang its state.
//!
//! Design Notes (spec.md §9) calls for the clock to be "a plain owned
//! counter passed by mutable reference" rather than a hidden
//! singleton, which is exactly what [`TypeVarClock`] is.

/// An opaque handle into the type checker's unification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVar(pub u32);

/// An append-only counter minting fresh [`TypeVar`]s.
///
/// Callers own their clock explicitly and thread it through by mutable
/// reference; there is no global/static counter anywhere in this crate.
#[derive(Debug, Default)]
pub struct TypeVarClock(u32);

impl TypeVarClock {
    pub fn new() -> Self {
        Self(0)
    }

    /// Mints a fresh, previously unused type variable.
    pub fn fresh(&mut self) -> TypeVar {
        let id = self.0;
        self.0 += 1;
        TypeVar(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_vars_are_distinct_and_increasing() {
        let mut clock = TypeVarClock::new();
        let a = clock.fresh();
        let b = clock.fresh();
        assert_ne!(a, b);
        assert_eq!(a.0 + 1, b.0);
    }
}
