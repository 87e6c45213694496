//! Reference resolution (spec.md §4.1.3).
//!
//! A scope stack is maintained while walking an expression: qualifying
//! layers (file-local, file-imports, package exports, globals) that
//! never themselves correspond to a runtime binding frame, plus a
//! stack of runtime frames, one per `DefMap`/`Lambda` nesting entered
//! so far. A lookup first tries the runtime frames innermost-out for a
//! raw (unqualified) binding — a lambda parameter, a local `let`-style
//! definition — then falls back to qualifying the name through the
//! static layers and locating the qualified name among the globals,
//! which live in the outermost `DefBinding` frame (see `DESIGN.md`,
//! "globals" decision).

use loom_ast::{Address, SymbolKind, SymbolTable};
use loom_base::Symbol;
use std::collections::HashMap;

/// One runtime binding frame entered so far: a `DefMap` level or a
/// `Lambda` parameter slot. Maps the raw names bound at this level to
/// their offset within the eventual `Binding Frame`.
#[derive(Debug, Default)]
pub struct ScopeFrame {
    bindings: HashMap<Symbol, usize>,
}

impl ScopeFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-argument lambda frame: one binding at offset 0.
    pub fn lambda(param: Symbol) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(param, 0);
        ScopeFrame { bindings }
    }

    /// A `DefBinding` frame: `names` in `val`-then-`fun` slot order.
    pub fn def_binding(names: &[Symbol]) -> Self {
        let bindings = names.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        ScopeFrame { bindings }
    }

    pub fn get(&self, name: Symbol) -> Option<usize> {
        self.bindings.get(&name).copied()
    }
}

/// The qualified-name-to-offset table for the program's globals: every
/// top-level definition, reachable through the single outermost
/// `DefBinding` frame (spec.md §9 Open Question resolution).
pub type GlobalTable = HashMap<Symbol, usize>;

/// The full scope stack threaded through expression resolution.
pub struct Scope<'a> {
    file_local: &'a SymbolTable,
    file_imports: &'a SymbolTable,
    package_exports: &'a SymbolTable,
    globals_qualified: &'a SymbolTable,
    globals: &'a GlobalTable,
    frames: Vec<ScopeFrame>,
}

impl<'a> Scope<'a> {
    pub fn new(
        file_local: &'a SymbolTable,
        file_imports: &'a SymbolTable,
        package_exports: &'a SymbolTable,
        globals_qualified: &'a SymbolTable,
        globals: &'a GlobalTable,
    ) -> Self {
        Scope {
            file_local,
            file_imports,
            package_exports,
            globals_qualified,
            globals,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: ScopeFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Qualifies a raw def-namespace name through the static layers,
    /// in precedence order: file-local shadows file-imports shadows
    /// package exports shadows globals. Returns `None` if absent from
    /// every layer.
    fn qualify(&self, name: Symbol) -> Option<Symbol> {
        for table in [self.file_local, self.file_imports, self.package_exports, self.globals_qualified] {
            if let Some(entry) = table.get(SymbolKind::Def, name) {
                entry.mark_used();
                return Some(entry.qualified);
            }
        }
        None
    }

    /// Resolves a reference, producing the `(depth, offset)` lexical
    /// address the IR's `VarRef` carries after resolution.
    pub fn resolve(&self, name: Symbol) -> Option<Address> {
        for (i, frame) in self.frames.iter().rev().enumerate() {
            if let Some(offset) = frame.get(name) {
                return Some(Address { depth: i, offset });
            }
        }

        let qualified = self.qualify(name)?;
        let offset = self.globals.get(&qualified).copied()?;
        Some(Address { depth: self.frames.len(), offset })
    }

    /// Resolves a topic reference (spec.md §4.1.3's `Subscribe`),
    /// mirroring `resolve`'s qualify-then-locate-in-`globals` path but
    /// against `SymbolKind::Topic` (a topic is always package-exported,
    /// never file-local/imported/shadowed — `lib.rs`'s
    /// `build_package_tables`). Returns the topic's mangled global name
    /// alongside its lexical address.
    pub fn resolve_topic(&self, name: Symbol) -> Option<(Symbol, Address)> {
        let entry = self.package_exports.get(SymbolKind::Topic, name)?;
        entry.mark_used();
        let mangled = entry.qualified;
        let offset = self.globals.get(&mangled).copied()?;
        Some((mangled, Address { depth: self.frames.len(), offset }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_base::Interner;

    #[test]
    fn lambda_param_resolves_at_depth_zero() {
        let file_local = SymbolTable::new();
        let file_imports = SymbolTable::new();
        let package_exports = SymbolTable::new();
        let globals_qualified = SymbolTable::new();
        let globals = GlobalTable::new();
        let mut interner = Interner::new();
        let x = interner.intern("x");

        let mut scope = Scope::new(&file_local, &file_imports, &package_exports, &globals_qualified, &globals);
        scope.push(ScopeFrame::lambda(x));

        let addr = scope.resolve(x).expect("resolves");
        assert_eq!(addr.depth, 0);
        assert_eq!(addr.offset, 0);
    }

    #[test]
    fn outer_def_binding_resolves_with_nonzero_depth() {
        let file_local = SymbolTable::new();
        let file_imports = SymbolTable::new();
        let package_exports = SymbolTable::new();
        let globals_qualified = SymbolTable::new();
        let globals = GlobalTable::new();
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");

        let mut scope = Scope::new(&file_local, &file_imports, &package_exports, &globals_qualified, &globals);
        scope.push(ScopeFrame::def_binding(&[x]));
        scope.push(ScopeFrame::lambda(y));

        let addr = scope.resolve(x).expect("resolves");
        assert_eq!(addr.depth, 1);
        assert_eq!(addr.offset, 0);
    }

    #[test]
    fn global_falls_back_through_outermost_frame() {
        let file_local = SymbolTable::new();
        let file_imports = SymbolTable::new();
        let package_exports = SymbolTable::new();
        let mut globals_qualified = SymbolTable::new();
        let mut interner = Interner::new();
        let name = interner.intern("main");
        let qualified = interner.intern("main@app");
        globals_qualified.insert(
            SymbolKind::Def,
            name,
            loom_ast::SymbolEntry::local(qualified, qualified),
        );
        let mut globals = GlobalTable::new();
        globals.insert(qualified, 3);

        let mut scope = Scope::new(&file_local, &file_imports, &package_exports, &globals_qualified, &globals);
        scope.push(ScopeFrame::lambda(interner.intern("unrelated")));

        let addr = scope.resolve(name).expect("resolves");
        assert_eq!(addr.depth, 1);
        assert_eq!(addr.offset, 3);
    }

    #[test]
    fn unbound_name_resolves_to_none() {
        let file_local = SymbolTable::new();
        let file_imports = SymbolTable::new();
        let package_exports = SymbolTable::new();
        let globals_qualified = SymbolTable::new();
        let globals = GlobalTable::new();
        let mut interner = Interner::new();
        let ghost = interner.intern("ghost");

        let scope = Scope::new(&file_local, &file_imports, &package_exports, &globals_qualified, &globals);
        assert!(scope.resolve(ghost).is_none());
    }
}
