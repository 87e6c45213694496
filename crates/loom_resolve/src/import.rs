//! Import qualification (spec.md §4.1.1).
//!
//! Imports come in four kinds per file plus the bare wildcard: mixed,
//! defs-only, types-only, topics-only, wildcard. For each requested
//! unqualified name, this module resolves it against the source
//! package's export tables and rewrites it to a fully qualified form
//! `<local> → <original>@<pkg>`. A name absent from the source package
//! emits a warning and is dropped; wildcard imports add no table
//! entries and instead widen the scope stack during reference
//! resolution (see [`crate::scope`]).

use loom_ast::{Import, ImportKind, SymbolEntry, SymbolKind, SymbolTable};
use loom_base::{Interner, Span, Symbol};
use loom_diagnostic::Reporter;
use std::collections::HashMap;

/// Export tables of every known package, keyed by package name.
pub type PackageExports<'a> = HashMap<Symbol, &'a SymbolTable>;

/// Builds `<name>@<pkg>` and interns it.
fn qualify(interner: &mut Interner, name: Symbol, pkg: Symbol) -> Symbol {
    let text = format!("{}@{}", interner.resolve(name), interner.resolve(pkg));
    interner.intern(&text)
}

/// Which namespaces a given [`ImportKind`] draws from in the source
/// package's export table.
fn namespaces_for(kind: ImportKind) -> &'static [SymbolKind] {
    match kind {
        ImportKind::Mixed => &[SymbolKind::Def, SymbolKind::Type, SymbolKind::Topic],
        ImportKind::DefsOnly => &[SymbolKind::Def],
        ImportKind::TypesOnly => &[SymbolKind::Type],
        ImportKind::TopicsOnly => &[SymbolKind::Topic],
        ImportKind::Wildcard => &[],
    }
}

/// Qualifies every import of one file against `exports`, returning the
/// resulting local [`SymbolTable`] additions. Problems (unknown
/// package, name absent from the source package) are pushed to
/// `reporter` as warnings rather than aborting the whole file.
pub fn qualify_imports(
    imports: &[Import],
    exports: &PackageExports<'_>,
    interner: &mut Interner,
    reporter: &mut Reporter,
) -> SymbolTable {
    let mut local = SymbolTable::new();

    for import in imports {
        let Some(source) = exports.get(&import.package) else {
            reporter.warn(
                import.location,
                format!("import of non-existent package '{}'", interner.resolve(import.package)),
            );
            continue;
        };

        if import.kind == ImportKind::Wildcard {
            local.import_all.insert(import.package);
            continue;
        }

        for &name in &import.names {
            let mut found_any = false;
            for &kind in namespaces_for(import.kind) {
                if let Some(entry) = source.get(kind, name) {
                    found_any = true;
                    let qualified = qualify(interner, name, import.package);
                    local.insert(
                        kind,
                        name,
                        SymbolEntry::imported(qualified, entry.origin),
                    );
                }
            }
            if !found_any {
                reporter.warn(
                    import.location,
                    format!(
                        "'{}' is not exported by package '{}'",
                        interner.resolve(name),
                        interner.resolve(import.package)
                    ),
                );
            }
        }
    }

    local
}
