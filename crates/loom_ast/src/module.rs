//! The external package/module interface (spec.md §6): imports,
//! exports-by-publication, topic declarations, and the tree of files
//! and packages the resolver consumes.

use crate::expr::{Def, ExprRef};
use crate::typevar::TypeVar;
use loom_base::{Span, Symbol};

/// The four ways an `import` can qualify names, plus the bare wildcard
/// (spec.md §4.1.1): bring in definitions only, types only, topics
/// only, a definition-and-type pair under one name ("mixed"), or
/// every public name of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Mixed,
    DefsOnly,
    TypesOnly,
    TopicsOnly,
    Wildcard,
}

/// One `import` clause.
#[derive(Debug, Clone)]
pub struct Import {
    pub kind: ImportKind,
    pub package: Symbol,
    /// Specific names to import; empty under [`ImportKind::Wildcard`].
    pub names: Vec<Symbol>,
    pub location: Span,
}

/// One `publish`/export declaration: `value` is appended to `topic`'s
/// accumulated list at link time (spec.md §4.1.6).
#[derive(Debug, Clone)]
pub struct Publish {
    pub topic: Symbol,
    pub value: ExprRef,
    pub location: Span,
}

/// A topic declaration: a name other files can `publish` to and this
/// package (or an importer) can read as an accumulated list.
#[derive(Debug, Clone)]
pub struct TopicDecl {
    pub name: Symbol,
    pub element_type: Option<TypeVar>,
    pub location: Span,
}

/// The parsed contents of one source file, prior to resolution.
#[derive(Debug, Clone, Default)]
pub struct FileContent {
    pub defs: Vec<Def>,
    pub imports: Vec<Import>,
    pub publishes: Vec<Publish>,
    pub topics: Vec<TopicDecl>,
}

/// One source file: its path (for diagnostics) and parsed contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: Symbol,
    pub content: FileContent,
    /// `true` if this file's definitions are package-local (not
    /// reachable from outside the package even if named in `exports`).
    pub local: bool,
}

/// A package: a named group of source files plus its export contraction.
///
/// `exports` lists the names visible to importers after export
/// contraction (spec.md §4.1.2) has resolved re-exports and detected
/// cycles/missing targets; `internal` lists names usable only within
/// the package's own files.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: Symbol,
    pub files: Vec<SourceFile>,
    pub exports: Vec<Symbol>,
    pub internal: Vec<Symbol>,
}

/// The whole program as handed to the resolver: every package, plus
/// the set of names promoted to globals (spec.md §9's resolved Open
/// Question: globals are ordinary top-level definitions reachable
/// through the outermost `DefBinding` frame, not a separate namespace).
#[derive(Debug, Clone, Default)]
pub struct Top {
    pub packages: Vec<Package>,
    pub globals: Vec<Symbol>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_import_carries_no_names() {
        let import = Import {
            kind: ImportKind::Wildcard,
            package: Symbol::default(),
            names: Vec::new(),
            location: Span::default(),
        };
        assert!(import.names.is_empty());
    }

    #[test]
    fn package_defaults_to_empty() {
        let package = Package::default();
        assert!(package.files.is_empty());
        assert!(package.exports.is_empty());
    }
}
