#![cfg_attr(docsrs, feature(doc_cfg))]

//! # loom-resolve
//!
//! The resolver pipeline (spec.md §4.1): import qualification, export
//! contraction, reference resolution, dependency stratification, match
//! lowering, and topic accumulation, composed into one entry point,
//! [`resolve_top`], that turns a parsed [`Top`] into resolved IR.
//!
//! # Modules
//!
//! - [`error`] — [`error::ResolveError`], the fatal-to-emission errors
//! - [`import`] — import qualification (§4.1.1)
//! - [`export`] — export contraction (§4.1.2)
//! - [`scope`] — reference resolution / lexical addressing (§4.1.3)
//! - [`stratify`] — dependency stratification and SCC partitioning (§4.1.4)
//! - [`pattern`] — match lowering to decision trees (§4.1.5)
//! - [`topic`] — topic accumulation (§4.1.6)
//! - [`bind`] — ties the above together over one expression/`DefMap`

pub mod bind;
pub mod error;
pub mod export;
pub mod import;
pub mod pattern;
pub mod scope;
pub mod stratify;
pub mod topic;

pub use error::ResolveError;

use export::{contract_exports, ExportTarget, RawExports};
use import::{qualify_imports, PackageExports};
use loom_ast::{Expr, ExprKind, ExprRef, PrimitiveRegistry, SymbolEntry, SymbolKind, SymbolTable, Top};
use loom_base::{Interner, Span, Symbol};
use loom_diagnostic::Reporter;
use scope::{GlobalTable, Scope};
use std::collections::{HashMap, HashSet};

fn qualify_at(interner: &mut Interner, name: Symbol, pkg: Symbol) -> Symbol {
    let text = format!("{}@{}", interner.resolve(name), interner.resolve(pkg));
    interner.intern(&text)
}

/// One package's export table, raw and then contracted, built purely
/// from local definitions and topic declarations.
///
/// `loom_ast::Package` carries only the flat `exports: Vec<Symbol>`
/// list (no re-export-target metadata), so every raw entry here is
/// [`ExportTarget::Local`] — `export::contract_exports`'s cycle/
/// re-export handling is exercised by its own unit tests, and wired
/// in here for any future `Package` that grows re-export declarations.
/// See `DESIGN.md`.
fn build_raw_exports(top: &Top) -> RawExports {
    let mut raw = RawExports::new();
    for package in &top.packages {
        let mut names = HashMap::new();
        for file in &package.files {
            if file.local {
                continue;
            }
            for def in &file.content.defs {
                if package.exports.contains(&def.name) {
                    names.insert(def.name, ExportTarget::Local(def.name));
                }
            }
        }
        raw.insert(package.name, names);
    }
    raw
}

/// Builds one [`SymbolTable`] per package from its contracted exports,
/// plus topic declarations (always locally exported — a topic is
/// visible to anyone who can name it, spec.md §4.1.6).
fn build_package_tables(
    top: &Top,
    contracted: &HashMap<Symbol, HashMap<Symbol, Symbol>>,
    interner: &mut Interner,
) -> HashMap<Symbol, SymbolTable> {
    let mut tables = HashMap::new();
    for package in &top.packages {
        let mut table = SymbolTable::new();
        if let Some(names) = contracted.get(&package.name) {
            for (&name, &qualified) in names {
                table.insert(SymbolKind::Def, name, SymbolEntry::local(qualified, package.name));
            }
        }
        for file in &package.files {
            for topic in &file.content.topics {
                // topic qualification is independent of contraction since
                // topics are never re-exported, only declared. The
                // entry's `qualified` is the mangled global `Subscribe`
                // resolves against (spec.md §4.1.3), same `name@pkg`
                // convention as an ordinary Def global.
                let mangled = qualify_at(interner, topic.name, package.name);
                table.insert(SymbolKind::Topic, topic.name, SymbolEntry::local(mangled, package.name));
            }
        }
        tables.insert(package.name, table);
    }
    tables
}

/// Resolves every file of every package in `top`, plus every package's
/// accumulated topics, producing one resolved expression tree per
/// compilation unit.
///
/// Each file is resolved as its own outermost `DefBinding` frame — a
/// file is the unit `resolve_def_map` stratifies, rather than folding
/// every package's files into one shared global frame. This still
/// satisfies spec.md §9's "globals are ordinary top-level definitions
/// reachable through the outermost `DefBinding` frame" (each file's
/// outermost frame plays that role for its own definitions); it trades
/// away cross-file level-sharing within a package for a resolver that
/// doesn't need a second global numbering pass. Recorded as a scoping
/// decision in `DESIGN.md`.
///
/// Returns every resolved tree (files first, package order, then one
/// topic global per declared topic) alongside the [`Reporter`]
/// carrying every warning and error raised along the way. Callers
/// should treat any error-severity diagnostic as fatal to IR emission
/// (spec.md §7) and ignore the returned trees in that case.
pub fn resolve_top(
    top: &Top,
    registry: &dyn PrimitiveRegistry,
    interner: &mut Interner,
) -> (Vec<ExprRef>, Reporter) {
    let mut reporter = Reporter::new();

    let raw = build_raw_exports(top);
    let contracted = match contract_exports(&raw, interner) {
        Ok(c) => c,
        Err(err) => {
            reporter.push(loom_diagnostic::Diagnostic::error(Span::default(), err.to_string()));
            HashMap::new()
        }
    };
    let package_tables = build_package_tables(top, &contracted, interner);
    let exports: PackageExports<'_> = package_tables.iter().map(|(&k, v)| (k, v)).collect();

    let mut results = Vec::new();

    for package in &top.packages {
        let empty_table = SymbolTable::new();
        let package_exports_table = package_tables.get(&package.name).unwrap_or(&empty_table);

        // Every topic this package declares anywhere, regardless of
        // which file; a publish naming anything else is unbound
        // (spec.md §7, `ResolveError::UnboundTopic`).
        let known_topics: HashSet<Symbol> =
            package.files.iter().flat_map(|f| f.content.topics.iter().map(|t| t.name)).collect();

        // Every publish seen across this package's files, grouped by
        // topic, in source order (spec.md §4.1.6).
        let mut topic_values: HashMap<Symbol, Vec<ExprRef>> = HashMap::new();

        for file in &package.files {
            let file_imports = qualify_imports(&file.content.imports, &exports, interner, &mut reporter);
            let file_local = SymbolTable::new();
            let globals_qualified = SymbolTable::new();
            let globals = GlobalTable::new();

            let mut scope =
                Scope::new(&file_local, &file_imports, package_exports_table, &globals_qualified, &globals);

            for publish in &file.content.publishes {
                if !known_topics.contains(&publish.topic) {
                    let err = ResolveError::UnboundTopic { name: publish.topic, location: publish.location };
                    reporter.push(loom_diagnostic::Diagnostic::error(publish.location, err.to_string()));
                    continue;
                }
                let resolved = bind::resolve_expr(&publish.value, &mut scope, &mut reporter, registry);
                topic_values.entry(publish.topic).or_default().push(resolved);
            }

            let body = Expr::new(
                ExprKind::Literal { value: loom_ast::Literal::String(String::new()) },
                Span::default(),
            );
            let resolved_file = bind::resolve_def_map(
                &file.content.defs,
                &body,
                Span::default(),
                &mut scope,
                &mut reporter,
                registry,
            );
            results.push(resolved_file);
        }

        for file in &package.files {
            for topic_decl in &file.content.topics {
                let values = topic_values.remove(&topic_decl.name).unwrap_or_default();
                let global = topic::accumulate_topic(&values, topic_decl.element_type, topic_decl.location);
                results.push(global);
            }
        }
    }

    (results, reporter)
}
