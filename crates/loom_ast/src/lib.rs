#![cfg_attr(docsrs, feature(doc_cfg))]

//! # loom-ast
//!
//! The shared data model between the resolver and the evaluator:
//! expression trees, sum types and patterns, symbol tables, and the
//! package/module interface (spec.md §3 and §6).
//!
//! Nothing in this crate evaluates anything — it only describes shape.
//! `loom_resolve` builds and transforms these types; `loom_eval`
//! consumes the IR they settle into.
//!
//! # Modules
//!
//! - [`expr`] — `Expr`/`ExprKind`, the tagged AST/IR node, and its
//!   supporting `Address`/`Literal`/`PrimData`/`Def`/`MatchArm` types
//! - [`sum`] — `Sum`/`Constructor`, surface `Pattern`s, and the
//!   `PatternNode` decision-tree scaffold used during match lowering
//! - [`symbol_table`] — per-scope `SymbolTable`/`SymbolEntry`
//! - [`module`] — `Import`/`Publish`/`TopicDecl`/`Package`/`Top`, the
//!   external package interface
//! - [`prim`] — the resolver-side `PrimitiveRegistry` trait
//! - [`typevar`] — `TypeVar`/`TypeVarClock`, handles for the external
//!   type checker

pub mod expr;
pub mod module;
pub mod prim;
pub mod sum;
pub mod symbol_table;
pub mod typevar;

pub use expr::{Address, Def, Expr, ExprKind, ExprRef, Literal, MatchArm, PrimData};
pub use module::{FileContent, Import, ImportKind, Package, Publish, SourceFile, Top, TopicDecl};
pub use prim::{PrimDescriptor, PrimitiveRegistry};
pub use sum::{Constructor, Pattern, PatternNode, Sum};
pub use symbol_table::{SymbolEntry, SymbolKind, SymbolTable};
pub use typevar::{TypeVar, TypeVarClock};
