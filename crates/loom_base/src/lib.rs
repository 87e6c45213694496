#![cfg_attr(docsrs, feature(doc_cfg))]

//! # loom-base
//!
//! Pure structural atoms shared by every Loom crate.
//!
//! - [`Arena`] — bump allocation for stable IR/heap references
//! - [`Interner`]/[`Symbol`] — string interning for O(1) equality
//! - [`Span`] — source location tracking
//! - [`SpannedError`]/[`Result`] — errors with source positions
//!
//! # Design principles
//!
//! This crate knows nothing about the resolver, the evaluator, or the
//! language's surface syntax. It provides only the generic, reusable
//! infrastructure every higher-level crate builds on.
//!
//! # Example
//!
//! ```
//! use loom_base::{Arena, Interner, Span};
//!
//! let arena: Arena<&str> = Arena::new();
//! let mut interner = Interner::new();
//!
//! let hello = interner.intern("hello");
//! let span = Span::new(0, 5);
//!
//! let allocated = arena.alloc("hello");
//! assert_eq!(*allocated, "hello");
//! ```

pub mod arena;
pub mod error;
pub mod intern;
pub mod span;

pub use arena::Arena;
pub use error::{Result, SpannedError};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::Span;
