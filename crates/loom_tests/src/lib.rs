//! Integration test suite for the resolver/evaluator core.
//!
//! This crate exists only to run the tests under `tests/`. All actual
//! test code lives in `tests/*.rs`; `common` (under `tests/common`)
//! holds the hand-built IR constructors shared across them, since this
//! workspace owns no parser to produce IR from source text (spec.md
//! §1: the lexer/parser is an external collaborator).
