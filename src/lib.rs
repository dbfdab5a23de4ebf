//! # cnf-rs: Hybrid CNF transformation in Rust
//!
//! **`cnf-rs`** turns Boolean constraint systems into **Conjunctive Normal Form (CNF)** for SAT solvers
//! and model counters. It is designed for large configuration models, where most constraints are small
//! but a few would explode under naive clausification.
//!
//! ## How it works
//!
//! The input is a *proto-CNF*: a top-level AND of arbitrary sub-formulas ("conjuncts").
//! Each conjunct is clausified independently:
//!
//! - **Distributive expansion** yields an equivalent set of clauses over the original variables.
//!   It is tried first, bounded by a maximum number of clauses and a maximum clause width.
//! - **Tseytin encoding** is the fallback when the bounds are exceeded. It introduces auxiliary
//!   variables (named with a reserved prefix, `__temp__` by default) and produces an
//!   equisatisfiable CNF of linear size.
//!
//! A substitution cache shared by all conjuncts makes sure that structurally identical
//! sub-formulas are defined by a single auxiliary variable.
//!
//! ## Key Features
//!
//! - **Tunable**: [`TransformKind`][crate::transform::TransformKind] spans the whole range from pure
//!   distributive (no auxiliary variables) to pure Tseytin (no blow-up).
//! - **Shared Sub-formulas**: [`Formula`][crate::formula::Formula] nodes are reference-counted, so a
//!   sub-formula used in many places is stored (and encoded) once.
//! - **Isolated Runs**: the caller's [`Registry`][crate::registry::Registry] is never mutated; every
//!   transformation works on its own copy and owns all its state.
//! - **1-Based Indexing**: Variables are 1-indexed, so literals are DIMACS integers as-is.
//!
//! ## Basic Usage
//!
//! ```rust
//! use cnf_rs::distributive::{Limit, Thresholds};
//! use cnf_rs::formula::Formula;
//! use cnf_rs::registry::Registry;
//! use cnf_rs::transform::TransformKind;
//!
//! // 1. Name the variables (1-indexed)
//! let registry = Registry::from_names(["A", "B", "C", "D"]).unwrap();
//! let x = |i: i32| Formula::clause([i]);
//!
//! // 2. Build a proto-CNF: (A & B) | (C & D), together with ~A | ~D
//! let f = Formula::and([
//!     Formula::or([Formula::and([x(1), x(2)]), Formula::and([x(3), x(4)])]),
//!     Formula::clause([-1, -4]),
//! ]);
//!
//! // 3. Transform, allowing at most 2 clauses per distributive expansion
//! let kind = TransformKind::Hybrid(Thresholds::new(Limit::Count(2), Limit::Unbounded));
//! let result = kind.transform(&f, &registry).unwrap();
//!
//! // The first constraint fell back to Tseytin, the second one did not
//! assert_eq!(result.stats.tseytin_constraint_count, 1);
//! assert_eq!(result.stats.distributive_constraint_count, 1);
//! assert_eq!(result.cnf.aux_variables("__temp__").len(), 3);
//!
//! // 4. Write DIMACS
//! let dimacs = result.cnf.to_dimacs_string();
//! assert!(dimacs.contains("p cnf 7 "));
//! ```
//!
//! ## Core Components
//!
//! - **[`transform`]**: The entry point. Contains the [`Transformer`][crate::transform::Transformer] and its configuration.
//! - **[`distributive`]** and **[`tseytin`]**: The two clausification strategies.
//! - **[`registry`]**: Variable names and fresh auxiliary names.
//! - **[`dimacs`]**: DIMACS output.

pub mod cache;
pub mod clause;
pub mod dimacs;
pub mod distributive;
pub mod error;
pub mod formula;
pub mod registry;
pub mod transform;
pub mod tseytin;
pub mod types;

pub use crate::error::{Error, Result};
