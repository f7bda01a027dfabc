//! # vigil-core
//!
//! Core types shared across all Vigil crates.
//!
//! - Status and severity enums, with the run phase state machine
//! - Check nodes and their check descriptors (built-in or SQL template)
//! - Typed target references (table, column, relationship)
//! - Per-node check results and the run-level rollup
//! - Tree ordering for check templates
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod rollup;
pub mod tree;
