//! ID prefixes for store-generated identifiers.
//!
//! IDs look like `run-a3f8b2c1`: a three-letter prefix, a dash, and eight
//! lowercase hex characters.

pub const PREFIX_VERSION: &str = "ver";
pub const PREFIX_NODE: &str = "nod";
pub const PREFIX_RUN: &str = "run";

pub const ALL_PREFIXES: &[&str] = &[PREFIX_VERSION, PREFIX_NODE, PREFIX_RUN];
