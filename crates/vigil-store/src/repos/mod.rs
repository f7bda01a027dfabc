//! Repository implementations, one module per stored entity.
//!
//! Each module adds methods to [`crate::AuditStore`].

pub mod result;
pub mod rollup;
pub mod run;
pub mod template;
