//! # Strata Domain
//!
//! Value objects and error types for the Strata analytics service client.
//!
//! This crate contains:
//! - Resource value objects (databases, tables, jobs, schedules, ...)
//! - The client error taxonomy and Result definition
//! - Client-side resource name validation
//!
//! ## Architecture
//! - No dependencies on other Strata crates
//! - No I/O; pure data structures and parsing helpers

pub mod errors;
pub mod types;
pub mod validate;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
pub use validate::{validate_bulk_import_name, validate_database_name, validate_table_name};
