//! # acorn testkit
//!
//! Test utilities for acorn.
//!
//! This crate provides:
//! - Temp-directory database fixtures with automatic cleanup
//! - Property-based test generators using proptest
//! - A tracing init helper for debugging test runs
//!
//! The facade's cross-crate integration tests live in this crate's
//! `tests/` directory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acorn_testkit::with_temp_db;
//!
//! #[test]
//! fn test_with_database() {
//!     with_temp_db(|db| {
//!         db.ensure_bucket("test").unwrap();
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
