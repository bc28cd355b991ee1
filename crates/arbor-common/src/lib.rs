//! Common utilities for the arbor parser.
//!
//! This crate provides shared infrastructure used by all arbor components:
//! - **Warning System** - deduplicated, colored terminal diagnostics

pub mod warning;
