//! Common utilities for the lorikeet selector compiler.
//!
//! This crate provides shared infrastructure used by the compiler crates:
//! - **Warning System** - colored terminal output for deprecated syntax

pub mod warning;
