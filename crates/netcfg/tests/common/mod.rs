//! Shared test utilities for netcfg integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a reconciler to an in-memory store
//! - Builder patterns for creating desired documents programmatically

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{CountingWait, TestHarness};
