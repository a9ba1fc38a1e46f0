//! Shared helpers for tests across the crate.
