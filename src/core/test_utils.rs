//! Test utilities for job tests.
//!
//! Provides an in-memory runtime and a context owning the arena a job
//! borrows, so tests can build jobs without a real heap.
