//! Repository facade used by presentation layers.
//!
//! # Responsibility
//! - Expose validated CRUD over epics and stories.
//! - Keep storage details behind the `Storage` trait.
//!
//! # Invariants
//! - Repository writes validate input before the store is touched.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`) in
//!   addition to storage errors.

pub mod issue_repo;
