//! Domain model for the vocabulary list.
//!
//! # Responsibility
//! - Define the canonical `Word` record used by store, repository and
//!   controllers.
//!
//! # Invariants
//! - Every persisted word is identified by a stable store-assigned `WordId`.
//! - Deletion is a hard delete; ids are never reused.

pub mod word;
