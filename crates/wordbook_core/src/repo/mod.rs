//! Word store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the blocking data-access contract for words.
//! - Isolate SQLite query details from the repository and controllers.
//!
//! # Invariants
//! - Store writes enforce `Word::validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod memory_store;
pub mod word_store;
