//! Repository façade used by controllers.
//!
//! # Responsibility
//! - Turn the blocking store contract into awaitable, observable calls.
//! - Keep controllers decoupled from storage details.

pub mod words_repo;
