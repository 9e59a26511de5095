//! Outbound adapters implementing the repository ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: a mutex-guarded in-process store for tests and demos
//!
//! Adapters are thin translators between domain types and storage rows.
//! They contain no business logic.

pub mod memory;
pub mod persistence;
