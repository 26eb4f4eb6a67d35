//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and file storage.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - process-local repositories used without a database
//! - [`storage`] - byte storage for uploaded files

pub mod memory;
pub mod persistence;
pub mod storage;
