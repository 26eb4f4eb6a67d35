//! Byte storage for uploaded files.
//!
//! Provides a [`FileStorage`] trait with a local-directory implementation,
//! [`LocalFileStorage`].

mod local;
mod service;

pub use local::LocalFileStorage;
pub use service::{FileStorage, StorageError, StorageResult};

#[cfg(test)]
pub use service::MockFileStorage;
