//! Core domain entities.
//!
//! Entities are plain data structures. Creation inputs are separate structs
//! (`NewUser`, `NewProduct`, `NewStoredFile`), partial updates use `*Patch`.
//!
//! - [`User`] - a registered account with its role set
//! - [`Product`] - a catalogue item priced in cents
//! - [`StoredFile`] - metadata of an uploaded file

pub mod file;
pub mod product;
pub mod user;

pub use file::{FileFilter, NewStoredFile, StoredFile};
pub use product::{NewProduct, Product, ProductPatch, to_cents};
pub use user::{NewUser, ROLE_ADMIN, ROLE_USER, User, UserPatch};
