//! # Coursebook Core
//!
//! Core types, errors, and utilities for the Coursebook API.
//!
//! - [`errors`]: application error type with HTTP response conversion
//! - [`pagination`]: page/limit query parameters and response metadata
//! - [`password`]: bcrypt hashing and password strength rules
//! - [`serde`]: query-string deserialization helpers
//! - [`file_storage`]: avatar storage abstraction
//!
//! # Example
//!
//! ```ignore
//! use coursebook_core::errors::AppError;
//! use coursebook_core::pagination::PaginationParams;
//! use coursebook_core::password::hash_password;
//!
//! let error = AppError::not_found("Course not found");
//! let hash = hash_password("Secret123")?;
//! let limit = PaginationParams::default().limit();
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, validate_password_strength, verify_password};
