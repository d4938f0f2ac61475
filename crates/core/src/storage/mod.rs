//! Object storage for profile images using Apache OpenDAL.
//!
//! One `StorageService` is built at startup from the resolved
//! [`StorageProvider`] and injected wherever stored bytes are needed.
//! The provider is chosen exactly once: remote (S3-compatible) when the
//! complete credential set is configured, local filesystem otherwise.
//! Stored objects are addressed by backend-agnostic keys; public URLs are
//! composed from a configured base URL and never depend on the backend.

mod config;
mod error;
mod service;

pub use config::{StorageMode, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;
