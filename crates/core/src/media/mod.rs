//! Profile image ingestion.
//!
//! This module owns the path from raw uploaded bytes to a stored,
//! publicly addressable profile image:
//!
//! 1. [`SizeBoundedEncoder`] re-encodes arbitrary input into a JPEG that
//!    is guaranteed to fit under a hard byte ceiling.
//! 2. [`generate_key`] produces the backend-agnostic object key.
//! 3. [`ProfileImageService`] orchestrates encoding, persistence, the
//!    profile record update, and best-effort retirement of the previous
//!    image.

mod encoder;
mod error;
mod key;
mod service;

pub use encoder::{Encoded, EncoderConfig, SIZE_CEILING, SizeBoundedEncoder};
pub use error::MediaError;
pub use key::generate_key;
pub use service::{IMAGE_CONTENT_TYPE, ProfileImageRecords, ProfileImageService};
