//! Error types and error handling for the compiler.
//!
//! Every failure is fail-fast: the first error stops compilation and is
//! carried back to the driver as an [`errors::Error`]. This module holds:
//!
//! - Error structures with source position information
//! - Specific error variants for each compilation phase
//! - The coarse [`errors::ErrorKind`] that selects the process exit status
//! - Helpful error messages and suggestions

pub mod errors;
