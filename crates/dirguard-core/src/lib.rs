//! # dirguard-core
//!
//! Shared types for existence-guarded directory access.
//!
//! This crate holds everything that does not talk to the network: the error taxonomy surfaced
//! by every directory operation, bind credentials, and the validated connection configuration.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and stable error codes
//! - [`credentials`] - Bind identity and secret
//! - [`config`] - Validated directory connection configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod credentials;
pub mod error;

// Re-export commonly used types
pub use config::DirectoryConfig;
pub use credentials::BindCredentials;
pub use error::{Error, Result};
