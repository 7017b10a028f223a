//! Curator Core - Foundation crate for the Curator media manager.
//!
//! This crate provides the error taxonomy and the uniform member-access
//! layer that the storage and configuration crates build on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`access`] - Uniform get/set over maps, property bags and typed objects
//!
//! # Example
//!
//! ```rust
//! use curator_core::{MemberAccess, PropertyBag};
//! use serde_json::json;
//!
//! let mut bag = PropertyBag::new();
//! bag.insert("Width", json!(120));
//!
//! // Lookups fall back to a case-insensitive match.
//! assert_eq!(bag.get("width"), json!(120));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod access;
pub mod error;

// Re-export commonly used types
pub use access::{split_path, Indexer, MemberAccess, PropertyBag};
pub use error::{ConfigError, ConfigResult, CuratorError, ErrorKind, Result};

// Referenced by `reflect_members!` expansions in downstream crates.
#[doc(hidden)]
pub use serde_json;
