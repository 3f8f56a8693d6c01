//! npm ecosystem support for depimpact.
//!
//! This crate provides package.json handling, the npm registry
//! [`PackageSource`](depimpact_core::PackageSource) and the semver comparison
//! used to grade upgrade impact.

pub mod error;
pub mod manifest;
pub mod registry;
pub mod version;

pub use error::{NpmError, Result};
pub use manifest::{collect_declarations, parse_manifest};
pub use registry::{NpmSource, parse_package_document};
pub use version::{compare, coerce, declared_baseline};
