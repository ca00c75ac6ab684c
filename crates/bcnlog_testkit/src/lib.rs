//! # bcnlog Testkit
//!
//! Test utilities for bcnlog.
//!
//! This crate provides:
//! - Seeded test stores for every backend
//! - A fault-injecting backend wrapper with call counters
//! - Property-based test generators using proptest
//! - Concurrent first-writer harnesses
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bcnlog_testkit::prelude::*;
//!
//! #[test]
//! fn writes_on_every_backend() {
//!     for_each_store(|store| {
//!         let router = PartitionRouter::new(store.backend.clone(), &Config::default());
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fault;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fault::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fault::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
