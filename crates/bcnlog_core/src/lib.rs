//! # bcnlog Core
//!
//! Time-bucketed, lazily partitioned write path for download events.
//!
//! This crate provides:
//! - [`BucketResolver`] mapping a timestamp to its bucket window
//! - [`PartitionRouter`] writing to the bucket's partition, provisioning it
//!   on demand with a single bounded retry
//! - [`EventRecord`] assembly, echoed or read back from storage
//! - [`ClientRegistry`] for the fixed client table
//! - [`Recorder`], the facade callers use

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod clock;
mod config;
mod error;
mod record;
mod recorder;
mod resolver;
mod router;

pub use client::ClientRegistry;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, StoreUrl, UnresolvedPolicy, DEFAULT_STORE_FILE};
pub use error::{CoreError, CoreResult};
pub use record::EventRecord;
pub use recorder::Recorder;
pub use resolver::BucketResolver;
pub use router::PartitionRouter;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
