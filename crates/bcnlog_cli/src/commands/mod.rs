//! CLI command implementations.

pub mod client;
pub mod inspect;
pub mod provision;
pub mod record;
pub mod resolve;
pub mod window;

use bcnlog_core::{Config, CoreResult, Recorder, StoreUrl};
use std::path::Path;
use tracing::debug;

/// Where the store connection URL comes from.
#[derive(Debug, Clone)]
pub struct StoreArgs<'a> {
    /// Path of the store URL file.
    pub store_file: &'a Path,
    /// URL given on the command line, taking precedence over the file.
    pub url: Option<&'a str>,
}

impl StoreArgs<'_> {
    /// Returns the connection URL to use.
    pub fn url(&self) -> CoreResult<String> {
        match self.url {
            Some(url) => Ok(url.to_string()),
            None => {
                debug!("Reading store url from {:?}", self.store_file);
                Ok(StoreUrl::from_file(self.store_file)?.url)
            }
        }
    }

    /// Opens a recorder over the configured store.
    pub fn recorder(&self, config: Config) -> CoreResult<Recorder> {
        let backend = StoreUrl { url: self.url()? }.open()?;
        Ok(Recorder::new(backend, config))
    }
}

/// Output format for commands that print records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name, defaulting to text for unknown names.
    pub fn parse(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}
