//! # grepapp-search
//!
//! A Rust library for querying the grep.app code search API page by page and
//! collecting the matched lines of every file into one deduplicated result set.
//!
//! ## Main Components
//!
//! - [`GrepSearcher`]: builds page requests, parses responses and drives the page loop
//! - [`ResultSet`]: hits accumulated per repository and path
//! - [`Args`]: command line arguments, validated into a [`SearchConfig`]
//!
//! ## Example
//!
//! ```no_run
//! use grepapp_search_lib::{Args, GrepSearcher};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // Parse and validate command line arguments
//!     let config = Args::parse().validate()?;
//!
//!     // Fetch every page and print the merged hits
//!     let searcher = GrepSearcher::new(&config)?;
//!     let results = searcher.run(&config.query).await?;
//!     println!("{}", results.to_json()?);
//!
//!     Ok(())
//! }
//! ```

mod args;
mod error;
mod hits;
mod searcher;
pub mod snippet;

// Re-export main components for documentation and external use
pub use crate::args::{Args, SearchConfig, DEFAULT_ENDPOINT};
pub use crate::error::{Result, SearchError};
pub use crate::hits::{Hit, ResultSet};
pub use crate::searcher::{GrepSearcher, Page, PagePolicy, Query};
