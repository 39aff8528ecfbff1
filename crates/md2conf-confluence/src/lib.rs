//! Confluence integration for md2conf.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: REST API client with HTTP Basic authentication
//! - [`PageStore`]: the lookup/create/update surface the publisher relies on
//! - [`markdown_to_storage`]: Markdown to Confluence storage format conversion
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use md2conf_confluence::{ConfluenceClient, PageStore, markdown_to_storage};
//!
//! let client = ConfluenceClient::new("https://wiki.example.com", "bot", "api-token");
//! let body = markdown_to_storage("# Guide\n\nHello");
//!
//! match client.find_page_by_title("DOCS", "docs/guide")? {
//!     Some(page) => {
//!         client.update_page(&page.id, "docs/guide", &body, page.version.number)?;
//!     }
//!     None => {
//!         client.create_page("DOCS", "docs/guide", &body, "123456")?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// API client
mod client;
pub use client::ConfluenceClient;

// Storage-format renderer
mod renderer;
pub use renderer::{StorageRenderer, markdown_to_storage};

// Page store seam
mod store;
pub use store::PageStore;

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockPageStore, StoreCall};

// Types
mod types;
pub use types::{Body, RemotePage, Storage, Version};

// Errors
pub mod error;
pub use error::ConfluenceError;
