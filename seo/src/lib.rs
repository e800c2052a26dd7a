//! SEO metadata for storefront pages.
//!
//! Overrides are administered per tenant and path in a separate backend. This
//! crate fetches them, merges them over static defaults and keeps a rendered
//! document's head in sync as the client navigates.

pub mod client;
pub mod config;
pub mod document;
pub mod metadata;
pub mod metrics_defs;
pub mod page_metadata;
pub mod query;
pub mod synchronizer;

#[cfg(test)]
mod testutils;

pub use client::{SeoClient, SeoFetch};
pub use document::{DocumentHead, HeadDocument, MetaKey};
pub use metadata::{Metadata, SeoOverride, merge};
pub use page_metadata::PageMetadata;
pub use query::{AppSource, SeoQuery};
pub use synchronizer::{MetadataSynchronizer, NavigationToken, SyncState};
