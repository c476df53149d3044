//! # LST Insight Core
//!
//! Runtime-free logic for LST Insight: pool models, protocol aggregation,
//! document indexing, the keyword retrieval engine and context text
//! assembly.
//!
//! This crate contains no tokio, HTTP client or filesystem I/O. The
//! application crate supplies the provider, the cache and the service
//! wiring.

pub mod aggregate;
pub mod context;
pub mod format;
pub mod index;
pub mod models;
pub mod profile;
pub mod search;
pub mod store;
