//! # LST Insight
//!
//! A retrieval-augmented context pipeline for liquid staking yield data.
//!
//! Pool records are pulled from a yields provider, filtered to an
//! allow-list of liquid staking projects, cached, turned into searchable
//! documents, and assembled into context text for a chat assistant's
//! system prompt.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌──────────────┐
//! │  Provider  │──▶│   Cache    │──▶│  Knowledge   │
//! │ /pools     │   │ TTL+stale  │   │ index+search │
//! └─────┬──────┘   └─────┬──────┘   └──────┬───────┘
//!       │ /chart         ▼                 │
//!       │          ┌────────────┐          │
//!       └─────────▶│  Enricher  │          │
//!                  │ +aggregate │          │
//!                  └─────┬──────┘          │
//!                        ▼                 ▼
//!                  ┌──────────┐      ┌──────────┐
//!                  │   CLI    │      │   HTTP   │
//!                  │  (lsti)  │      │   API    │
//!                  └──────────┘      └──────────┘
//! ```
//!
//! Pure logic (models, aggregation, indexing, scoring, text assembly) lives
//! in the `lst-insight-core` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Ingestion error taxonomy |
//! | [`allowlist`] | Liquid staking project allow-list |
//! | [`provider`] | Yields provider trait and HTTP client |
//! | [`cache`] | TTL cache with stale serving |
//! | [`enrich`] | Parallel pool history fetching |
//! | [`knowledge`] | Indexed generations and context assembly |
//! | [`prompt`] | System prompt construction |
//! | [`service`] | Coordinating service shared by CLI and server |
//! | [`server`] | HTTP API |

pub mod allowlist;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod knowledge;
pub mod prompt;
pub mod provider;
pub mod server;
pub mod service;
