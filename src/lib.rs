//! # wardrobe-stylist
//!
//! Backend for a personal stylist: garment photos are tagged by a vision
//! language model, stored as a searchable wardrobe, and combined into
//! outfits that the model then rates for a given occasion.
//!
//! ## Architecture
//!
//! The recommendation pipeline:
//!
//! ```text
//!                     ┌─────────────────────┐
//!                     │   Free-text request  │
//!                     └──────────┬──────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!       ┌───────────────────┐         ┌───────────────────┐
//!       │ Style search      │         │ Preference        │
//!       │ (embed + cosine)  │         │ extraction (LLM)  │
//!       └─────────┬─────────┘         └─────────┬─────────┘
//!                 │ items                       │ occasion / weather / style
//!                 ▼                             │
//!       ┌───────────────────┐                   │
//!       │ categorize        │                   │
//!       │ top/bottom/shoes/ │                   │
//!       │ outerwear         │                   │
//!       └─────────┬─────────┘                   │
//!                 ▼                             │
//!       ┌───────────────────┐                   │
//!       │ generate          │                   │
//!       │ first N per slot, │                   │
//!       │ cartesian product │                   │
//!       └─────────┬─────────┘                   │
//!                 ▼                             │
//!       ┌───────────────────┐                   │
//!       │ score (LLM judge, │◄──────────────────┘
//!       │ bounded pool)     │
//!       └─────────┬─────────┘
//!                 ▼
//!       ┌───────────────────┐
//!       │ best outfit       │
//!       │ (stable maximum)  │
//!       └───────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, data dirs, and LLM settings
//! - [`models`] - Garment tags, slots, outfit candidates, request/response types
//! - [`outfit`] - Slot categorization, candidate generation and [`outfit::scoring`]
//! - [`llm`] - Capability traits and the HTTP client implementing them
//! - [`store`] - JSON item store
//! - [`search::vector`] - In-memory vector store with cosine similarity and disk persistence
//! - [`error`] - Typed language-model errors
//! - [`api`] - Axum router and handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod outfit;
pub mod search;
pub mod state;
pub mod store;
