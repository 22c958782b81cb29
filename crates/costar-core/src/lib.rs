#![forbid(unsafe_code)]
//! costar-core library.
//!
//! An in-memory graph of people and the media items they are credited on,
//! with shortest-connection and neighborhood queries.
//!
//! # Wiring
//!
//! Components are constructed once and shared explicitly:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use costar_core::builder::{BuildOptions, GraphBuilder};
//! use costar_core::catalog::MemoryCatalog;
//! use costar_core::config::EngineConfig;
//! use costar_core::path::PathfindingEngine;
//! use costar_core::store::GraphStore;
//!
//! let config = EngineConfig::default();
//! let store = Arc::new(GraphStore::new());
//! let builder = GraphBuilder::new(
//!     Arc::clone(&store),
//!     Arc::new(MemoryCatalog::new()),
//!     BuildOptions::from_config(&config),
//! );
//! if !builder.load_cache() {
//!     builder.build_graph()?;
//! }
//! let engine = PathfindingEngine::new(store);
//! let _ = engine.shortest_path("p1", "p2", 6);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per module, each mapping to an
//!   [`error::ErrorCode`]; `anyhow::Result` at the catalog seam.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod builder;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod path;
pub mod store;
