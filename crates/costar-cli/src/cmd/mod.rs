//! Command handlers. Each `run_*` function renders its own result and
//! reports typed failures through [`crate::output::render_error`] before
//! returning an error, so `main` only has to set the exit code.

pub mod build;
pub mod neighbors;
pub mod path;
pub mod people;
pub mod search;
pub mod show;
pub mod stats;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use costar_core::builder::{BuildOptions, GraphBuilder};
use costar_core::catalog::{Catalog, MemoryCatalog};
use costar_core::config::{EngineConfig, default_config_path, load_config};
use costar_core::path::PathfindingEngine;
use costar_core::store::GraphStore;

use crate::output::{CliError, OutputMode, render_error};

/// Settings resolved from global flags and the config file.
#[derive(Debug)]
pub struct Session {
    pub config: EngineConfig,
    pub store: Arc<GraphStore>,
    pub options: BuildOptions,
}

impl Session {
    /// Load config from `config_path` (or the user default) and apply the
    /// `--cache` override.
    pub fn open(config_path: Option<&Path>, cache_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = config_path.map(Path::to_path_buf).or_else(default_config_path);
        let mut config = config_path
            .as_deref()
            .map(load_config)
            .transpose()
            .context("Failed to load configuration")?
            .unwrap_or_default();
        if let Some(path) = cache_path {
            config.cache.path = Some(path.to_path_buf());
        }
        let options = BuildOptions::from_config(&config);
        Ok(Self {
            config,
            store: Arc::new(GraphStore::new()),
            options,
        })
    }

    pub fn builder(&self, catalog: Arc<dyn Catalog + Send + Sync>) -> GraphBuilder {
        GraphBuilder::new(Arc::clone(&self.store), catalog, self.options.clone())
    }

    /// Load the snapshot into the store for a read-only query.
    ///
    /// Query commands never rebuild; a missing, stale or empty snapshot is
    /// reported and the command fails.
    pub fn require_graph(&self, output: OutputMode) -> anyhow::Result<()> {
        let builder = self.builder(Arc::new(MemoryCatalog::new()));
        if let Err(e) = builder.try_load_cache() {
            let message = format!("cache missing or stale; run `costar build` ({e})");
            return fail(output, CliError::from_code(message, e.code()));
        }
        Ok(())
    }

    pub fn engine(&self) -> PathfindingEngine {
        PathfindingEngine::new(Arc::clone(&self.store))
    }
}

/// Render `error` and return it as the command's failure.
pub fn fail<T>(output: OutputMode, error: CliError) -> anyhow::Result<T> {
    render_error(output, &error)?;
    Err(anyhow::anyhow!(error.message))
}

