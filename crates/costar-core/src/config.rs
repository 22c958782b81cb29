use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::KindFilter;
use crate::path::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_true")]
    pub include_movies: bool,
    #[serde(default = "default_true")]
    pub include_series: bool,
    #[serde(default)]
    pub include_albums: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            include_movies: default_true(),
            include_series: default_true(),
            include_albums: false,
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub const fn kind_filter(&self) -> KindFilter {
        KindFilter {
            movies: self.include_movies,
            series: self.include_series,
            albums: self.include_albums,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Snapshots older than this many hours are rebuilt.
    #[serde(default = "default_refresh_hours")]
    pub refresh_hours: u32,
    /// Explicit snapshot location; defaults to the user cache directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_hours: default_refresh_hours(),
            path: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.refresh_hours))
    }

    /// Where the snapshot lives: the configured path, else
    /// `<cache_dir>/costar/graph.json`, else `./costar-graph.json`.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::cache_dir().map_or_else(
            || PathBuf::from("costar-graph.json"),
            |dir| dir.join("costar/graph.json"),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_neighbor_degree")]
    pub neighbor_degree: usize,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            neighbor_degree: default_neighbor_degree(),
            max_nodes: default_max_nodes(),
        }
    }
}

/// `<config_dir>/costar/config.toml`, if the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("costar/config.toml"))
}

/// Load configuration from `path`. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

const fn default_refresh_hours() -> u32 {
    24
}

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

const fn default_neighbor_degree() -> usize {
    2
}

const fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let cfg = load_config(&tmp.path().join("config.toml")).expect("load should succeed");
        assert_eq!(cfg, EngineConfig::default());
        assert!(cfg.catalog.include_movies);
        assert!(cfg.catalog.include_series);
        assert!(!cfg.catalog.include_albums);
        assert_eq!(cfg.cache.refresh_hours, 24);
        assert_eq!(cfg.query.max_depth, 6);
        assert_eq!(cfg.query.neighbor_degree, 2);
        assert_eq!(cfg.query.max_nodes, 500);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[catalog]
include_albums = true

[cache]
refresh_hours = 6
path = "/var/lib/costar/graph.json"
"#,
        )
        .expect("write config");

        let cfg = load_config(&path).expect("load");
        assert!(cfg.catalog.include_movies);
        assert!(cfg.catalog.include_albums);
        assert_eq!(cfg.catalog.kind_filter(), KindFilter::all());
        assert_eq!(cfg.cache.refresh_interval(), chrono::Duration::hours(6));
        assert_eq!(
            cfg.cache.snapshot_path(),
            PathBuf::from("/var/lib/costar/graph.json")
        );
        assert_eq!(cfg.query, QueryConfig::default());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[cache\nrefresh_hours = ").expect("write config");

        let err = load_config(&path).expect_err("must fail");
        assert!(err.to_string().contains("Failed to parse"));
    }
}
