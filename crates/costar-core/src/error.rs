use std::fmt;

/// Machine-readable error codes shared by every costar error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    SamePerson,
    PersonNotFound,
    MediaNotFound,
    NoPath,
    SearchFailed,
    ConfigParseError,
    CatalogUnavailable,
    BuildFailed,
    CacheMissing,
    CacheCorrupt,
    CacheStale,
    CacheEmpty,
    CacheWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "E1001",
            Self::SamePerson => "E1002",
            Self::PersonNotFound => "E2001",
            Self::MediaNotFound => "E2002",
            Self::NoPath => "E2003",
            Self::SearchFailed => "E2004",
            Self::ConfigParseError => "E3001",
            Self::CatalogUnavailable => "E4001",
            Self::BuildFailed => "E4002",
            Self::CacheMissing => "E5001",
            Self::CacheCorrupt => "E5002",
            Self::CacheStale => "E5003",
            Self::CacheEmpty => "E5004",
            Self::CacheWriteFailed => "E5005",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::SamePerson => "Start and target are the same person",
            Self::PersonNotFound => "Person not found",
            Self::MediaNotFound => "Media item not found",
            Self::NoPath => "No connection found",
            Self::SearchFailed => "Search failed",
            Self::ConfigParseError => "Config file parse error",
            Self::CatalogUnavailable => "Catalog unavailable",
            Self::BuildFailed => "Graph build failed",
            Self::CacheMissing => "Graph snapshot missing",
            Self::CacheCorrupt => "Graph snapshot unreadable",
            Self::CacheStale => "Graph snapshot stale",
            Self::CacheEmpty => "Graph snapshot empty",
            Self::CacheWriteFailed => "Graph snapshot write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => Some("Pass non-empty person ids."),
            Self::SamePerson => Some("Pick two different people."),
            Self::PersonNotFound => Some("Use `costar search <name>` to look up a person id."),
            Self::MediaNotFound | Self::SearchFailed => None,
            Self::NoPath => Some("Retry with a larger --max-depth."),
            Self::ConfigParseError => Some("Fix syntax in config.toml and retry."),
            Self::CatalogUnavailable => Some("Check that the catalog file exists and is valid JSON."),
            Self::BuildFailed => Some("Retry the build. If persistent, report a bug with logs."),
            Self::CacheMissing | Self::CacheStale | Self::CacheEmpty | Self::CacheCorrupt => {
                Some("Run `costar build --catalog <file>` to rebuild the graph.")
            }
            Self::CacheWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
