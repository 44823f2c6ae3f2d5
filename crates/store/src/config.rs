use std::path::PathBuf;
use std::time::Duration;

use crate::error::StoreError;

/// Slot file used when `CHECKS_STORE_URL` is not set.
pub const DEFAULT_LOCAL_CACHE_PATH: &str = "data/checks.json";

/// Backend selected by the store connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// `http(s)://` remote script endpoint.
    Script { url: String },
    /// `postgres://` document collection.
    Document { url: String },
    /// JSON slot on local disk.
    Local { path: PathBuf },
}

impl StoreTarget {
    /// Select a backend from a connection string.
    ///
    /// A missing or blank string is not an error: it selects the local cache
    /// at `local_default`.
    pub fn parse(raw: Option<&str>, local_default: PathBuf) -> Result<Self, StoreError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(StoreTarget::Local { path: local_default }),
            Some(raw) => raw,
        };

        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(StoreTarget::Script {
                url: raw.to_string(),
            })
        } else if raw.starts_with("postgres://") || raw.starts_with("postgresql://") {
            Ok(StoreTarget::Document {
                url: raw.to_string(),
            })
        } else if let Some(path) = raw.strip_prefix("file://") {
            if path.is_empty() {
                return Err(StoreError::Config("file:// store URL has no path".into()));
            }
            Ok(StoreTarget::Local {
                path: PathBuf::from(path),
            })
        } else {
            Err(StoreError::Config(format!(
                "unsupported store URL scheme in '{}'",
                redact(raw)
            )))
        }
    }

    /// Connection string safe to log: credentials are masked.
    pub fn describe(&self) -> String {
        match self {
            StoreTarget::Script { url } | StoreTarget::Document { url } => redact(url),
            StoreTarget::Local { path } => format!("file://{}", path.display()),
        }
    }
}

/// Mask `user:password@` in a URL.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

/// Record store configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub target: StoreTarget,
    /// Per-request timeout for the script endpoint.
    pub script_timeout: Duration,
    /// Pool size for the document store.
    pub max_connections: u32,
    /// How long a document store call waits for a connection.
    pub db_acquire_timeout: Duration,
    /// Where the list snapshot is persisted, if anywhere.
    pub snapshot_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default             |
    /// |---------------------------|---------------------|
    /// | `CHECKS_STORE_URL`        | unset (local cache) |
    /// | `LOCAL_CACHE_PATH`        | `data/checks.json`  |
    /// | `SCRIPT_TIMEOUT_SECS`     | `30`                |
    /// | `DB_MAX_CONNECTIONS`      | `5`                 |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                 |
    /// | `SNAPSHOT_CACHE_PATH`     | unset (memory only) |
    pub fn from_env() -> Result<Self, StoreError> {
        let local_default = std::env::var("LOCAL_CACHE_PATH")
            .unwrap_or_else(|_| DEFAULT_LOCAL_CACHE_PATH.into());
        let target = StoreTarget::parse(
            std::env::var("CHECKS_STORE_URL").ok().as_deref(),
            PathBuf::from(local_default),
        )?;

        let script_timeout_secs: u64 = parse_env("SCRIPT_TIMEOUT_SECS", 30)?;
        let max_connections: u32 = parse_env("DB_MAX_CONNECTIONS", 5)?;
        let db_acquire_timeout_secs: u64 = parse_env("DB_ACQUIRE_TIMEOUT_SECS", 5)?;

        let snapshot_path = std::env::var("SNAPSHOT_CACHE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            target,
            script_timeout: Duration::from_secs(script_timeout_secs),
            max_connections,
            db_acquire_timeout: Duration::from_secs(db_acquire_timeout_secs),
            snapshot_path,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, StoreError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StoreError::Config(format!("{key} must be a number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
