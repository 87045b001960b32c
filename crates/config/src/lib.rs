//! Layered configuration for shelf.
//!
//! Values are resolved in order, later layers winning:
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, picked by extension),
//! 3. `GITHUB_ACCESS_TOKEN`, for the credential only,
//! 4. `SHELF_`-prefixed environment variables (`SHELF_PAGE_SIZE=50`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked for in the platform config
/// directory.
pub const CONFIG_FILE_NAME: &str = "shelf.toml";
/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "SHELF_";
/// Environment variable accepted as a fallback for the access credential.
pub const LEGACY_TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";
const MAX_PAGE_SIZE: u8 = 100;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credential appended to every remote request.
    pub access_token: Option<String>,
    /// Root of the remote API.
    pub api_base: String,
    /// Listing page size, 1 to 100.
    pub page_size: u8,
    /// Seconds between two sync cycles.
    pub sync_interval: u64,
    /// Directory holding the cached `<id>.json` records.
    pub cache_dir: PathBuf,
    pub user_agent: String,
    /// Upper bound on listing pages fetched per cycle.
    pub max_pages: usize,
    /// Fetch and index as usual, but never write to the cache.
    pub read_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: "https://api.github.com".to_string(),
            page_size: MAX_PAGE_SIZE,
            sync_interval: 60 * 60,
            cache_dir: PathBuf::from("./data/entries"),
            user_agent: format!("shelf/{}", env!("CARGO_PKG_VERSION")),
            max_pages: 1000,
            read_only: false,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Config")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("page_size", &self.page_size)
            .field("sync_interval", &self.sync_interval)
            .field("cache_dir", &self.cache_dir)
            .field("user_agent", &self.user_agent)
            .field("max_pages", &self.max_pages)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// With `file`, that file must exist. Without, `shelf.toml` in the
    /// platform config directory is used if present.
    ///
    /// # Errors
    ///
    /// - [`NotFound`](ErrorKind::NotFound) if `file` doesn't exist.
    /// - [`UnsupportedFormat`](ErrorKind::UnsupportedFormat) for an unknown
    ///   file extension.
    /// - [`Load`](ErrorKind::Load) when a layer can't be read or a value has
    ///   the wrong type.
    /// - [`Invalid`](ErrorKind::Invalid) when validation fails.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => figment = merge_file(figment, path)?,
            None => {
                if let Some(path) = default_path().filter(|path| path.is_file()) {
                    tracing::debug!(path = %path.display(), "Using configuration file");
                    figment = merge_file(figment, &path)?;
                }
            },
        }
        let config: Self = figment
            .merge(Env::raw().only(&[LEGACY_TOKEN_VAR]).map(|_| "access_token".into()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            exn::bail!(ErrorKind::Invalid(format!("page_size must be between 1 and {MAX_PAGE_SIZE}")));
        }
        if self.sync_interval == 0 {
            exn::bail!(ErrorKind::Invalid("sync_interval must be greater than zero".to_string()));
        }
        if self.max_pages == 0 {
            exn::bail!(ErrorKind::Invalid("max_pages must be greater than zero".to_string()));
        }
        if !(self.api_base.starts_with("https://") || self.api_base.starts_with("http://")) {
            exn::bail!(ErrorKind::Invalid(format!("api_base must be an http(s) URL, got {:?}", self.api_base)));
        }
        if self.cache_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("cache_dir must not be empty".to_string()));
        }
        // An empty variable is as good as an unset one.
        self.access_token = self.access_token.filter(|token| !token.trim().is_empty());
        Ok(self)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval)
    }

    /// The cache directory as an absolute path (relative paths are taken
    /// from the current directory).
    pub fn cache_dir(&self) -> Result<PathBuf> {
        std::path::absolute(&self.cache_dir).or_raise(|| ErrorKind::Invalid(format!("cache_dir {:?}", self.cache_dir)))
    }
}

/// Where the configuration file is looked for when none is given.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shelf").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}
