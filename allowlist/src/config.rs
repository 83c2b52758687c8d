use crate::allocation::AllocationList;
use crate::encoding::EncodingScheme;
use crate::error::{AllowlistError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "ALLOWLIST";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowlistConfig {
    /// JSON allocation list; the compiled-in storefront list when unset.
    pub allocations: Option<PathBuf>,
    pub encoding: EncodingScheme,
    pub listen: String,
    pub cache_trees: bool,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            allocations: None,
            encoding: EncodingScheme::default(),
            listen: DEFAULT_LISTEN.to_string(),
            cache_trees: true,
        }
    }
}

impl AllowlistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, then `file` (TOML) if given, then `ALLOWLIST_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| AllowlistError::Config(e.to_string()))
    }

    pub fn with_allocations(mut self, path: impl Into<PathBuf>) -> Self {
        self.allocations = Some(path.into());
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingScheme) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    pub fn with_cache_trees(mut self, enabled: bool) -> Self {
        self.cache_trees = enabled;
        self
    }

    pub fn load_allocations(&self) -> Result<AllocationList> {
        match &self.allocations {
            Some(path) => AllocationList::from_path(path),
            None => AllocationList::default_fixture(),
        }
    }
}
