//! External plugin configuration, the YAML file shared with the bots that
//! maps repositories to their owners service.
use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::OwnersError;

/// Top level key holding the lgtm plugin entries.
pub const LGTM_CONFIGURATION_KEY: &str = "ti-community-lgtm";

/// A single lgtm plugin entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LgtmEntry {
    /// Either of the form `org/repo` or just `org`.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Base URL of the owners service for these repos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_owners_endpoint: Option<String>,
}

impl LgtmEntry {
    /// The endpoint of this entry as configured. Blank endpoints count as none.
    pub fn endpoint(&self) -> Option<&str> {
        self.pull_owners_endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
    }

    /// Checks that the entry has an endpoint and that it is an absolute URL.
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = self
            .endpoint()
            .ok_or_else(|| "pull_owners_endpoint is missing".to_string())?;
        let url = Url::parse(endpoint)
            .map_err(|e| format!("pull_owners_endpoint \"{}\" is not a URL: {}", endpoint, e))?;
        if url.cannot_be_a_base() {
            return Err(format!(
                "pull_owners_endpoint \"{}\" cannot be a base URL",
                endpoint
            ));
        }
        Ok(())
    }
}

/// The parts of the external plugin configuration this server cares about.
/// Every other top level key is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPluginConfig {
    #[serde(rename = "ti-community-lgtm", default)]
    pub lgtm: Vec<LgtmEntry>,
}

impl ExternalPluginConfig {
    /// Parses and validates a configuration document. `path` is only used for error reporting.
    /// One bad lgtm entry rejects the whole document, even if it would never be resolved.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, OwnersError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|source| OwnersError::ConfigMalformed {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Validates every lgtm entry, in order.
    pub fn validate(&self, path: &Path) -> Result<(), OwnersError> {
        for (index, entry) in self.lgtm.iter().enumerate() {
            if let Err(reason) = entry.validate() {
                error!(
                    "Invalid {} entry {} in {:?}: {}",
                    LGTM_CONFIGURATION_KEY, index, path, reason
                );
                return Err(OwnersError::ConfigInvalid {
                    path: path.to_path_buf(),
                    index,
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Reads and parses the configuration file at `path`.
    pub async fn load(path: &Path) -> Result<Self, OwnersError> {
        debug!("Reading plugin configuration {:?}...", path);
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| OwnersError::ConfigUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(path, &text)
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Sourcing                                 */
/* -------------------------------------------------------------------------- */

/// Remembers the last parsed configuration along with the file's modification time.
#[derive(Debug)]
pub struct PluginConfigCache {
    path: PathBuf,
    entry: RwLock<Option<(SystemTime, Arc<ExternalPluginConfig>)>>,
}

impl PluginConfigCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entry: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached configuration, re-reading the file when it was modified.
    /// Failures are never cached.
    pub async fn get(&self) -> Result<Arc<ExternalPluginConfig>, OwnersError> {
        let modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .map_err(|source| OwnersError::ConfigUnreadable {
                path: self.path.clone(),
                source,
            })?;

        if let Ok(entry) = self.entry.read() {
            if let Some((at, config)) = entry.as_ref() {
                if *at == modified {
                    return Ok(config.clone());
                }
            }
        }

        info!("Plugin configuration {:?} changed, reloading", self.path);
        let config = Arc::new(ExternalPluginConfig::load(&self.path).await?);
        if let Ok(mut entry) = self.entry.write() {
            *entry = Some((modified, config.clone()));
        }
        Ok(config)
    }
}

/// Where the plugin configuration comes from on each request.
#[derive(Debug)]
pub enum PluginConfigSource {
    /// Read and parse the file on every request.
    File(PathBuf),
    /// Only re-parse the file when its modification time changes.
    Cached(PluginConfigCache),
}

impl PluginConfigSource {
    pub fn new(path: PathBuf, cached: bool) -> Self {
        match cached {
            true => Self::Cached(PluginConfigCache::new(path)),
            false => Self::File(path),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) => p,
            Self::Cached(c) => c.path(),
        }
    }

    /// The configuration as it is right now.
    pub async fn current(&self) -> Result<Arc<ExternalPluginConfig>, OwnersError> {
        match self {
            Self::File(p) => Ok(Arc::new(ExternalPluginConfig::load(p).await?)),
            Self::Cached(c) => c.get().await,
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
