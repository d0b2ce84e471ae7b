use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::templates::TemplateServerContext;

fn default_name() -> String {
    "Ownershelf".to_string()
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_github_url() -> Url {
    Url::parse("https://github.com/").expect("valid built-in GitHub URL")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_general() -> ServerConfigGeneral {
    ServerConfigGeneral {
        name: default_name(),
        home_url: None,
        address: default_address(),
        port: default_port(),
        github_url: default_github_url(),
        log_file: None,
    }
}

fn default_upstream() -> ServerConfigUpstream {
    ServerConfigUpstream {
        plugins_config: None,
        base_url: None,
        cache_plugins_config: false,
        timeout_secs: default_timeout_secs(),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfigGeneral {
    #[serde(default = "default_name")]
    pub name: String,
    pub home_url: Option<String>,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Members, repositories and pull requests link here.
    #[serde(default = "default_github_url")]
    pub github_url: Url,
    /// Also write logs to this file.
    pub log_file: Option<PathBuf>,
}

/// Where owners are fetched from.
/// When `plugins_config` is set, endpoints are resolved through it and `base_url` is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfigUpstream {
    /// Path to the external plugin configuration (YAML).
    pub plugins_config: Option<PathBuf>,
    /// A single owners service serving every repository.
    pub base_url: Option<Url>,
    /// Only re-parse the plugin configuration when it changes on disk.
    #[serde(default)]
    pub cache_plugins_config: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_general")]
    pub general: ServerConfigGeneral,
    #[serde(default = "default_upstream")]
    pub upstream: ServerConfigUpstream,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            general: default_general(),
            upstream: default_upstream(),
        }
    }
}

impl ServerConfig {
    pub fn template_server_context(&self) -> TemplateServerContext {
        TemplateServerContext {
            name: self.general.name.to_string(),
            about: env!("CARGO_PKG_DESCRIPTION").to_string(),
            home_url: self.general.home_url.clone(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
