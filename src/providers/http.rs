use std::{sync::Arc, time::Duration};

use log::{error, info, warn};
use url::Url;

use crate::{
    conf::ServerConfig,
    error::OwnersError,
    owners::{OwnersData, OwnersResponse, OwnersSource, OwnersSourceFactory, PullRef},
    plugins::PluginConfigSource,
    resolver::{OwnersPathLayout, owners_url, resolve_owners_url},
};

/// How the owners service of a repository is found.
#[derive(Clone, Debug)]
pub enum OwnersRouting {
    /// Resolve the endpoint through the external plugin configuration.
    Plugins(Arc<PluginConfigSource>),
    /// One owners service for every repository.
    Static(Url),
}

impl OwnersRouting {
    /// Works out the owners URL of a pull request.
    pub async fn owners_url(&self, pull: &PullRef) -> Result<Url, OwnersError> {
        match self {
            Self::Plugins(source) => {
                let config = source.current().await?;
                resolve_owners_url(&config, pull)
            }
            Self::Static(base) => owners_url(base.as_str(), pull, OwnersPathLayout::Direct),
        }
    }
}

/// Fetches owners from the owners service over HTTP.
pub struct HttpOwnersProvider {
    client: reqwest::Client,
    routing: OwnersRouting,
}

impl HttpOwnersProvider {
    pub fn new(client: reqwest::Client, routing: OwnersRouting) -> Self {
        Self { client, routing }
    }

    async fn fetch(&self, url: Url) -> Result<OwnersData, OwnersError> {
        let shown = url.to_string();
        let fetch_failed = |source| OwnersError::UpstreamFetchFailed {
            url: shown.clone(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_failed)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Owners service at {} responded with {}", shown, status);
            return Err(OwnersError::UpstreamStatus {
                url: shown.clone(),
                status: status.as_u16(),
            });
        }

        let body: OwnersResponse = response.json().await.map_err(fetch_failed)?;
        Ok(body.data)
    }
}

impl OwnersSource for HttpOwnersProvider {
    async fn owners_of(&self, pull: &PullRef) -> Result<OwnersData, OwnersError> {
        let url = self.routing.owners_url(pull).await?;
        info!("Fetching owners of {} from {}", pull, url);
        self.fetch(url).await
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Factory                                  */
/* -------------------------------------------------------------------------- */

#[derive(Clone)]
pub struct HttpOwnersProviderFactory {
    client: reqwest::Client,
    routing: OwnersRouting,
}

impl HttpOwnersProviderFactory {
    pub fn new(routing: OwnersRouting, timeout: Duration) -> Result<Self, OwnersError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                error!("Failed to create the owners HTTP client: {}", e);
                OwnersError::HttpClient(e)
            })?;

        Ok(Self { client, routing })
    }

    /// Picks the routing from the server configuration.
    /// The plugin configuration wins over a static base URL.
    pub fn from_config(config: &ServerConfig) -> Result<Self, OwnersError> {
        let upstream = &config.upstream;
        let routing = match (&upstream.plugins_config, &upstream.base_url) {
            (Some(path), _) => {
                info!(
                    "Resolving owners endpoints through {:?} (cached: {})",
                    path, upstream.cache_plugins_config
                );
                OwnersRouting::Plugins(Arc::new(PluginConfigSource::new(
                    path.clone(),
                    upstream.cache_plugins_config,
                )))
            }
            (None, Some(url)) => {
                info!("Fetching every repository's owners from {}", url);
                OwnersRouting::Static(url.clone())
            }
            (None, None) => {
                error!("Neither a plugin configuration nor a base URL is set for owners");
                return Err(OwnersError::MissingUpstream);
            }
        };

        Self::new(routing, Duration::from_secs(upstream.timeout_secs))
    }

    pub fn routing(&self) -> &OwnersRouting {
        &self.routing
    }
}

impl OwnersSourceFactory for HttpOwnersProviderFactory {
    type Source = HttpOwnersProvider;

    fn build(&self) -> Self::Source {
        HttpOwnersProvider::new(self.client.clone(), self.routing.clone())
    }
}
