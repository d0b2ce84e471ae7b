use log::debug;
use url::Url;

use crate::{error::OwnersError, owners::PullRef, plugins::ExternalPluginConfig};

/// How the owners path is laid out below a base URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnersPathLayout {
    /// `{base}/repos/{org}/{repo}/pulls/{num}/owners`, used by endpoints from the plugin configuration.
    Repos,
    /// `{base}/{org}/{repo}/pulls/{num}/owners`, used by a single static base URL.
    Direct,
}

/// Finds the owners endpoint of `org/repo`.
///
/// Every entry is checked, in order, and a later match replaces an earlier one.
/// A pattern matches when it is exactly `org` or exactly `org/repo`.
/// A matching entry without an endpoint replaces the candidate with nothing.
pub fn resolve<'a>(config: &'a ExternalPluginConfig, org: &str, repo: &str) -> Option<&'a str> {
    let full_name = format!("{org}/{repo}");
    let mut endpoint = None;

    for entry in &config.lgtm {
        for pattern in &entry.repos {
            if pattern == org || *pattern == full_name {
                endpoint = entry.endpoint();
            }
        }
    }

    endpoint
}

/// Builds the owners URL of a pull request below `base`.
pub fn owners_url(base: &str, pull: &PullRef, layout: OwnersPathLayout) -> Result<Url, OwnersError> {
    let invalid = |reason: String| OwnersError::InvalidEndpoint {
        endpoint: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    let number = pull.number.to_string();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?;
        segments.pop_if_empty();
        if layout == OwnersPathLayout::Repos {
            segments.push("repos");
        }
        segments.extend([
            pull.org.as_str(),
            pull.repo.as_str(),
            "pulls",
            number.as_str(),
            "owners",
        ]);
    }
    Ok(url)
}

/// Resolves the owners URL of a pull request through the plugin configuration.
pub fn resolve_owners_url(config: &ExternalPluginConfig, pull: &PullRef) -> Result<Url, OwnersError> {
    let endpoint =
        resolve(config, &pull.org, &pull.repo).ok_or_else(|| OwnersError::EndpointNotFound {
            org: pull.org.clone(),
            repo: pull.repo.clone(),
        })?;
    debug!("Owners endpoint of {} is {}", pull.full_name(), endpoint);
    owners_url(endpoint, pull, OwnersPathLayout::Repos)
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
