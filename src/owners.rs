/// Deals with loading the owners of pull requests.
/// To get the owners of a pull request, you go through these steps:
/// OwnersSourceFactory -> OwnersSource -> OwnersData
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::OwnersError;

/* -------------------------------------------------------------------------- */
/*                                 Data Model                                 */
/* -------------------------------------------------------------------------- */

/// Who may approve a pull request, and how many approvals it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnersData {
    #[serde(rename = "needsLGTM")]
    pub needs_lgtm: i64,
    #[serde(default)]
    pub committers: Vec<String>,
    #[serde(default)]
    pub reviewers: Vec<String>,
}

/// Body returned by the owners service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnersResponse {
    pub data: OwnersData,
    #[serde(default)]
    pub message: String,
}

/// Identifies a single pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRef {
    pub org: String,
    pub repo: String,
    pub number: u64,
}

impl PullRef {
    pub fn new(org: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            number,
        }
    }

    /// `org/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}

impl Display for PullRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.repo, self.number)
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Sources                                  */
/* -------------------------------------------------------------------------- */

/// You can find the owners of a pull request in an Owners Source.
pub trait OwnersSource {
    /// Loads the owners of a pull request.
    /// Each call does all of its lookups again; nothing is remembered between calls.
    fn owners_of(
        &self,
        pull: &PullRef,
    ) -> impl Future<Output = Result<OwnersData, OwnersError>>;
}

/// Offers an impl-agnostic way of creating Owners Sources.
/// The server builds one source per worker.
pub trait OwnersSourceFactory: Clone {
    type Source: OwnersSource;

    fn build(&self) -> Self::Source;
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_response_from_json() {
        let body = r#"{
            "data": {"needsLGTM": 2, "committers": ["a"], "reviewers": ["b", "c"]},
            "message": "OK"
        }"#;
        let response: OwnersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.needs_lgtm, 2);
        assert_eq!(response.data.committers, vec!["a"]);
        assert_eq!(response.data.reviewers, vec!["b", "c"]);
        assert_eq!(response.message, "OK");
    }

    #[test]
    fn owners_response_missing_lists() {
        let response: OwnersResponse =
            serde_json::from_str(r#"{"data": {"needsLGTM": 1}}"#).unwrap();
        assert!(response.data.committers.is_empty());
        assert!(response.data.reviewers.is_empty());
        assert!(response.message.is_empty());
    }

    #[test]
    fn owners_response_requires_needs_lgtm() {
        let r = serde_json::from_str::<OwnersResponse>(r#"{"data": {"committers": []}}"#);
        assert!(r.is_err());
    }

    #[test]
    fn pull_ref_display() {
        let pull = PullRef::new("acme", "widgets", 42);
        assert_eq!(pull.to_string(), "acme/widgets#42");
        assert_eq!(pull.full_name(), "acme/widgets");
    }
}
