use std::collections::HashMap;

use crate::{
    error::OwnersError,
    owners::{OwnersData, OwnersSource, OwnersSourceFactory, PullRef},
};

/* -------------------------------------------------------------------------- */
/*                       Owners Provider Implementation                       */
/* -------------------------------------------------------------------------- */

/// Serves owners kept in memory. Useful for tests and demos.
#[derive(Clone, Default)]
pub struct MemoryOwnersProvider {
    owners: HashMap<PullRef, OwnersData>,
}

impl OwnersSource for MemoryOwnersProvider {
    async fn owners_of(&self, pull: &PullRef) -> Result<OwnersData, OwnersError> {
        match self.owners.get(pull) {
            Some(v) => Ok(v.clone()),
            None => Err(OwnersError::PullNotFound(pull.to_string())),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryOwnersProviderFactory {
    provider: MemoryOwnersProvider,
}

impl MemoryOwnersProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owners(mut self, org: &str, repo: &str, number: u64, owners: OwnersData) -> Self {
        self.provider
            .owners
            .insert(PullRef::new(org, repo, number), owners);
        self
    }
}

impl OwnersSourceFactory for MemoryOwnersProviderFactory {
    type Source = MemoryOwnersProvider;

    fn build(&self) -> Self::Source {
        self.provider.clone()
    }
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */

pub mod testing {
    use super::*;

    pub const ORG_1: &str = "acme";
    pub const REPO_1: &str = "widgets";
    pub const PULL_1: u64 = 1;

    pub const ORG_2: &str = "other";
    pub const REPO_2: &str = "gadgets";
    pub const PULL_2: u64 = 2;

    pub fn example_owners() -> OwnersData {
        OwnersData {
            needs_lgtm: 2,
            committers: vec!["a".to_string()],
            reviewers: vec!["b".to_string(), "c".to_string()],
        }
    }

    pub fn create_example_provider_factory() -> MemoryOwnersProviderFactory {
        MemoryOwnersProviderFactory::new()
            .with_owners(ORG_1, REPO_1, PULL_1, example_owners())
            .with_owners(
                ORG_2,
                REPO_2,
                PULL_2,
                OwnersData {
                    needs_lgtm: 1,
                    committers: vec![],
                    reviewers: vec!["d".to_string()],
                },
            )
    }

    pub fn create_example_provider() -> MemoryOwnersProvider {
        create_example_provider_factory().build()
    }

    /// Ensure that the Memory Provider can create itself from a factory,
    /// then read owners back correctly.
    #[tokio::test]
    #[cfg(test)]
    async fn factory_read() {
        let p = create_example_provider();

        let owners = p
            .owners_of(&PullRef::new(ORG_1, REPO_1, PULL_1))
            .await
            .unwrap();
        assert_eq!(owners, example_owners());

        let owners = p
            .owners_of(&PullRef::new(ORG_2, REPO_2, PULL_2))
            .await
            .unwrap();
        assert_eq!(owners.reviewers, vec!["d"]);

        // Validate incorrect pull accessing
        assert!(matches!(
            p.owners_of(&PullRef::new(ORG_1, REPO_1, PULL_2)).await,
            Err(OwnersError::PullNotFound(_))
        ));
        assert!(p.owners_of(&PullRef::new(ORG_2, REPO_1, PULL_1)).await.is_err());
    }
}
