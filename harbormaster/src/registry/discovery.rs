//! Service discovery by environment

use std::collections::BTreeMap;

use crate::errors::HarborError;
use crate::registry::store::Registry;

impl Registry {
    /// Map each project deployed to the named environment to its location.
    ///
    /// The environment name is matched case-insensitively. An environment with
    /// no deployments yields an empty map.
    pub fn discover(&self, environment_name: &str) -> Result<BTreeMap<String, String>, HarborError> {
        let state = self.snapshot();
        let environment = state.environment_by_name(environment_name)?;

        Ok(state
            .deployments
            .iter()
            .filter(|d| d.environment.id == environment.id)
            .map(|d| (d.project.short_name.clone(), d.location.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::deployment::DeploymentJoin;
    use crate::models::environment::Environment;
    use crate::models::project::Project;
    use crate::registry::storage::MemoryStorage;

    fn project(id: u64, short_name: &str) -> Project {
        Project {
            id,
            name: short_name.to_string(),
            short_name: short_name.to_string(),
            ..Default::default()
        }
    }

    fn environment(id: u64, name: &str, hostname: &str) -> Environment {
        Environment {
            id,
            name: name.to_string(),
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }

    async fn registry() -> Registry {
        let storage = MemoryStorage::new(
            vec![project(1, "p1"), project(2, "p2"), project(3, "p3")],
            vec![
                environment(1, "Dev", "dev-host"),
                environment(2, "Prod", "prod-host"),
                environment(3, "Empty", "empty-host"),
            ],
            vec![],
            vec![
                DeploymentJoin {
                    project_id: 1,
                    environment_id: 2,
                    port: Some(8001),
                    location: None,
                },
                DeploymentJoin {
                    project_id: 2,
                    environment_id: 2,
                    port: None,
                    location: Some("10.1.1.1:443".to_string()),
                },
                DeploymentJoin {
                    project_id: 3,
                    environment_id: 1,
                    port: Some(8003),
                    location: None,
                },
            ],
        );
        Registry::open(Arc::new(storage)).await
    }

    #[tokio::test]
    async fn test_discover_environment() {
        let registry = registry().await;

        let found = registry.discover("prod").unwrap();

        let expected: BTreeMap<String, String> = [
            ("p1".to_string(), "prod-host:8001".to_string()),
            ("p2".to_string(), "10.1.1.1:443".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn test_discover_empty_environment() {
        let registry = registry().await;
        assert!(registry.discover("EMPTY").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_unknown_environment() {
        let registry = registry().await;
        assert!(matches!(
            registry.discover("qa"),
            Err(HarborError::NotFound(_))
        ));
    }
}
