//! Rebuilds deployments from persisted join records

use tracing::warn;

use crate::models::deployment::{Deployment, DeploymentJoin};
use crate::models::environment::Environment;
use crate::models::project::Project;

/// Resolve join records against the loaded projects and environments.
///
/// Records referencing a missing project or environment are skipped with a
/// warning. Output order follows the input order.
pub fn reconcile(
    joins: &[DeploymentJoin],
    projects: &[Project],
    environments: &[Environment],
) -> Vec<Deployment> {
    let mut deployments = Vec::with_capacity(joins.len());

    for join in joins {
        let Some(project) = projects.iter().find(|p| p.id == join.project_id) else {
            warn!(
                "Project id {} not found, skipping deployment to environment {}",
                join.project_id, join.environment_id
            );
            continue;
        };
        let Some(environment) = environments.iter().find(|e| e.id == join.environment_id) else {
            warn!(
                "Environment id {} not found, skipping deployment of project {}",
                join.environment_id, join.project_id
            );
            continue;
        };
        deployments.push(Deployment::resolve(
            join,
            project.clone(),
            environment.clone(),
        ));
    }

    deployments
}
