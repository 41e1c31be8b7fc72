//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use harbormaster::ci::server::{BuildServer, BuildServerConnector, RemoteBuild, RemoteJob};
use harbormaster::errors::HarborError;
use harbormaster::models::deployment::DeploymentJoin;
use harbormaster::models::environment::Environment;
use harbormaster::models::project::Project;
use harbormaster::models::template::JobTemplate;
use harbormaster::registry::{MemoryStorage, Registry};

/// Scriptable build server
#[derive(Default)]
pub struct FakeBuildServer {
    pub jobs: Mutex<Vec<RemoteJob>>,
    pub builds: Mutex<HashMap<String, RemoteBuild>>,
    pub created: Mutex<Vec<(String, String)>>,
    pub fail_list: AtomicBool,
    /// Answer list and create with 404, as a server behind the wrong base path does
    pub not_found: AtomicBool,
    pub reject_create: AtomicBool,
}

impl FakeBuildServer {
    pub fn with_jobs(jobs: Vec<RemoteJob>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }
}

pub fn job(name: &str, color: &str) -> RemoteJob {
    RemoteJob {
        name: name.to_string(),
        url: format!("http://ci.local/job/{}/", name),
        color: color.to_string(),
        description: format!("{} build", name),
        downstream: Vec::new(),
    }
}

#[async_trait]
impl BuildServer for FakeBuildServer {
    async fn list_all_jobs(&self) -> Result<Vec<RemoteJob>, HarborError> {
        if self.not_found.load(Ordering::SeqCst) {
            return Err(HarborError::NotFound("http://ci.local/api/json".to_string()));
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(HarborError::RemoteError("connection reset".to_string()));
        }
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn get_job(&self, name: &str) -> Result<RemoteJob, HarborError> {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.name == name)
            .cloned()
            .ok_or_else(|| HarborError::NotFound(format!("job '{}'", name)))
    }

    async fn last_build(&self, job: &RemoteJob) -> Result<RemoteBuild, HarborError> {
        self.builds
            .lock()
            .unwrap()
            .get(&job.name)
            .cloned()
            .ok_or_else(|| HarborError::NotFound(format!("last build of '{}'", job.name)))
    }

    async fn create_job(&self, definition: &str, name: &str) -> Result<(), HarborError> {
        if self.not_found.load(Ordering::SeqCst) {
            return Err(HarborError::NotFound(format!(
                "http://ci.local/createItem?name={}",
                name
            )));
        }
        if self.reject_create.load(Ordering::SeqCst) {
            return Err(HarborError::RemoteError(format!(
                "A job already exists with the name '{}'",
                name
            )));
        }
        self.created
            .lock()
            .unwrap()
            .push((name.to_string(), definition.to_string()));
        self.jobs.lock().unwrap().push(job(name, "notbuilt"));
        Ok(())
    }
}

/// Connector that fails a set number of times before handing out `server`
pub struct FlakyConnector {
    pub failures_left: AtomicUsize,
    pub attempts: AtomicUsize,
    pub server: Arc<FakeBuildServer>,
}

impl FlakyConnector {
    pub fn new(failures: usize, server: Arc<FakeBuildServer>) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
            server,
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildServerConnector for FlakyConnector {
    async fn connect(&self) -> Result<Arc<dyn BuildServer>, HarborError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(HarborError::RemoteError("connection refused".to_string()));
        }
        Ok(self.server.clone())
    }
}

pub fn project(id: u64, short_name: &str) -> Project {
    Project {
        id,
        name: format!("Project {}", short_name),
        short_name: short_name.to_string(),
        description: format!("{} service", short_name),
        email: "team@example.com".to_string(),
        contact_name: "Team".to_string(),
        github_url: format!("https://github.com/example/{}", short_name),
        build_template: JobTemplate {
            name: "basic".to_string(),
            description: String::new(),
            content: "<project><description>{{ description }}</description><scm>{{ githubUrl }}</scm><name>{{shortName}}</name></project>".to_string(),
        },
    }
}

pub fn environment(id: u64, name: &str, hostname: &str) -> Environment {
    Environment {
        id,
        name: name.to_string(),
        hostname: hostname.to_string(),
        starting_port: 8000,
        ..Default::default()
    }
}

/// Two projects deployed to "Prod", one to "Dev", plus a dangling join
pub fn fixture_storage() -> MemoryStorage {
    MemoryStorage::new(
        vec![project(1, "billing"), project(2, "catalog")],
        vec![
            environment(1, "Dev", "dev.local"),
            environment(2, "Prod", "prod.local"),
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
                port: Some(8002),
                location: None,
            },
            DeploymentJoin {
                project_id: 9,
                environment_id: 2,
                port: Some(8009),
                location: None,
            },
            DeploymentJoin {
                project_id: 2,
                environment_id: 1,
                port: Some(8002),
                location: None,
            },
        ],
    )
}

pub async fn fixture_registry() -> Arc<Registry> {
    Arc::new(Registry::open(Arc::new(fixture_storage())).await)
}
