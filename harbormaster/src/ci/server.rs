//! Remote build server capability

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::HarborError;

/// A job as the build server describes it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteJob {
    pub name: String,
    pub url: String,
    /// Health colour, e.g. "blue", "red", "notbuilt"
    pub color: String,
    pub description: String,
    /// Jobs triggered by this one, summarised as the parent job reports them
    pub downstream: Vec<RemoteJob>,
}

/// A single build of a job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteBuild {
    pub number: i64,
    pub duration: i64,
    pub result: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub url: String,
}

impl RemoteBuild {
    pub fn is_good(&self) -> bool {
        self.result == "SUCCESS"
    }
}

/// Operations offered by a live build server connection
#[async_trait]
pub trait BuildServer: Send + Sync {
    async fn list_all_jobs(&self) -> Result<Vec<RemoteJob>, HarborError>;

    /// Fails with `NotFound` if the server has no such job
    async fn get_job(&self, name: &str) -> Result<RemoteJob, HarborError>;

    async fn last_build(&self, job: &RemoteJob) -> Result<RemoteBuild, HarborError>;

    /// Create a job named `name` from a job definition document
    async fn create_job(&self, definition: &str, name: &str) -> Result<(), HarborError>;
}

/// Establishes build server connections
#[async_trait]
pub trait BuildServerConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn BuildServer>, HarborError>;
}
