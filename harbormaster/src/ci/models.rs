//! Build job views returned to API clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ci::server::{RemoteBuild, RemoteJob};

/// Health colour Jenkins reports for a job whose last build passed
pub const HEALTHY_COLOR: &str = "blue";

pub fn is_healthy(color: &str) -> bool {
    color == HEALTHY_COLOR
}

/// Summary of a build job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTask {
    pub name: String,
    pub url: String,
    pub is_good: bool,
}

impl From<&RemoteJob> for BuildTask {
    fn from(job: &RemoteJob) -> Self {
        Self {
            name: job.name.clone(),
            url: job.url.clone(),
            is_good: is_healthy(&job.color),
        }
    }
}

/// Outcome of a job's most recent build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub build_number: i64,

    /// Milliseconds
    pub duration: i64,

    pub result: String,

    pub timestamp: Option<DateTime<Utc>>,

    pub url: String,

    pub is_good: bool,
}

impl From<RemoteBuild> for Build {
    fn from(build: RemoteBuild) -> Self {
        Self {
            build_number: build.number,
            duration: build.duration,
            is_good: build.is_good(),
            result: build.result,
            timestamp: build.timestamp,
            url: build.url,
        }
    }
}

/// Job detail with its last build and downstream jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub name: String,
    pub url: String,
    pub description: String,
    pub last_build: Build,
    #[serde(rename = "downstreamBuilds")]
    pub downstream: Vec<BuildTask>,
}
