//! Jenkins REST client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use crate::ci::server::{BuildServer, BuildServerConnector, RemoteBuild, RemoteJob};
use crate::errors::HarborError;

/// Jenkins credentials and location
#[derive(Debug, Clone)]
pub struct JenkinsOptions {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for JenkinsOptions {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            username: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<JobSummary>,
}

#[derive(Debug, Deserialize)]
struct JobSummary {
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobInfo {
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    downstream_projects: Vec<JobSummary>,
}

#[derive(Debug, Deserialize)]
struct BuildInfo {
    number: i64,
    #[serde(default)]
    duration: i64,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Crumb {
    crumb: String,
    crumb_request_field: String,
}

impl From<JobSummary> for RemoteJob {
    fn from(job: JobSummary) -> Self {
        Self {
            name: job.name,
            url: job.url,
            color: job.color.unwrap_or_default(),
            description: String::new(),
            downstream: Vec::new(),
        }
    }
}

impl From<JobInfo> for RemoteJob {
    fn from(job: JobInfo) -> Self {
        Self {
            name: job.name,
            url: job.url,
            color: job.color.unwrap_or_default(),
            description: job.description.unwrap_or_default(),
            downstream: job
                .downstream_projects
                .into_iter()
                .map(RemoteJob::from)
                .collect(),
        }
    }
}

impl From<BuildInfo> for RemoteBuild {
    fn from(build: BuildInfo) -> Self {
        Self {
            number: build.number,
            duration: build.duration,
            result: build.result.unwrap_or_default(),
            timestamp: DateTime::<Utc>::from_timestamp_millis(build.timestamp),
            url: build.url,
        }
    }
}

/// HTTP client for a single Jenkins instance
pub struct JenkinsClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl JenkinsClient {
    /// Create a client without contacting the server
    pub fn new(options: &JenkinsOptions) -> Result<Self, HarborError> {
        let client = Client::builder().timeout(options.timeout).build()?;

        let mut base = options.url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|e| {
            HarborError::ConfigError(format!("invalid Jenkins URL '{}': {}", options.url, e))
        })?;

        Ok(Self {
            client,
            base_url,
            username: options.username.clone(),
            password: options.password.clone(),
        })
    }

    /// Base URL plus percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Result<Url, HarborError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HarborError::ConfigError(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn job_url(&self, name: &str, rest: &[&str]) -> Result<Url, HarborError> {
        let mut segments = vec!["job", name];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.username.is_empty() {
            request
        } else {
            request.basic_auth(&self.username, Some(&self.password))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, HarborError> {
        debug!("GET {}", url);
        let response = self.authorized(self.client.get(url.clone())).send().await?;
        let response = check_status("GET", &url, response).await?;
        Ok(response.json().await?)
    }

    /// Verify the server is reachable and the credentials are accepted
    pub async fn ping(&self) -> Result<(), HarborError> {
        let _: serde_json::Value = self.get_json(self.url(&["api", "json"])?).await?;
        Ok(())
    }

    /// CSRF crumb, if the server issues one
    async fn crumb(&self) -> Option<Crumb> {
        let url = self.url(&["crumbIssuer", "api", "json"]).ok()?;
        match self.get_json::<Crumb>(url).await {
            Ok(crumb) => Some(crumb),
            Err(e) => {
                debug!("No CSRF crumb issued: {}", e);
                None
            }
        }
    }
}

async fn check_status(method: &str, url: &Url, response: Response) -> Result<Response, HarborError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let jenkins_error = response
        .headers()
        .get("X-Error")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::NOT_FOUND {
        return Err(HarborError::NotFound(url.to_string()));
    }

    error!("Jenkins {} {} failed: {}", method, url, status);
    let detail = jenkins_error.unwrap_or(body);
    Err(HarborError::RemoteError(format!("{} {}: {} {}", method, url, status, detail.trim())))
}

#[async_trait]
impl BuildServer for JenkinsClient {
    async fn list_all_jobs(&self) -> Result<Vec<RemoteJob>, HarborError> {
        let mut url = self.url(&["api", "json"])?;
        url.query_pairs_mut().append_pair("tree", "jobs[name,url,color]");

        let list: JobList = self.get_json(url).await?;
        Ok(list.jobs.into_iter().map(RemoteJob::from).collect())
    }

    async fn get_job(&self, name: &str) -> Result<RemoteJob, HarborError> {
        let url = self.job_url(name, &["api", "json"])?;
        let info: JobInfo = self.get_json(url).await.map_err(|e| match e {
            HarborError::NotFound(_) => HarborError::NotFound(format!("job '{}'", name)),
            other => other,
        })?;
        Ok(info.into())
    }

    async fn last_build(&self, job: &RemoteJob) -> Result<RemoteBuild, HarborError> {
        let url = self.job_url(&job.name, &["lastBuild", "api", "json"])?;
        let build: BuildInfo = self.get_json(url).await?;
        Ok(build.into())
    }

    async fn create_job(&self, definition: &str, name: &str) -> Result<(), HarborError> {
        let mut url = self.url(&["createItem"])?;
        url.query_pairs_mut().append_pair("name", name);
        debug!("POST {}", url);

        let mut request = self
            .authorized(self.client.post(url.clone()))
            .header(header::CONTENT_TYPE, "application/xml")
            .body(definition.to_string());
        if let Some(crumb) = self.crumb().await {
            request = request.header(crumb.crumb_request_field, crumb.crumb);
        }

        let response = request.send().await?;
        check_status("POST", &url, response).await?;
        info!("Created Jenkins job '{}'", name);
        Ok(())
    }
}

/// Connects to Jenkins with fixed credentials
pub struct JenkinsConnector {
    options: JenkinsOptions,
}

impl JenkinsConnector {
    pub fn new(options: JenkinsOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl BuildServerConnector for JenkinsConnector {
    async fn connect(&self) -> Result<Arc<dyn BuildServer>, HarborError> {
        info!("Connecting to Jenkins instance: {}", self.options.url);
        let client = JenkinsClient::new(&self.options)?;
        client.ping().await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> JenkinsClient {
        JenkinsClient::new(&JenkinsOptions {
            url: url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_job_url_is_encoded() {
        let client = client("https://ci.example.com/jenkins");
        let url = client.job_url("my job", &["api", "json"]).unwrap();
        assert_eq!(url.as_str(), "https://ci.example.com/jenkins/job/my%20job/api/json");
    }

    #[test]
    fn test_invalid_url() {
        let result = JenkinsClient::new(&JenkinsOptions {
            url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(HarborError::ConfigError(_))));
    }

    #[test]
    fn test_job_info_json() {
        let info: JobInfo = serde_json::from_str(
            r#"{
                "name": "svc-a",
                "url": "http://ci/job/svc-a/",
                "color": "red",
                "description": null,
                "downstreamProjects": [
                    {"name": "svc-a-deploy", "url": "http://ci/job/svc-a-deploy/", "color": "blue"},
                    {"name": "svc-a-smoke", "url": "http://ci/job/svc-a-smoke/", "color": "disabled"}
                ]
            }"#,
        )
        .unwrap();
        let job = RemoteJob::from(info);
        assert_eq!(job.color, "red");
        assert_eq!(job.description, "");

        let names: Vec<_> = job.downstream.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["svc-a-deploy", "svc-a-smoke"]);
        assert_eq!(job.downstream[0].color, "blue");
        assert_eq!(job.downstream[1].url, "http://ci/job/svc-a-smoke/");
    }

    #[test]
    fn test_build_info_json() {
        let info: BuildInfo = serde_json::from_str(
            r#"{"number": 7, "duration": 1500, "result": null, "timestamp": 1700000000000, "url": "http://ci/job/a/7/"}"#,
        )
        .unwrap();
        let build = RemoteBuild::from(info);
        assert_eq!(build.number, 7);
        assert_eq!(build.result, "");
        assert_eq!(build.timestamp.unwrap().timestamp(), 1_700_000_000);
    }
}
