//! Docker container listing via the docker CLI

use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::HarborError;

/// A running or stopped container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub command: String,
    /// Unix seconds
    pub created: i64,
    pub id: String,
    pub image: String,
    pub name: String,
    pub ports: Vec<Port>,
    pub labels: Vec<Label>,
    pub root_fs_size: i64,
    pub size_rw: i64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub private: u16,
    pub public: u16,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "IP")]
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

/// Source of container information
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn list_containers(&self) -> Result<Vec<Container>, HarborError>;
}

/// One line of `docker ps --format '{{json .}}'`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsLine {
    #[serde(default)]
    command: String,
    #[serde(default)]
    created_at: String,
    #[serde(rename = "ID")]
    id: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    labels: String,
    #[serde(default)]
    names: String,
    #[serde(default)]
    ports: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    status: String,
}

impl From<PsLine> for Container {
    fn from(line: PsLine) -> Self {
        let (size_rw, root_fs_size) = parse_sizes(&line.size);
        Self {
            command: line.command.trim_matches('"').to_string(),
            created: parse_created(&line.created_at),
            id: line.id,
            image: line.image,
            name: line.names.split(',').next().unwrap_or_default().to_string(),
            ports: parse_ports(&line.ports),
            labels: parse_labels(&line.labels),
            root_fs_size,
            size_rw,
            status: line.status,
        }
    }
}

/// Lists containers by shelling out to `docker`
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn list_containers(&self) -> Result<Vec<Container>, HarborError> {
        debug!("Listing docker containers");
        let output = Command::new(&self.binary)
            .args(["ps", "--all", "--size", "--no-trunc", "--format", "{{json .}}"])
            .output()
            .await
            .map_err(|e| HarborError::ContainerError(format!("Failed to run docker ps: {}", e)))?;

        if !output.status.success() {
            return Err(HarborError::ContainerError(format!(
                "docker ps failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(parse_ps_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_ps_output(stdout: &str) -> Vec<Container> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<PsLine>(line) {
            Ok(ps) => Some(Container::from(ps)),
            Err(e) => {
                warn!("Skipping unparseable docker ps line: {}", e);
                None
            }
        })
        .collect()
}

/// `2024-03-01 10:15:00 +0000 UTC` to unix seconds, zero if unparseable
fn parse_created(created_at: &str) -> i64 {
    let trimmed: String = created_at.split(' ').take(3).collect::<Vec<_>>().join(" ");
    DateTime::parse_from_str(&trimmed, "%Y-%m-%d %H:%M:%S %z")
        .map(|t| t.timestamp())
        .unwrap_or_default()
}

/// `0.0.0.0:8080->80/tcp, 443/tcp`
fn parse_ports(ports: &str) -> Vec<Port> {
    ports
        .split(", ")
        .filter(|p| !p.is_empty())
        .filter_map(|entry| {
            let (host, container) = match entry.split_once("->") {
                Some((host, container)) => (Some(host), container),
                None => (None, entry),
            };
            let (private, kind) = container.split_once('/')?;
            let private = private.parse().ok()?;

            let (ip, public) = match host.and_then(|h| h.rsplit_once(':')) {
                Some((ip, public)) => (ip.to_string(), public.parse().ok()?),
                None => (String::new(), 0),
            };

            Some(Port {
                private,
                public,
                kind: kind.to_string(),
                ip,
            })
        })
        .collect()
}

/// `com.example.team=a,version=2`
fn parse_labels(labels: &str) -> Vec<Label> {
    labels
        .split(',')
        .filter(|l| !l.is_empty())
        .map(|label| match label.split_once('=') {
            Some((name, value)) => Label {
                name: name.to_string(),
                value: value.to_string(),
            },
            None => Label {
                name: label.to_string(),
                value: String::new(),
            },
        })
        .collect()
}

/// `2B (virtual 1.5GB)` to (writable bytes, root filesystem bytes)
fn parse_sizes(size: &str) -> (i64, i64) {
    let (rw, virtual_size) = match size.split_once(" (virtual ") {
        Some((rw, rest)) => (rw, rest.trim_end_matches(')')),
        None => (size, ""),
    };
    (parse_human_size(rw), parse_human_size(virtual_size))
}

fn parse_human_size(size: &str) -> i64 {
    let size = size.trim();
    let split = size
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(size.len());
    let (number, unit) = size.split_at(split);
    let Ok(number) = number.trim().parse::<f64>() else {
        return 0;
    };
    let multiplier = match unit.trim() {
        "" | "B" => 1.0,
        "kB" | "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        _ => return 0,
    };
    (number * multiplier) as i64
}
