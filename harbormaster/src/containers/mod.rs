//! Container engine queries

pub mod docker;

pub use docker::{Container, ContainerEngine, DockerCli};
