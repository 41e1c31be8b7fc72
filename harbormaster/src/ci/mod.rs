//! Build server (Jenkins) integration

pub mod jenkins;
pub mod models;
pub mod proxy;
pub mod server;

pub use proxy::{BuildServerProxy, CiProxy, DisconnectedProxy, LiveProxy};
pub use server::{BuildServer, BuildServerConnector};
