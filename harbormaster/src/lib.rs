//! Harbormaster library
//!
//! Registry of projects, environments and deployments, plus a proxy to the
//! Jenkins build server that tolerates the server being unreachable.

pub mod app;
pub mod ci;
pub mod containers;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod models;
pub mod registry;
pub mod server;
pub mod storage;
pub mod templates;
pub mod utils;
pub mod workers;
