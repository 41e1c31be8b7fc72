//! Registry models

pub mod deployment;
pub mod environment;
pub mod project;
pub mod template;
