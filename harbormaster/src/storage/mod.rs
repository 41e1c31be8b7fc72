//! On-disk state

pub mod config;
pub mod layout;
