//! Project, environment and deployment registry

pub mod discovery;
pub mod reconcile;
pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, RegistryStorage};
pub use store::Registry;
