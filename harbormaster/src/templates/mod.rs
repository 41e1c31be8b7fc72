//! Build job template rendering

pub mod render;

pub use render::render;
