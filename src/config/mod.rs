// src/config/mod.rs
pub mod app;
pub mod pipeline;

pub use app::AppConfig;
pub use pipeline::PipelineSettings;
