pub mod config;
pub mod engine;
pub mod source;

pub use config::EngineConfig;
pub use engine::{CostEngine, CostReport, EngineResponse};
pub use source::CostSource;
