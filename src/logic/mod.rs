pub mod alerts;
pub mod data_sync;
pub mod engine;
pub mod evapotranspiration;
pub mod phenology;
pub mod recommendation;
pub mod soil_moisture;
pub mod water_balance;

pub use data_sync::DataSyncService;
pub use engine::{EngineConfig, EvaluationReport, IrrigationEngine};
