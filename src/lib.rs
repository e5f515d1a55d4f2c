//! HarvestGuard: regional food security tracking and the fire disaster response
//! pipeline.
//!
//! - [`pipeline::FireDisasterService`] runs a fire scenario end to end
//! - [`repository`] holds the persistence port and its memory/Postgres stores
//! - [`services`] holds the weather and routing ports and their HTTP adapters

pub mod config;
pub mod error;
pub mod geo;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{PipelineError, RepositoryError, Result, ServiceError};
pub use pipeline::{FireDisasterService, PipelineStage};
