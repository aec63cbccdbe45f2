//! HTTP trigger surface and pipeline orchestration.

pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod routes;
pub mod singleflight;
pub mod state;
pub mod trigger;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use pipeline::{processed_name, Pipeline};
pub use routes::create_router;
pub use state::AppState;
pub use trigger::{decode_trigger, FileArrivalEvent, PubSubEnvelope};
