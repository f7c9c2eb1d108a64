//! HTTP API handlers for pscan-ca

pub mod assessment;
pub mod cry_analysis;
pub mod health;

pub use assessment::assessment_routes;
pub use cry_analysis::cry_analysis_routes;
pub use health::health_routes;
