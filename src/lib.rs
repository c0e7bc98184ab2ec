//! Workflow gateway library.
//!
//! Fronts a workflow-execution API with three REST-style endpoints
//! (search, detail, view), handles CORS, and forwards everything else to a
//! static asset origin.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
