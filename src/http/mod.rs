//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → cors.rs (OPTIONS answered here on every path)
//!     → API path?
//!         yes → handlers.rs
//!               → params.rs (query, then JSON body, then form body)
//!               → upstream::WorkflowClient
//!               → JSON response + Access-Control-Allow-Origin
//!         no  → passthrough.rs (static origin, unchanged)
//! ```

pub mod cors;
pub mod handlers;
pub mod params;
pub mod passthrough;
pub mod request;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
