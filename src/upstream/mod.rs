//! Outbound clients.
//!
//! # Data Flow
//! ```text
//! handler
//!     → workflow.rs (WorkflowClient::fetch_api_data)
//!         → token.rs (TokenSelector: static token, else token service)
//!         → POST workflow run endpoint
//!         → WorkflowPayload (Decoded | Raw)
//! ```

pub mod token;
pub mod workflow;

pub use token::{TokenProvider, TokenSelector};
pub use workflow::{WorkflowClient, WorkflowMode, WorkflowPayload, WorkflowRequest};
