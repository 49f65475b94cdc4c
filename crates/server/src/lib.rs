//! Grievance Server - HTTP API for complaint submission with duplicate
//! detection
//!
//! Every submission is embedded and compared against stored complaints.
//! A submission that matches an existing complaint is rejected with an
//! explanation; anything else is registered under a `GRV-{year}-{nnnnn}`
//! reference id.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /api/v1/metadata` - Model and threshold in use
//! - `POST /api/v1/complaints/submit` - Submit a complaint
//!   (`201` registered, `200` duplicate, `503` embedding provider down)
//! - `GET /api/v1/complaints/track/{reference_id}` - Look up a complaint

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
pub use store::{ComplaintStore, DuplicateLink, InMemoryStore, StoredComplaint};
