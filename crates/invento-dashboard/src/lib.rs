//! # invento-dashboard
//!
//! Web UI for Invento, served by axum:
//! - inventory table with admin-only add and delete
//! - restock requests, filed by any user and approved or rejected by admins
//! - recent activity log for admins
//!
//! ## Tech Stack
//!
//! - Axum for HTTP, `tower-http` for request tracing
//! - Sessions in HMAC-signed cookies, CSRF tokens on every form
//! - Server-rendered HTML; the stylesheet is bundled via `rust-embed`

pub mod assets;
pub mod auth;
pub mod csrf;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

pub use error::DashboardError;
pub use routes::create_router;
pub use server::DashboardServer;
pub use session::{SessionCodec, SessionData};
pub use state::AppState;
