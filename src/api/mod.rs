//! HTTP API layer

pub mod admin;
pub mod auth;
pub mod health;
pub mod images;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
