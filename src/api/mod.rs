//! HTTP surface: one `GET` route per scenario plus image generation.
pub mod handlers;
pub mod routes;

pub use routes::{router, AppState};
