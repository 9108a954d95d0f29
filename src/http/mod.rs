//! HTTP surface used by the chat transport and rendering adapters

pub mod middleware;
pub mod routes;

pub use routes::build_router;
