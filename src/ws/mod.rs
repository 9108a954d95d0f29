//! Snapshot streaming for rendering adapters

pub mod handler;
pub mod protocol;
