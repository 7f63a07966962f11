//! Axum-based HTTP surface for the monitored RAG service.
//!
//! Handlers only marshal JSON to and from [`crate::pipeline::RagService`];
//! pipeline failures come back as `200` with `success: false`, and only
//! malformed requests get a 4xx status.
//!
//! # Components
//!
//! - `handlers`: query, batch, stats, clear, health and Prometheus endpoints.
//! - `middleware`: request ID layers and per-route request metrics.
//! - `routes`: the router that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use routes::{create_router, AppState};
