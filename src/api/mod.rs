//! API Module
//!
//! HTTP handlers and routing for the demo cache server.
//!
//! # Endpoints
//! - `PUT /set` - Write a key-value pair
//! - `GET /get/:key` - Read a value by key
//! - `DELETE /del/:key` - Remove a key from the cache and the data source
//! - `POST /clear` - Empty the cache
//! - `GET /stats` - Cache statistics and configured policies
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
