//! Sensorlink HTTP server library.
//!
//! Exposes the building blocks (config, state, routes, router) so
//! integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
