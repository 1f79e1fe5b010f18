//! Infrastructure layer for Roster.
//!
//! Concrete backends for the domain traits: the in-memory mock user API,
//! the query engine it runs on, and configuration loading.

pub mod config_service;
pub mod mock_api;
pub mod paths;
pub mod query_engine;
pub mod seed;

pub use crate::config_service::ConfigService;
pub use crate::mock_api::MockUserApi;
pub use crate::paths::RosterPaths;
