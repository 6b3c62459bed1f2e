// ABOUTME: Library root for pages-deployer - exposes the deployment pipeline for testing.
// ABOUTME: The main binary is in main.rs.

pub mod api;
pub mod artifact;
pub mod config;
pub mod deploy;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod signals;
pub mod types;
