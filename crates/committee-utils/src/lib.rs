//! Shared utilities for equity-committee
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and typed access to environment configuration.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_opt, env_parse};
pub use logging::{DEFAULT_FILTER, LogFormat, init_tracing, init_tracing_with};
