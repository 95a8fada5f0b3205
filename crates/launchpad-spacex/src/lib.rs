//! SpaceX API adapter for Launchpad
//!
//! Implements [`launchpad_core::ExternalLaunchFetcher`] over the public
//! SpaceX REST API, with bounded retry on transient failures.

pub mod client;
pub mod retry;

pub use client::{SpaceXClient, SpaceXClientConfig, DEFAULT_SPACEX_API_URL};
pub use retry::RetryPolicy;
