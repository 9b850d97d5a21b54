//! Client code for pwa-cache.
//!
//! This crate provides URL resolution against the origin and the network
//! layer the worker fetches through.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, Network, UrlError, canonicalize, resolve};
