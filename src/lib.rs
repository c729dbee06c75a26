//! Buylink - product link redirect service
//!
//! Resolves opaque product ids ("mappings") to live outbound purchase URLs,
//! records every redirect as a click event, and periodically probes
//! outbound links so dead offers stop being served.
//!
//! # Architecture
//! - `storage`: the `Storage` trait with SeaORM and in-memory backends
//! - `services`: resolver, redirect endpoint, click recorder, admin API,
//!   link-health prober, health checks
//! - `middleware`: admin bearer auth and rate limiting
//! - `utils`: pure URL transformation (affiliate wrapping, UTM tagging)
//! - `config`: immutable startup configuration
//! - `errors`: crate-wide error type

pub mod config;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod storage;
pub mod utils;
