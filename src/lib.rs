//! qrshorten - URL shortener with QR assets
//!
//! Authenticated users create short links; anyone can resolve them, and every
//! resolution is counted atomically in storage.
//!
//! # Architecture
//! - `storage`: Repository traits, SeaORM and in-memory backends
//! - `services`: Link creation/resolution, stats, sign-in, QR publishing
//! - `api`: HTTP handlers, JWT and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
