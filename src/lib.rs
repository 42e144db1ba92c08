// src/lib.rs
//! Rollcall: an in-memory name registry served over HTTP.
//!
//! A [`NameRegistry`] binds names to addresses and assigns each binding a
//! [`RecordId`]. [`network::NetworkManager`] exposes it over HTTP/JSON and
//! [`client::RegistryClient`] talks to a running service.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod network;
pub mod registry;

pub use client::{Registration, RegistryClient};
pub use config::Config;
pub use error::{ClientError, ErrorKind, RegistryError, ServiceError};
pub use network::NetworkManager;
pub use registry::{NameRegistry, Record, RecordId};
