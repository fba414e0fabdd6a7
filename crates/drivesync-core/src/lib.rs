//! drivesync Core - Domain logic and reconciliation rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `FileDescriptor`, `Change`, `Operation`, `Differences`
//! - **Reconciliation** - operation resolution, lazy checksums and safe ordering
//! - **Port definitions** - Traits for adapters: `IFileLister`
//! - **Configuration** - YAML-backed settings shared by the adapters and CLI
//!
//! # Architecture
//!
//! The domain module is a pure in-memory classification layer: it never
//! performs network I/O and owns no persisted state. The only I/O it performs
//! is reading local content when a checksum is requested.
//! Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod ports;
