//! stemcell-artifacts - VMX artifact cache for Windows stemcell builds
//!
//! Moves build artifacts in and out of object storage and keeps one
//! unpacked copy of the newest VMX template bundle on local disk.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use error::{ArtifactError, ArtifactResult};
