//! Object store access
//!
//! A thin, address-normalizing client over a pluggable transport:
//! - `AwsCliStore`: real buckets through `aws s3api`
//! - `MemoryBackend`: in-process map for tests

pub mod address;
mod aws_cli;
mod backend;
mod client;
pub mod memory;

pub use address::ObjectAddress;
pub use aws_cli::AwsCliStore;
pub use backend::ObjectBackend;
pub use client::{test_upload_permissions, ObjectStoreClient, UPLOAD_PERMISSIONS_KEY};
pub use memory::MemoryBackend;
