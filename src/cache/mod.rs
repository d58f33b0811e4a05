//! Versioned artifact cache
//!
//! Downloads compressed build dependencies from object storage, unpacks
//! them under a cache root keyed by major version, and evicts every version
//! older than the one just requested.
//!
//! # Entry Lifecycle
//!
//! | State | On disk | Description |
//! |-------|---------|-------------|
//! | Miss | nothing | Archive will be downloaded |
//! | Staging | `.<N>.partial/` | Extraction in progress or interrupted |
//! | Ready | `<N>/` + `<prefix>-v<N>.<ext>` | Payload present, served as-is |
//! | Evicted | nothing | A newer major version was requested |

pub mod archive;
mod artifact_cache;
pub mod eviction;
pub mod layout;
pub mod version;

pub use artifact_cache::VersionedArtifactCache;
pub use eviction::{plan_eviction, versions_to_evict, EvictionReport};
pub use layout::{ArtifactLayout, CacheItem, CacheRoot, ItemKind};
pub use version::parse_major;
