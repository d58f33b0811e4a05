//! Requested version parsing
//!
//! Only the major component identifies a cache entry; minor, patch and any
//! pre-release or build metadata are accepted and ignored.

use crate::error::{ArtifactError, ArtifactResult};

/// Extract the major component of a version string.
///
/// Full semantic versions go through `semver`. Anything else (`"2"`,
/// `"2.1"`, `"2.0.0.1"`) is accepted as long as the text before the first
/// `.` is a plain non-negative integer.
pub fn parse_major(version: &str) -> ArtifactResult<u64> {
    let trimmed = version.trim();
    if let Ok(parsed) = semver::Version::parse(trimmed) {
        return Ok(parsed.major);
    }

    let leading = trimmed.split('.').next().unwrap_or_default();
    if leading.is_empty() {
        return Err(ArtifactError::invalid_version(version, "missing major component"));
    }
    if !leading.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ArtifactError::invalid_version(
            version,
            format!("major component {:?} is not a non-negative integer", leading),
        ));
    }

    leading
        .parse::<u64>()
        .map_err(|e| ArtifactError::invalid_version(version, e.to_string()))
}
