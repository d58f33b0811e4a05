//! Bucket specifier normalization

use std::fmt;

/// Separator that may appear inside a raw bucket specifier
pub const SEPARATOR: char = '/';

/// A bucket plus the key prefix every key under it is resolved against.
///
/// Raw specifiers such as `stemcells/windows/vmx` name bucket `stemcells`
/// with prefix `windows/vmx/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAddress {
    /// Bucket name (text before the first separator)
    pub bucket: String,
    /// Key prefix, empty or ending with the separator
    pub key_prefix: String,
}

impl ObjectAddress {
    /// Split a raw bucket specifier on its first separator
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(SEPARATOR) {
            Some((bucket, rest)) => Self {
                bucket: bucket.to_string(),
                key_prefix: format!("{}{}", rest, SEPARATOR),
            },
            None => Self {
                bucket: spec.to_string(),
                key_prefix: String::new(),
            },
        }
    }

    /// Effective object key for `key` under this address
    pub fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bucket, self.key_prefix)
    }
}
