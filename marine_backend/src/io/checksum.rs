//! Checksums for detecting unchanged feed snapshots.

use sha2::{Digest, Sha256};

use crate::core::domain::Point;
use crate::error::{MapError, MapResult};

/// Calculate SHA-256 checksum of feed content.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checksum of a parsed point list in its canonical JSON form.
pub fn points_checksum(points: &[Point]) -> MapResult<String> {
    let canonical = serde_json::to_string(points)
        .map_err(|e| MapError::InternalError(format!("Failed to serialize points: {}", e)))?;
    Ok(calculate_checksum(&canonical))
}
