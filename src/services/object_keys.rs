//! Version-qualified object key layout.
//!
//! Every stored object lives under `{user_id}/{base_name}/`, with the
//! version number, an upload timestamp and a random suffix embedded in the
//! final segment: `{user_id}/{base}/v{version}-{millis}-{rand8}.{ext}`.
//! The next version of a file is discovered by listing that prefix and
//! taking the highest parsed version plus one. Two concurrent uploads of
//! the same filename can compute the same next version; the later metadata
//! write wins.

use crate::services::storage::StorageService;
use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::path::Path;

/// Filename split into the key-relevant parts: stem and extension.
pub fn split_name(file_name: &str) -> (String, String) {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_lowercase();
    (stem, ext)
}

pub fn version_prefix(user_id: &str, base_name: &str) -> String {
    format!("{}/{}/", user_id, base_name)
}

pub fn version_key(user_id: &str, base_name: &str, version: i32, ext: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    format!(
        "{}/{}/v{}-{}-{}.{}",
        user_id,
        base_name,
        version,
        Utc::now().timestamp_millis(),
        suffix,
        ext
    )
}

/// Extract the version number from a stored key's final segment.
pub fn parse_version(key: &str) -> Option<i32> {
    let segment = key.rsplit('/').next()?;
    let digits: String = segment
        .strip_prefix('v')?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Discover the next version number for (owner, base name) by listing the
/// existing objects under its prefix.
pub async fn next_version(
    storage: &dyn StorageService,
    user_id: &str,
    base_name: &str,
) -> Result<i32> {
    let keys = storage
        .list_objects(&version_prefix(user_id, base_name))
        .await?;

    Ok(keys
        .iter()
        .filter_map(|k| parse_version(k))
        .max()
        .map_or(1, |v| v + 1))
}
