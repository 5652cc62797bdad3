use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xxhash_rust::xxh3::{xxh3_64, xxh3_128};

/// Unique identity of one composition job.
///
/// Used both as the handshake correlation key and as the cache-file namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Derive a fresh id from the source path, a random nonce and the current time.
    pub fn generate(path: &Path) -> Self {
        let path_hash = xxh3_64(path.to_string_lossy().as_bytes());
        let nonce = uuid::Uuid::new_v4();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seed = format!("{path_hash:016x}{nonce}{nanos}");
        Self(format!("{:032x}", xxh3_128(seed.as_bytes())))
    }

    /// Wrap an existing id string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic per-job cache paths plus the final composite location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFileSet {
    /// Rendered background.
    pub bg: PathBuf,
    /// Orientation-corrected main photo.
    pub main: PathBuf,
    /// Shadow cutout mask.
    pub mask: PathBuf,
    /// Final composite.
    pub composite: PathBuf,
}

impl OutputFileSet {
    /// Lay out the cache files for `id` under `cache_dir` and pick a free composite path.
    pub fn new(id: &JobId, cache_dir: &Path, output_dir: &Path, name: &str) -> Self {
        let base = cache_dir.join(id.as_str());
        Self {
            bg: suffixed(&base, "_bg.jpg"),
            main: suffixed(&base, "_main.jpg"),
            mask: suffixed(&base, "_mask.png"),
            composite: unique_output_path(output_dir, name),
        }
    }

    /// Remove the cache files, optionally keeping the composite. Failures are logged and
    /// otherwise ignored.
    pub fn remove(&self, keep_composite: bool) {
        let mut paths = vec![&self.bg, &self.main, &self.mask];
        if !keep_composite {
            paths.push(&self.composite);
        }
        for path in paths {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(path) {
                Ok(()) => debug!("removed cache file {}", path.display()),
                Err(e) => warn!("failed to remove cache file {}: {e}", path.display()),
            }
        }
    }
}

fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// `<dir>/<stem>.jpg`, with `_1`, `_2`, ... appended to the stem until the path is free.
pub fn unique_output_path(dir: &Path, name: &str) -> PathBuf {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_owned());

    let first = dir.join(format!("{stem}.jpg"));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}.jpg")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
