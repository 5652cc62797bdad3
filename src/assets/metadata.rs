use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use serde_json::{Map, Value};
use tracing::warn;

use crate::foundation::error::FramemarkResult;

/// Opaque camera metadata, forwarded to the text renderer untouched.
pub type MetadataBag = Map<String, Value>;

/// Source of per-photo metadata.
pub trait MetadataProvider: Send + Sync {
    /// Read the metadata bag for `path`.
    fn read(&self, path: &Path) -> FramemarkResult<MetadataBag>;
}

/// Provider that always yields an empty bag.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMetadata;

impl MetadataProvider for NoMetadata {
    fn read(&self, _path: &Path) -> FramemarkResult<MetadataBag> {
        Ok(MetadataBag::new())
    }
}

/// Provider reading primary-IFD EXIF tags, keyed by tag name with display-formatted values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExifMetadata;

impl MetadataProvider for ExifMetadata {
    fn read(&self, path: &Path) -> FramemarkResult<MetadataBag> {
        let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
        let mut reader = BufReader::new(f);
        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(MetadataBag::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read exif from '{}'", path.display()))
                    .into());
            }
        };

        let mut bag = MetadataBag::new();
        for field in exif.fields().filter(|f| f.ifd_num == exif::In::PRIMARY) {
            let value = field.display_value().with_unit(&exif).to_string();
            bag.insert(field.tag.to_string(), Value::String(value));
        }
        Ok(bag)
    }
}

/// Read metadata, degrading to an empty bag when the provider fails.
pub fn read_or_empty(provider: &dyn MetadataProvider, path: &Path) -> MetadataBag {
    provider.read(path).unwrap_or_else(|e| {
        warn!("metadata unavailable for {}: {e}", path.display());
        MetadataBag::new()
    })
}
