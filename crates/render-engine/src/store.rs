//! Persistence boundary for exported strips.
//!
//! Uploads go through [`PersistenceBoundary`]. The bundled
//! [`LocalDirectoryStore`] files each strip under its season directory and
//! writes a JSON record next to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use snapstrip_common::error::{SnapstripError, SnapstripResult};
use snapstrip_common::{epoch_millis, SystemClock, WallClock};
use snapstrip_processing_core::png_dimensions;
use snapstrip_strip_model::{SeasonId, StripMetadata};

/// Value of [`UploadMetadata::source`] for strips made by the booth.
pub const UPLOAD_SOURCE: &str = "photo-booth";
/// Version of the upload metadata layout.
pub const UPLOAD_METADATA_VERSION: &str = "1.0";

/// An encoded file handed to the store.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripDimensions {
    pub width: u32,
    pub height: u32,
}

/// Descriptive metadata sent with an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub photo_count: usize,
    /// `#rrggbb`
    pub background_color: String,
    pub strip_dimensions: StripDimensions,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub version: String,
}

impl From<&StripMetadata> for UploadMetadata {
    fn from(meta: &StripMetadata) -> Self {
        Self {
            photo_count: meta.photo_count,
            background_color: meta.background.hex(),
            strip_dimensions: StripDimensions {
                width: meta.width,
                height: meta.height,
            },
            generated_at: meta.generated_at,
            source: UPLOAD_SOURCE.to_string(),
            version: UPLOAD_METADATA_VERSION.to_string(),
        }
    }
}

/// Record describing a stored strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPhoto {
    pub season_id: SeasonId,
    /// Path relative to the store root, `<season>/<millis>.<ext>`.
    pub file_path: String,
    pub original_filename: String,
    pub file_size: u64,
    pub image_width: u32,
    pub image_height: u32,
    pub mime_type: String,
    pub metadata: UploadMetadata,
    pub generation_timestamp: DateTime<Utc>,
}

/// Remote or local storage that accepts finished strips.
#[async_trait::async_trait]
pub trait PersistenceBoundary: Send + Sync {
    async fn upload_photo(
        &self,
        file: UploadFile,
        season_id: &SeasonId,
        metadata: UploadMetadata,
    ) -> SnapstripResult<StoredPhoto>;

    /// Store name for logs.
    fn name(&self) -> &str;
}

/// Stores strips as files under a root directory.
pub struct LocalDirectoryStore {
    root: PathBuf,
    clock: Arc<dyn WallClock>,
}

impl LocalDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every record stored for `season_id`, oldest first.
    pub async fn records(&self, season_id: &SeasonId) -> SnapstripResult<Vec<StoredPhoto>> {
        let dir = self.root.join(season_id.to_string());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = tokio::fs::read_to_string(&path).await?;
            records.push(serde_json::from_str::<StoredPhoto>(&text)?);
        }
        records.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        Ok(records)
    }
}

#[async_trait::async_trait]
impl PersistenceBoundary for LocalDirectoryStore {
    async fn upload_photo(
        &self,
        file: UploadFile,
        season_id: &SeasonId,
        metadata: UploadMetadata,
    ) -> SnapstripResult<StoredPhoto> {
        if file.bytes.is_empty() {
            return Err(SnapstripError::upload("Refusing to store an empty file"));
        }
        let (image_width, image_height) = png_dimensions(&file.bytes)
            .map_err(|e| SnapstripError::upload(format!("Unreadable upload: {e}")))?;

        let extension = Path::new(&file.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let stamp = epoch_millis(self.clock.now());
        let file_path = format!("{season_id}/{stamp}.{extension}");

        let season_dir = self.root.join(season_id.to_string());
        tokio::fs::create_dir_all(&season_dir).await?;

        let target = self.root.join(&file_path);
        let mut out = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(SnapstripError::upload(format!("{file_path} already exists")));
            }
            Err(e) => return Err(e.into()),
        };
        out.write_all(&file.bytes).await?;
        out.flush().await?;

        let record = StoredPhoto {
            season_id: season_id.clone(),
            file_path,
            original_filename: file.name,
            file_size: file.bytes.len() as u64,
            image_width,
            image_height,
            mime_type: file.mime_type,
            generation_timestamp: metadata.generated_at,
            metadata,
        };
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(target.with_extension("json"), json).await?;

        tracing::info!(
            path = %target.display(),
            bytes = record.file_size,
            "Strip stored"
        );
        Ok(record)
    }

    fn name(&self) -> &str {
        "local-directory"
    }
}
