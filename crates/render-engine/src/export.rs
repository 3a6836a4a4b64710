//! Export gateway: encodes a finished strip, saves the local download, and
//! hands a copy to the persistence boundary in the background.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;

use snapstrip_common::error::{SnapstripError, SnapstripResult};
use snapstrip_common::{epoch_millis, SystemClock, WallClock};
use snapstrip_processing_core::encode_png;
use snapstrip_strip_model::{CompositedStrip, PNG_MIME};

use crate::store::{PersistenceBoundary, StoredPhoto, UploadFile, UploadMetadata};

/// File name used for the local download.
pub const DEFAULT_DOWNLOAD_NAME: &str = "photostrip.png";

/// Outcome of delivering a strip.
#[derive(Debug)]
pub struct ExportReceipt {
    /// Where the download was written.
    pub download_path: PathBuf,

    /// Size of the encoded PNG.
    pub bytes: usize,

    /// Background upload, if a store is configured. Resolves to the stored
    /// record, or `None` when the upload failed.
    pub upload: Option<JoinHandle<Option<StoredPhoto>>>,
}

impl ExportReceipt {
    /// Wait for the background upload, if any.
    pub async fn wait_for_upload(self) -> Option<StoredPhoto> {
        let handle = self.upload?;
        match handle.await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Upload task did not finish");
                None
            }
        }
    }
}

/// Encodes strips and delivers them to disk and to an optional store.
pub struct AssetExportGateway {
    download_dir: PathBuf,
    download_name: String,
    store: Option<Arc<dyn PersistenceBoundary>>,
    clock: Arc<dyn WallClock>,
}

impl AssetExportGateway {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            store: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_download_name(mut self, name: impl Into<String>) -> Self {
        self.download_name = name.into();
        self
    }

    pub fn with_store(mut self, store: Arc<dyn PersistenceBoundary>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn download_path(&self) -> PathBuf {
        self.download_dir.join(&self.download_name)
    }

    /// Encode the strip as PNG. Same strip, same bytes.
    pub fn export(&self, strip: &CompositedStrip) -> SnapstripResult<Vec<u8>> {
        let (width, height) = strip.dimensions();
        if width == 0 || height == 0 {
            return Err(SnapstripError::export("Strip has no pixels"));
        }
        encode_png(strip.image())
    }

    /// Export, save the download, and start the upload.
    ///
    /// The upload runs detached; its failure is logged and never affects
    /// the download.
    pub async fn deliver(&self, strip: &CompositedStrip) -> SnapstripResult<ExportReceipt> {
        let png = self.export(strip)?;
        let upload = self.spawn_upload(strip, &png);

        let download_path = self.download_path();
        write_download(&download_path, &png).await?;
        tracing::info!(path = %download_path.display(), bytes = png.len(), "Strip saved");

        Ok(ExportReceipt {
            download_path,
            bytes: png.len(),
            upload,
        })
    }

    fn spawn_upload(
        &self,
        strip: &CompositedStrip,
        png: &[u8],
    ) -> Option<JoinHandle<Option<StoredPhoto>>> {
        let store = self.store.clone()?;
        let meta = strip.metadata();
        let season_id = meta.season_id.clone();
        let metadata = UploadMetadata::from(meta);
        let file = UploadFile {
            name: format!("generated-{}.png", epoch_millis(self.clock.now())),
            mime_type: PNG_MIME.to_string(),
            bytes: png.to_vec(),
        };

        Some(tokio::spawn(async move {
            match store.upload_photo(file, &season_id, metadata).await {
                Ok(record) => {
                    tracing::info!(
                        store = store.name(),
                        path = %record.file_path,
                        "Strip uploaded"
                    );
                    Some(record)
                }
                Err(e) => {
                    tracing::warn!(store = store.name(), error = %e, "Strip upload failed");
                    None
                }
            }
        }))
    }
}

async fn write_download(path: &Path, png: &[u8]) -> SnapstripResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, png)
        .await
        .map_err(|e| SnapstripError::export(format!("Cannot write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use image::RgbaImage;
    use snapstrip_common::FixedClock;
    use snapstrip_strip_model::{SeasonId, StripBackground, StripMetadata};

    use crate::store::LocalDirectoryStore;

    struct FailingStore;

    #[async_trait::async_trait]
    impl PersistenceBoundary for FailingStore {
        async fn upload_photo(
            &self,
            _file: UploadFile,
            _season_id: &SeasonId,
            _metadata: UploadMetadata,
        ) -> SnapstripResult<StoredPhoto> {
            Err(SnapstripError::upload("network unreachable"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "snapstrip-export-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn strip() -> CompositedStrip {
        let at = Utc.with_ymd_and_hms(2025, 5, 17, 14, 30, 0).unwrap();
        let background = StripBackground::WHITE;
        let image = RgbaImage::from_pixel(120, 180, background.rgba());
        CompositedStrip::new(
            image,
            StripMetadata {
                photo_count: 0,
                populated_cells: Vec::new(),
                background,
                width: 120,
                height: 180,
                season_id: SeasonId::from_date(&at),
                generated_at: at,
            },
        )
    }

    #[test]
    fn test_export_is_deterministic_png() {
        let gateway = AssetExportGateway::new(temp_dir("det"));
        let a = gateway.export(&strip()).unwrap();
        let b = gateway.export(&strip()).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[1..4], b"PNG");
    }

    #[tokio::test]
    async fn test_deliver_without_store_only_downloads() {
        let dir = temp_dir("plain");
        let gateway = AssetExportGateway::new(&dir);
        let receipt = gateway.deliver(&strip()).await.unwrap();

        assert_eq!(receipt.download_path, dir.join("photostrip.png"));
        assert!(receipt.upload.is_none());
        assert_eq!(
            std::fs::read(&receipt.download_path).unwrap().len(),
            receipt.bytes
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_download_intact() {
        let dir = temp_dir("failing");
        let gateway = AssetExportGateway::new(&dir).with_store(Arc::new(FailingStore));
        let receipt = gateway.deliver(&strip()).await.unwrap();
        let path = receipt.download_path.clone();

        assert!(receipt.wait_for_upload().await.is_none());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_upload_reaches_local_store() {
        let dir = temp_dir("stored");
        let at = Utc.with_ymd_and_hms(2025, 5, 17, 14, 30, 0).unwrap();
        let clock: Arc<dyn WallClock> = Arc::new(FixedClock(at));
        let store = LocalDirectoryStore::new(dir.join("store")).with_clock(clock.clone());
        let gateway = AssetExportGateway::new(dir.join("downloads"))
            .with_download_name("strip.png")
            .with_store(Arc::new(store))
            .with_clock(clock);

        let receipt = gateway.deliver(&strip()).await.unwrap();
        let download = std::fs::read(&receipt.download_path).unwrap();
        let record = receipt.wait_for_upload().await.unwrap();

        assert_eq!(record.original_filename, format!("generated-{}.png", at.timestamp_millis()));
        assert_eq!(record.mime_type, "image/png");
        assert_eq!(record.season_id.to_string(), "season-2025-05");
        assert_eq!(record.metadata.photo_count, 0);
        assert_eq!(
            std::fs::read(dir.join("store").join(&record.file_path)).unwrap(),
            download
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
