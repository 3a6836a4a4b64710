//! Live video sources.

use std::path::Path;

use image::{Rgba, RgbaImage};

use snapstrip_common::error::{SnapstripError, SnapstripResult};

/// A live camera-like feed. Frame capture only ever reads from it.
pub trait VideoSource: Send {
    /// Whether the stream is running at all.
    fn is_active(&self) -> bool;

    /// The most recent frame, or `None` if the source has nothing to show.
    fn current_frame(&mut self) -> Option<&RgbaImage>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Replays a fixed list of still images, advancing one image per read.
pub struct StillImageSource {
    frames: Vec<RgbaImage>,
    cursor: usize,
    label: String,
}

impl StillImageSource {
    pub fn new(frames: Vec<RgbaImage>, label: impl Into<String>) -> Self {
        Self {
            frames,
            cursor: 0,
            label: label.into(),
        }
    }

    /// Load a single image file, or every image file in a directory
    /// (sorted by file name).
    pub fn open(path: &Path) -> SnapstripResult<Self> {
        if !path.exists() {
            return Err(SnapstripError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut files = if path.is_dir() {
            let mut entries = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image_file(p))
                .collect::<Vec<_>>();
            entries.sort();
            entries
        } else {
            vec![path.to_path_buf()]
        };

        if files.is_empty() {
            return Err(SnapstripError::capture(format!(
                "no image files in {}",
                path.display()
            )));
        }

        let mut frames = Vec::with_capacity(files.len());
        for file in files.drain(..) {
            let image = image::open(&file).map_err(|e| {
                SnapstripError::decode(format!("failed to open {}: {e}", file.display()))
            })?;
            frames.push(image.to_rgba8());
        }

        tracing::debug!(path = %path.display(), frames = frames.len(), "Loaded still source");
        Ok(Self::new(frames, path.display().to_string()))
    }
}

impl VideoSource for StillImageSource {
    fn is_active(&self) -> bool {
        !self.frames.is_empty()
    }

    fn current_frame(&mut self) -> Option<&RgbaImage> {
        if self.frames.is_empty() {
            return None;
        }
        let index = self.cursor % self.frames.len();
        self.cursor += 1;
        self.frames.get(index)
    }

    fn describe(&self) -> String {
        format!("stills:{}", self.label)
    }
}

/// Generated colour-bar feed for demos and hardware-free runs.
///
/// Each read shifts the bars so consecutive shots differ.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame: RgbaImage,
    reads: u32,
}

const BARS: [[u8; 3]; 6] = [
    [235, 64, 52],
    [245, 166, 35],
    [248, 231, 28],
    [126, 211, 33],
    [74, 144, 226],
    [144, 19, 254],
];

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: RgbaImage::new(width, height),
            reads: 0,
        }
    }

    fn render(&mut self) {
        let bar_width = (self.width / BARS.len() as u32).max(1);
        let shift = self.reads as usize;
        let height = self.height.max(1);
        self.frame = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let bar = ((x / bar_width) as usize + shift) % BARS.len();
            let [r, g, b] = BARS[bar];
            // Vertical shading so crops are distinguishable.
            let shade = 155 + (100 * (height - y) / height) as u16;
            let scale = |c: u8| ((c as u16 * shade) / 255) as u8;
            Rgba([scale(r), scale(g), scale(b), 255])
        });
    }
}

impl VideoSource for TestPatternSource {
    fn is_active(&self) -> bool {
        true
    }

    fn current_frame(&mut self) -> Option<&RgbaImage> {
        self.render();
        self.reads += 1;
        Some(&self.frame)
    }

    fn describe(&self) -> String {
        format!("pattern:{}x{}", self.width, self.height)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_source_cycles() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([2, 2, 2, 255]));
        let mut source = StillImageSource::new(vec![a.clone(), b.clone()], "test");
        assert_eq!(source.current_frame(), Some(&a));
        assert_eq!(source.current_frame(), Some(&b));
        assert_eq!(source.current_frame(), Some(&a));
    }

    #[test]
    fn test_empty_still_source_is_inactive() {
        let mut source = StillImageSource::new(vec![], "empty");
        assert!(!source.is_active());
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn test_open_missing_path() {
        let err = StillImageSource::open(Path::new("/nonexistent/snapstrip/frames")).err();
        assert!(matches!(err, Some(SnapstripError::FileNotFound { .. })));
    }

    #[test]
    fn test_pattern_source_shifts_between_reads() {
        let mut source = TestPatternSource::new(120, 80);
        let first = source.current_frame().cloned().unwrap();
        let second = source.current_frame().cloned().unwrap();
        assert_eq!(first.dimensions(), (120, 80));
        assert_ne!(first, second);
    }
}
