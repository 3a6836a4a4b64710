//! Captured frames.

use crate::filter::FilterDescriptor;

/// MIME type of every encoded frame and strip.
pub const PNG_MIME: &str = "image/png";

/// One encoded square still produced by a burst.
///
/// Immutable once created; `index` is the frame's 0-based position in the
/// burst's frame list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    index: usize,
    filter: FilterDescriptor,
    size: u32,
    png: Vec<u8>,
}

impl CapturedFrame {
    pub fn new(index: usize, filter: FilterDescriptor, size: u32, png: Vec<u8>) -> Self {
        Self {
            index,
            filter,
            size,
            png,
        }
    }

    /// Wrap raw bytes that did not come from a capture (imported files).
    pub fn from_encoded(index: usize, png: Vec<u8>) -> Self {
        Self::new(index, FilterDescriptor::None, 0, png)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn filter(&self) -> FilterDescriptor {
        self.filter
    }

    /// Edge length of the square raster, `0` if unknown.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Encoded raster bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    /// Same frame at a new list position.
    pub fn reindexed(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindex_keeps_payload() {
        let frame = CapturedFrame::new(4, FilterDescriptor::Sepia, 600, vec![1, 2, 3]);
        let moved = frame.clone().reindexed(1);
        assert_eq!(moved.index(), 1);
        assert_eq!(moved.bytes(), frame.bytes());
        assert_eq!(moved.filter(), FilterDescriptor::Sepia);
    }
}
