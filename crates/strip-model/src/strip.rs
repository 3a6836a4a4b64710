//! Composited strips and their metadata.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::background::StripBackground;

/// Coarse year-month bucket used to group exported strips, `season-YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeasonId {
    year: i32,
    month: u32,
}

impl SeasonId {
    /// Season containing the given date.
    pub fn from_date(date: &impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "season-{:04}-{:02}", self.year, self.month)
    }
}

/// Returned for strings that are not `season-YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid season identifier '{0}' (expected season-YYYY-MM)")]
pub struct InvalidSeasonId(pub String);

impl FromStr for SeasonId {
    type Err = InvalidSeasonId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidSeasonId(s.to_string());
        let rest = s.strip_prefix("season-").ok_or_else(err)?;
        let (year, month) = rest.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for SeasonId {
    type Error = InvalidSeasonId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeasonId> for String {
    fn from(value: SeasonId) -> Self {
        value.to_string()
    }
}

/// Descriptive data carried alongside a composited strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripMetadata {
    /// Frames supplied to the compositor.
    pub photo_count: usize,

    /// Cell indices that received an image (undecodable frames are absent).
    pub populated_cells: Vec<usize>,

    pub background: StripBackground,

    pub width: u32,
    pub height: u32,

    /// Fixed when the capture session started.
    pub season_id: SeasonId,

    pub generated_at: DateTime<Utc>,
}

/// The finished strip bitmap. Read-only once produced.
#[derive(Debug, Clone)]
pub struct CompositedStrip {
    image: RgbaImage,
    metadata: StripMetadata,
}

impl CompositedStrip {
    pub fn new(image: RgbaImage, metadata: StripMetadata) -> Self {
        Self { image, metadata }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn metadata(&self) -> &StripMetadata {
        &self.metadata
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_season_id_format() {
        let at = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(SeasonId::from_date(&at).to_string(), "season-2025-03");

        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(SeasonId::from_date(&date).to_string(), "season-2024-12");
    }

    #[test]
    fn test_season_id_parse() {
        let season: SeasonId = "season-2025-07".parse().unwrap();
        assert_eq!((season.year(), season.month()), (2025, 7));
        assert!("season-2025-13".parse::<SeasonId>().is_err());
        assert!("season-25-07".parse::<SeasonId>().is_err());
        assert!("2025-07".parse::<SeasonId>().is_err());
    }

    #[test]
    fn test_season_id_serializes_as_string() {
        let season: SeasonId = "season-2025-01".parse().unwrap();
        assert_eq!(
            serde_json::to_string(&season).unwrap(),
            "\"season-2025-01\""
        );
    }
}
