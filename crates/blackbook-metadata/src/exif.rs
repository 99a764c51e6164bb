use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use exif::{In, Tag};
use tracing::warn;

use blackbook_catalog::models::Rotation;

/// What the catalogue wants to know about a photograph before a record
/// exists for it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhotoMetadata {
    /// Capture time as fractional seconds since the Epoch, or zero when
    /// the file carries no parseable timestamp.
    pub timestamp: f64,
    /// Pixel dimensions, or (0, 0) when unknown.
    pub resolution: (u32, u32),
    /// Clockwise rotation needed to display the photo upright.
    pub rotation: Rotation,
}

impl PhotoMetadata {
    /// Reads a photograph's EXIF block. Files with missing or unreadable
    /// metadata come back as the zero/empty defaults rather than an
    /// error; callers ingest them as photos of unknown provenance.
    pub fn from_file(path: &Path) -> Self {
        match read_exif(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), %err, "unreadable image metadata, using defaults");
                Self::default()
            }
        }
    }
}

fn read_exif(path: &Path) -> Result<PhotoMetadata> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new()
        .read_from_container(&mut reader)
        .with_context(|| format!("read EXIF from {}", path.display()))?;

    let timestamp = get_string(&exif, Tag::DateTime)
        .map(|text| datetime_to_timestamp(&text))
        .unwrap_or(0.0);

    let resolution = match (
        get_u32(&exif, Tag::PixelXDimension),
        get_u32(&exif, Tag::PixelYDimension),
    ) {
        (Some(width), Some(height)) => (width, height),
        _ => (0, 0),
    };

    let rotation = match get_u32(&exif, Tag::Orientation) {
        Some(orientation) => orientation_to_rotation(orientation).unwrap_or_else(|| {
            warn!(
                path = %path.display(),
                orientation,
                "unsupported EXIF orientation, assuming upright"
            );
            Rotation::Deg0
        }),
        None => Rotation::Deg0,
    };

    Ok(PhotoMetadata {
        timestamp,
        resolution,
        rotation,
    })
}

/// Maps an EXIF orientation onto the clockwise rotation that displays
/// the photo upright. Mirrored orientations (2, 4, 5, 7) cannot be
/// expressed as a plain rotation and come back as `None`.
pub fn orientation_to_rotation(orientation: u32) -> Option<Rotation> {
    match orientation {
        1 => Some(Rotation::Deg0),
        3 => Some(Rotation::Deg180),
        6 => Some(Rotation::Deg90),
        8 => Some(Rotation::Deg270),
        _ => None,
    }
}

/// Converts an EXIF timestamp into seconds since the Epoch, treating
/// the wall-clock time as UTC. Both the raw `"YYYY:MM:DD hh:mm:ss"`
/// form and the hyphenated form the exif crate displays are accepted;
/// anything that doesn't parse is zero.
pub fn datetime_to_timestamp(text: &str) -> f64 {
    let text = text.trim().trim_matches('"');
    NaiveDateTime::parse_from_str(text, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .map(|datetime| datetime.and_utc().timestamp() as f64)
        .unwrap_or(0.0)
}

fn get_u32(exif: &exif::Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|field| field.display_value().to_string())
}
