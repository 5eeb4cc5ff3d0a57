//! Snapshot export.
//!
//! A snapshot is the original full-resolution camera frame with the overlay,
//! rasterised at display size, scaled up to match and composited on top.

mod task;

use chrono::{DateTime, SecondsFormat, Utc};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

pub use task::{CancellationToken, ExportHandle, ExportTask, SnapshotJob};

pub const SNAPSHOT_PREFIX: &str = "VEX_AI_";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("snapshot export cancelled")]
    Cancelled,
    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot export thread panicked")]
    Panicked,
}

/// Scale `overlay` to the size of `original` and composite it on top.
pub fn compose_snapshot(original: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut composed = original.clone();
    if overlay.dimensions() == original.dimensions() {
        imageops::overlay(&mut composed, overlay, 0, 0);
    } else {
        let scaled = imageops::resize(
            overlay,
            original.width(),
            original.height(),
            FilterType::Triangle,
        );
        imageops::overlay(&mut composed, &scaled, 0, 0);
    }
    composed
}

/// `VEX_AI_<ISO-8601 UTC with milliseconds>.png`, with the time separators
/// written as `-` so the name is valid on every file system.
pub fn snapshot_file_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("{}{}.png", SNAPSHOT_PREFIX, stamp)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
