use crate::{RasterizeError, RasterizeResult};
use image::{ImageFormat, ImageReader};
use std::io;
use std::path::Path;
use tempfile::TempPath;

/// A PNG on disk that belongs to exactly one processing unit.
///
/// The file is removed by [`close`](Self::close), or on drop if the unit bails out early.
#[derive(Debug)]
pub struct TransientRaster {
    path: TempPath,
    len: u64,
}

impl TransientRaster {
    pub(crate) fn new(path: TempPath, len: u64) -> Self {
        Self { path, len }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the PNG in bytes.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reject rasters below `minimum` bytes, a cheap check for broken renders.
    pub const fn ensure_min_size(&self, minimum: u64) -> RasterizeResult<()> {
        if self.len < minimum {
            return Err(RasterizeError::TooSmall {
                actual: self.len,
                minimum,
            });
        }
        Ok(())
    }

    /// Delete the file, reporting failures instead of swallowing them like drop does.
    pub fn close(self) -> io::Result<()> {
        self.path.close()
    }
}

/// Check that `path` is a PNG with a non-empty canvas. Returns its dimensions.
pub fn validate_png(path: &Path) -> RasterizeResult<(u32, u32)> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    match reader.format() {
        Some(ImageFormat::Png) => {}
        Some(other) => {
            return Err(RasterizeError::InvalidPng(format!(
                "expected PNG, found {other:?}"
            )));
        }
        None => return Err(RasterizeError::InvalidPng("unknown format".to_string())),
    }
    let (width, height) = reader.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(RasterizeError::InvalidPng(format!(
            "empty canvas {width}x{height}"
        )));
    }
    Ok((width, height))
}
