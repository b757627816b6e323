use crate::{RasterizeError, RasterizeResult, TransientRaster};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::Builder;
use tracing::debug;

/// Renders SVG files to PNG. Cheap to clone: the font database is shared.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    scratch_dir: Option<PathBuf>,
}

impl Rasterizer {
    /// Creates a rasterizer with the system fonts loaded.
    ///
    /// Transient rasters are written to `scratch_dir`, or the system temp dir if `None`.
    #[must_use]
    pub fn new(scratch_dir: Option<PathBuf>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!("Loaded {} font faces for SVG text", db.len());
        Self {
            fontdb: Arc::new(db),
            scratch_dir,
        }
    }

    /// Render the SVG at `svg_path` into PNG bytes at its intrinsic size.
    pub fn render_png(&self, svg_path: &Path) -> RasterizeResult<Vec<u8>> {
        let svg_data = fs::read(svg_path)?;
        let options = usvg::Options {
            resources_dir: svg_path.parent().map(Path::to_path_buf),
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(&svg_data, &options)?;

        let size = tree.size().to_int_size();
        let mut pixmap =
            Pixmap::new(size.width(), size.height()).ok_or(RasterizeError::EmptyCanvas {
                width: size.width(),
                height: size.height(),
            })?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RasterizeError::Encode(e.to_string()))
    }

    /// Render the SVG and write the PNG to a fresh transient file.
    ///
    /// Nothing is left on disk if rendering or writing fails.
    pub fn rasterize(&self, svg_path: &Path) -> RasterizeResult<TransientRaster> {
        let png = self.render_png(svg_path)?;

        let stem = svg_path
            .file_stem()
            .map_or_else(|| "raster".to_string(), |s| s.to_string_lossy().into_owned());
        let prefix = format!("{stem}-");
        let mut builder = Builder::new();
        builder.prefix(&prefix).suffix(".png");
        let mut temp_file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        temp_file.write_all(&png)?;
        temp_file.flush()?;

        Ok(TransientRaster::new(temp_file.into_temp_path(), png.len() as u64))
    }
}
