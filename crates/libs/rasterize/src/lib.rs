#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! # SVG rasterization
//!
//! Turns vector images into PNG files that only live as long as one processing unit.
//!
//! - [`Rasterizer`] renders an SVG with `resvg` into PNG bytes and writes them to a
//!   [`TransientRaster`], a temporary file that is deleted on [`TransientRaster::close`]
//!   or when dropped, whichever comes first.
//! - [`validate_png`] checks that a file is structurally a PNG with a non-empty canvas.

mod error;
mod raster;
mod svg;

pub use error::*;
pub use raster::*;
pub use svg::*;
