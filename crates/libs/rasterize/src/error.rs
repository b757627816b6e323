use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("SVG has an empty canvas ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
    #[error("Invalid PNG: {0}")]
    InvalidPng(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Generated PNG is too small ({actual} bytes, expected at least {minimum})")]
    TooSmall { actual: u64, minimum: u64 },
}

pub type RasterizeResult<T> = Result<T, RasterizeError>;
