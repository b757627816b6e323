#![deny(clippy::unwrap_used)]

//! Post-processing for captions returned by a vision-language model.
//!
//! - [`is_fallback_caption`] flags non-answers ("I'm sorry, I can't see the image").
//! - [`fix_mojibake`] repairs a fixed class of mis-decoded accented characters.

mod fallback;
mod mojibake;

pub use fallback::*;
pub use mojibake::*;
