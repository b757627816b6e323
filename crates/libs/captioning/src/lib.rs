#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::cast_precision_loss)]

//! # Captioning pipelines
//!
//! Turns a folder of SVG files into a CSV table of short captions.
//!
//! - [`run_sync`]: one chat request per image, a bounded number in flight at once.
//!   Fallback answers are retried, then replaced by [`RETRY_SENTINEL`].
//! - [`run_batch`]: every image goes into one JSONL file that is submitted as a
//!   batch job, polled until it settles, and collected. Fallback answers are kept
//!   but marked with [`caption_filter::FALLBACK_MARKER`].
//!
//! Both only talk to the remote API through [`language_model::CaptionService`].

mod batch;
mod discover;
mod error;
mod model;
mod pipeline;
mod sync_runner;
mod table;

pub use batch::*;
pub use discover::*;
pub use error::*;
pub use model::*;
pub use pipeline::*;
pub use sync_runner::*;
pub use table::*;
