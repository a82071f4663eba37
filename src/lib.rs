//! Chat relay for documents, images, and audio.
//!
//! Accepts text prompts and single-file uploads over HTTP, turns them into a
//! prompt (extracting document text, or inlining media as base64), forwards
//! it to a Gemini model, and relays the answer back as `{ "result": ... }`.

pub mod ai;
pub mod error;
pub mod extract;
pub mod models;
pub mod prompts;
pub mod router;
pub mod server;

pub use error::{Error, Result};
