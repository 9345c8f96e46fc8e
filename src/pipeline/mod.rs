//! Pipeline stages for screenshot-to-pages generation.
//!
//! Each submodule implements exactly one step so it can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm (layout) ──▶ llm (page × N) ──▶ archive
//! (path/URL) (base64)  (1 vision call)   (1 call/keyword)   (zip)
//! ```
//!
//! 1. [`input`]   : read screenshots from local paths or HTTP/HTTPS URLs
//! 2. [`encode`]  : decode each image and re-encode it as a base64 PNG
//! 3. [`llm`]     : build generation calls and dispatch them to a backend;
//!    the only stage with network I/O to the model
//! 4. [`archive`] : stage pages under their slug names and pack them into
//!    an in-memory ZIP

pub mod archive;
pub mod encode;
pub mod input;
pub mod llm;
