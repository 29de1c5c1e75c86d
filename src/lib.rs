pub mod core;
pub mod ofx;
pub mod utils;

// Re-exports
pub use crate::core::config::ParserConfig;
pub use ofx::{load, load_bytes, load_path, load_str, OfxDocument, ParseError, Source};
