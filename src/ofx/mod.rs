pub mod error;
pub mod header;
pub mod loader;
pub mod repair;
pub mod sgml;
pub mod stack;
pub mod tag;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use error::{Diagnostic, ParseError};
pub use header::parse_header;
pub use loader::{load, load_bytes, load_path, load_str, NormalizedDocument, Source};
pub use sgml::normalize;
pub use types::{Dialect, Element, HeaderMap, OfxDocument};
