//! Tree-sitter based Python normalization for codesift
//!
//! Parses a snippet with the tree-sitter Python grammar and regenerates
//! canonical source from the syntax tree. Snippets that differ only in
//! whitespace, comments or line continuations normalize to the same text.
//!
//! # Example
//! ```ignore
//! use parser::PythonNormalizer;
//!
//! let mut normalizer = PythonNormalizer::new()?;
//! assert_eq!(normalizer.normalize("print(1+1)")?, "print(1 + 1)\n");
//! ```

mod checks;
mod error;
mod normalize;
mod render;

pub use checks::MAX_TREE_DEPTH;
pub use error::ParseError;
pub use normalize::{PythonNormalizer, normalize};
