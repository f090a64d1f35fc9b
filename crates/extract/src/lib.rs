//! Snippet extraction for codesift
//!
//! Turns a dataset record into a candidate snippet, screening out snippets
//! with unrecognized backslash escapes before they reach the parser.

mod escape;
mod extractor;

pub use escape::{RECOGNIZED_ESCAPES, find_invalid_escape, has_invalid_escape};
pub use extractor::{
  AutoExtractor, CodeFieldExtractor, MarkerLineExtractor, SnippetExtractor, extractor_for, snippet_after_marker,
};
