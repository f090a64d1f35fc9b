//! PythonNormalizer implementation

use tracing::trace;
use tree_sitter::Parser;

use crate::{ParseError, checks::check_tree, render::Renderer};

/// Parses Python snippets and regenerates canonical source.
///
/// Holds a single tree-sitter parser that is reused across snippets.
pub struct PythonNormalizer {
  parser: Parser,
}

impl PythonNormalizer {
  /// Create a normalizer with the Python grammar loaded
  pub fn new() -> Result<Self, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
    Ok(Self { parser })
  }

  /// Parse `source` and return its canonical rendering.
  ///
  /// Fails with the first syntax error location when the grammar rejects
  /// the snippet or it uses syntax Python 3 refuses. Never panics on
  /// malformed input, and nesting past [`MAX_TREE_DEPTH`] is an error rather
  /// than a stack overflow.
  ///
  /// [`MAX_TREE_DEPTH`]: crate::MAX_TREE_DEPTH
  pub fn normalize(&mut self, source: &str) -> Result<String, ParseError> {
    let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();

    if let Err(err) = check_tree(root) {
      trace!(error = %err, "Snippet failed to parse");
      return Err(err);
    }

    let rendered = Renderer::new(source).render_module(root)?;
    trace!(
      source_len = source.len(),
      rendered_len = rendered.len(),
      "Normalized snippet"
    );
    Ok(rendered)
  }
}

/// Normalize with a throwaway parser
pub fn normalize(source: &str) -> Result<String, ParseError> {
  PythonNormalizer::new()?.normalize(source)
}
