use thiserror::Error;

/// Why a snippet could not be normalized
#[derive(Debug, Error)]
pub enum ParseError {
  #[error("Failed to load Python grammar: {0}")]
  Grammar(#[from] tree_sitter::LanguageError),

  #[error("Parser produced no tree")]
  NoTree,

  #[error("Syntax error at line {line}, column {column}")]
  Syntax { line: usize, column: usize },

  #[error("Nesting deeper than {limit} levels at line {line}")]
  TooDeep { line: usize, limit: usize },

  #[error("Expected an indented block at line {line}")]
  EmptyBlock { line: usize },
}
