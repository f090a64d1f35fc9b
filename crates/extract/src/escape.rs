//! Escape-sequence screening
//!
//! Snippets carrying backslash escapes outside the recognized set are dropped
//! before parsing. The parser tolerates sequences that the external validator
//! warns about, so screening them here keeps both tools in agreement.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a backslash and the character it escapes. Matches never overlap,
/// so `\\q` is read as an escaped backslash followed by `q`.
static ESCAPE_PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\\.").unwrap());

/// Characters that may follow a backslash
pub const RECOGNIZED_ESCAPES: &[char] = &['\\', '\'', '"', 'a', 'b', 'f', 'n', 'r', 't', 'v', '0'];

fn is_recognized(escaped: char) -> bool {
  // backslash-newline is a line continuation
  RECOGNIZED_ESCAPES.contains(&escaped) || escaped == '\n' || escaped == '\r'
}

/// Returns the first unrecognized escape sequence in `text`, if any
pub fn find_invalid_escape(text: &str) -> Option<&str> {
  ESCAPE_PAIR
    .find_iter(text)
    .map(|m| m.as_str())
    .find(|seq| seq.chars().nth(1).is_some_and(|c| !is_recognized(c)))
}

/// True when `text` contains an escape sequence outside [`RECOGNIZED_ESCAPES`]
pub fn has_invalid_escape(text: &str) -> bool {
  find_invalid_escape(text).is_some()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_recognized_escapes_pass() {
    for c in RECOGNIZED_ESCAPES {
      let text = format!("s = \"a\\{c}b\"");
      assert!(!has_invalid_escape(&text), "{text} should be accepted");
    }
  }

  #[test]
  fn test_unrecognized_escapes_fail() {
    assert!(has_invalid_escape(r"x = \q"));
    assert!(has_invalid_escape(r#"re.compile("\d+")"#));
    assert!(has_invalid_escape(r#"path = "C:\Users""#));
    assert_eq!(find_invalid_escape(r#"a = "\n\w""#), Some(r"\w"));
  }

  #[test]
  fn test_escaped_backslash_is_consumed() {
    assert!(!has_invalid_escape(r#"p = "C:\\Users""#));
    assert!(!has_invalid_escape(r"x = '\\q'"));
    assert!(has_invalid_escape(r"x = '\\\q'"));
  }

  #[test]
  fn test_line_continuation_and_trailing_backslash() {
    assert!(!has_invalid_escape("x = 1 + \\\n    2"));
    assert!(!has_invalid_escape("x = 1 + \\\r\n    2"));
    assert!(!has_invalid_escape("ends with \\"));
  }

  #[test]
  fn test_no_backslash() {
    assert!(!has_invalid_escape("print(1+1)"));
    assert!(!has_invalid_escape(""));
  }
}
