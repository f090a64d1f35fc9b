//! Tree checks run before rendering
//!
//! The tree-sitter grammar is more permissive than CPython. It keeps the
//! Python 2 `print`/`exec` statements and accepts parameter and argument
//! orders the compiler refuses. Those are reported as syntax errors here.
//! The walk uses an explicit stack and caps the tree depth, which bounds the
//! recursion of the renderer.

use tree_sitter::Node;

use crate::ParseError;

/// Deepest syntax tree accepted for rendering
pub const MAX_TREE_DEPTH: usize = 1000;

const PYTHON2_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Returns the first problem in document order, if any
pub(crate) fn check_tree(root: Node) -> Result<(), ParseError> {
  let mut stack = vec![(root, 0usize)];
  while let Some((node, depth)) = stack.pop() {
    if depth > MAX_TREE_DEPTH {
      return Err(ParseError::TooDeep {
        line: node.start_position().row + 1,
        limit: MAX_TREE_DEPTH,
      });
    }
    if node.is_error() || node.is_missing() || PYTHON2_STATEMENTS.contains(&node.kind()) {
      return Err(syntax_error(node));
    }
    match node.kind() {
      "parameters" | "lambda_parameters" => check_parameters(node)?,
      "argument_list" => check_arguments(node)?,
      _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    // Reversed so the first child is popped first
    stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
  }
  Ok(())
}

fn syntax_error(node: Node) -> ParseError {
  let pos = node.start_position();
  ParseError::Syntax {
    line: pos.row + 1,
    column: pos.column + 1,
  }
}

/// A parameter without a default may not follow one with a default, unless
/// it is keyword-only (after `*` or `*args`)
fn check_parameters(params: Node) -> Result<(), ParseError> {
  let mut seen_default = false;
  let mut cursor = params.walk();
  for param in params.named_children(&mut cursor).filter(|n| !n.is_extra()) {
    let kind = match param.kind() {
      // `*args: T` and `**kw: T` are typed parameters wrapping a splat
      "typed_parameter" => param
        .named_child(0)
        .map(|inner| inner.kind())
        .filter(|k| k.ends_with("splat_pattern"))
        .unwrap_or("typed_parameter"),
      kind => kind,
    };
    match kind {
      "default_parameter" | "typed_default_parameter" => seen_default = true,
      "list_splat_pattern" | "keyword_separator" => return Ok(()),
      // Python 2 tuple parameters
      "tuple_pattern" => return Err(syntax_error(param)),
      "identifier" | "typed_parameter" if seen_default => return Err(syntax_error(param)),
      _ => {}
    }
  }
  Ok(())
}

/// Positional arguments may not follow keyword arguments or `**`, and `*`
/// may not follow `**`
fn check_arguments(args: Node) -> Result<(), ParseError> {
  let mut seen_keyword = false;
  let mut seen_dict_splat = false;
  let mut cursor = args.walk();
  for arg in args.named_children(&mut cursor).filter(|n| !n.is_extra()) {
    match arg.kind() {
      "keyword_argument" => seen_keyword = true,
      "dictionary_splat" => seen_dict_splat = true,
      "list_splat" if seen_dict_splat => return Err(syntax_error(arg)),
      "list_splat" => {}
      _ if seen_keyword || seen_dict_splat => return Err(syntax_error(arg)),
      _ => {}
    }
  }
  Ok(())
}
