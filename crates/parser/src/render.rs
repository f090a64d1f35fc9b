//! Canonical source printer over the tree-sitter Python syntax tree
//!
//! Statements are emitted one per line with four-space indentation per block
//! level. Within a statement the leaf tokens are re-joined with canonical
//! spacing. String literals are copied verbatim so their values never change.
//! Comments and line continuations are extras in the grammar and are dropped.

use tree_sitter::Node;

use crate::ParseError;

const INDENT: &str = "    ";

/// Clauses that hang off a compound statement at the statement's own depth
const CLAUSES: &[&str] = &[
  "elif_clause",
  "else_clause",
  "except_clause",
  "except_group_clause",
  "finally_clause",
  "case_clause",
];

/// Nodes copied verbatim rather than re-tokenized
const ATOMIC: &[&str] = &["string"];

/// Parents whose `*`, `**` or `@` binds tightly to the following operand
const PREFIX_PARENTS: &[&str] = &[
  "list_splat",
  "dictionary_splat",
  "list_splat_pattern",
  "dictionary_splat_pattern",
  "splat_pattern",
  "decorator",
];

/// Parents whose `=` is written without surrounding spaces
const TIGHT_ASSIGN_PARENTS: &[&str] = &["keyword_argument", "default_parameter", "keyword_pattern"];

const HARD_KEYWORDS: &[&str] = &[
  "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
  "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
  "pass", "raise", "return", "try", "while", "with", "yield",
];

#[derive(Debug, Clone, Copy)]
struct Token<'s> {
  text: &'s str,
  kind: &'static str,
  parent: &'static str,
}

impl Token<'_> {
  fn is_name(&self) -> bool {
    let mut chars = self.text.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
      && chars.all(|c| c.is_alphanumeric() || c == '_')
      && !HARD_KEYWORDS.contains(&self.text)
  }
}

/// Whether a space separates `prev` and `next` in the canonical rendering
fn needs_space(prev: &Token, next: &Token) -> bool {
  // Tokens that bind to whatever follows
  if matches!(prev.kind, "(" | "[" | "{") {
    return false;
  }
  if prev.kind == "." {
    return next.kind == "import";
  }
  if matches!(prev.kind, "-" | "+" | "~") && prev.parent == "unary_operator" {
    return false;
  }
  if matches!(prev.kind, "*" | "**" | "@") && PREFIX_PARENTS.contains(&prev.parent) {
    return false;
  }
  if prev.kind == ":" && prev.parent == "slice" {
    return false;
  }
  if prev.kind == "=" && TIGHT_ASSIGN_PARENTS.contains(&prev.parent) {
    return false;
  }

  // Tokens that bind to whatever precedes
  match next.kind {
    ")" | "]" | "}" | "," | ";" | ":" => false,
    "=" => !TIGHT_ASSIGN_PARENTS.contains(&next.parent),
    // `1 .real` must keep its space or the lexer reads a float
    "." => prev.kind == "integer" || prev.kind == "from",
    "(" | "[" => !(prev.is_name() || matches!(prev.kind, ")" | "]" | "}" | "string")),
    _ => true,
  }
}

fn join(tokens: &[Token]) -> String {
  let mut line = String::new();
  let mut prev: Option<&Token> = None;
  for token in tokens.iter().filter(|t| !t.text.is_empty()) {
    if let Some(p) = prev
      && needs_space(p, token)
    {
      line.push(' ');
    }
    line.push_str(token.text);
    prev = Some(token);
  }
  line
}

/// Renders a tree that passed `check_tree` back to source. The depth cap
/// applied there bounds the recursion here.
pub(crate) struct Renderer<'s> {
  source: &'s str,
  out: String,
}

impl<'s> Renderer<'s> {
  pub(crate) fn new(source: &'s str) -> Self {
    Self {
      source,
      out: String::with_capacity(source.len() + 16),
    }
  }

  pub(crate) fn render_module(mut self, module: Node) -> Result<String, ParseError> {
    let mut cursor = module.walk();
    let statements: Vec<Node> = module.named_children(&mut cursor).filter(|n| !n.is_extra()).collect();
    for statement in statements {
      self.statement(statement, 0)?;
    }
    Ok(self.out)
  }

  fn text(&self, node: Node) -> &'s str {
    self.source.get(node.byte_range()).unwrap_or_default()
  }

  fn line(&mut self, depth: usize, text: &str) {
    for _ in 0..depth {
      self.out.push_str(INDENT);
    }
    self.out.push_str(text);
    self.out.push('\n');
  }

  fn statement(&mut self, node: Node, depth: usize) -> Result<(), ParseError> {
    if node.kind() == "decorated_definition" {
      return self.decorated(node, depth);
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).filter(|n| !n.is_extra()).collect();
    let compound = children
      .iter()
      .any(|c| c.kind() == "block" || CLAUSES.contains(&c.kind()));

    if !compound {
      let mut tokens = Vec::new();
      self.collect(node, "", &mut tokens);
      self.line(depth, &join(&tokens));
      return Ok(());
    }

    let mut header = Vec::new();
    for child in children {
      match child.kind() {
        "block" => {
          self.line(depth, &join(&header));
          header.clear();
          self.block(child, depth + 1)?;
        }
        kind if CLAUSES.contains(&kind) => self.statement(child, depth)?,
        _ => self.collect(child, node.kind(), &mut header),
      }
    }
    if !header.is_empty() {
      self.line(depth, &join(&header));
    }
    Ok(())
  }

  fn decorated(&mut self, node: Node, depth: usize) -> Result<(), ParseError> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).filter(|n| !n.is_extra()).collect();
    for child in children {
      if child.kind() == "decorator" {
        let mut tokens = Vec::new();
        self.collect(child, node.kind(), &mut tokens);
        self.line(depth, &join(&tokens));
      } else {
        self.statement(child, depth)?;
      }
    }
    Ok(())
  }

  fn block(&mut self, block: Node, depth: usize) -> Result<(), ParseError> {
    let mut cursor = block.walk();
    let statements: Vec<Node> = block.named_children(&mut cursor).filter(|n| !n.is_extra()).collect();
    if statements.is_empty() {
      return Err(ParseError::EmptyBlock {
        line: block.start_position().row + 1,
      });
    }
    for statement in statements {
      self.statement(statement, depth)?;
    }
    Ok(())
  }

  /// Flatten a node into leaf tokens, tagging each with its parent's kind
  fn collect(&self, node: Node, parent: &'static str, tokens: &mut Vec<Token<'s>>) {
    if node.is_extra() {
      return;
    }
    if node.child_count() == 0 || ATOMIC.contains(&node.kind()) {
      tokens.push(Token {
        text: self.text(node),
        kind: node.kind(),
        parent,
      });
      return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
      self.collect(child, node.kind(), tokens);
    }
  }
}
