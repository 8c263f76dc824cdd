use std::ops::Range;

use tracing::{debug, warn};

use crate::error::StructuralError;
use crate::types::{BlockId, BlockKind, BlockTree, Token, TokenKind};

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
];

/// Soft keywords that only open a block when the line ends with `:`
const SOFT_CONTROL_KEYWORDS: &[&str] = &["match", "case"];

/// Result of grouping tokens into blocks
#[derive(Debug)]
pub struct BlockStructure {
    pub tree: BlockTree,
    /// Blocks that had to be closed without a body
    pub warnings: Vec<StructuralError>,
}

/// What a statement's leading tokens say about it
struct Header {
    kind: BlockKind,
    name: Option<String>,
    /// Index of the `:` that ends the header, relative to the statement
    colon: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    id: BlockId,
    /// Indentation level of the block's body
    depth: usize,
}

/// Builds the block tree from a token stream.
///
/// A stack of open blocks is seeded with the module. Headers push a new block
/// once their INDENT arrives; DEDENTs pop every block whose body is deeper
/// than the new indentation level.
pub struct BlockBuilder<'t> {
    tokens: &'t [Token],
    tree: BlockTree,
    stack: Vec<OpenBlock>,
    depth: usize,
    /// Header that ended with `:` and is waiting for its INDENT
    awaiting_body: Option<BlockId>,
    warnings: Vec<StructuralError>,
    line_count: u32,
}

impl<'t> BlockBuilder<'t> {
    pub fn new(tokens: &'t [Token], line_count: u32) -> Self {
        Self {
            tokens,
            tree: BlockTree::new(line_count),
            stack: vec![OpenBlock {
                id: BlockId::ROOT,
                depth: 0,
            }],
            depth: 0,
            awaiting_body: None,
            warnings: Vec::new(),
            line_count: line_count.max(1),
        }
    }

    pub fn build(mut self) -> BlockStructure {
        let tokens = self.tokens;
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Comment => index += 1,
                TokenKind::Indent => {
                    self.depth += 1;
                    match self.awaiting_body.take() {
                        Some(id) => self.stack.push(OpenBlock {
                            id,
                            depth: self.depth,
                        }),
                        None => self.warn(token.line, "unexpected indent"),
                    }
                    index += 1;
                }
                TokenKind::Dedent => {
                    let line = token.line;
                    self.close_missing_body(line);
                    self.depth = self.depth.saturating_sub(1);
                    while self.stack.len() > 1
                        && self.stack.last().is_some_and(|open| open.depth > self.depth)
                    {
                        if let Some(open) = self.stack.pop() {
                            self.close(open.id, line.saturating_sub(1));
                        }
                    }
                    index += 1;
                }
                _ => {
                    let end = self.statement_end(index);
                    self.close_missing_body(token.line);
                    self.statement(index..end);
                    index = end;
                }
            }
        }

        let last_line = self.line_count;
        if let Some(id) = self.awaiting_body.take() {
            let start = self.tree.get(id).start_line;
            self.close(id, last_line);
            self.warn(start, "unterminated block: expected an indented body before end of input");
        }
        while self.stack.len() > 1 {
            if let Some(open) = self.stack.pop() {
                let start = self.tree.get(open.id).start_line;
                self.close(open.id, last_line);
                self.warn(start, "unterminated block at end of input");
            }
        }

        debug!(
            "built {} blocks with {} structural warnings",
            self.tree.len(),
            self.warnings.len()
        );
        BlockStructure {
            tree: self.tree,
            warnings: self.warnings,
        }
    }

    fn warn(&mut self, line: u32, reason: &str) {
        warn!("line {}: {}", line, reason);
        self.warnings.push(StructuralError::new(line, reason));
    }

    fn current(&self) -> BlockId {
        self.stack.last().map(|open| open.id).unwrap_or(BlockId::ROOT)
    }

    /// Index of the NEWLINE (or EOF) ending the statement starting at `start`
    fn statement_end(&self, start: usize) -> usize {
        self.tokens[start..]
            .iter()
            .position(|t| matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
            .map(|offset| start + offset)
            .unwrap_or(self.tokens.len())
    }

    /// A header ended with `:` but the next line did not indent
    fn close_missing_body(&mut self, next_line: u32) {
        if let Some(id) = self.awaiting_body.take() {
            let start = self.tree.get(id).start_line;
            self.close(id, next_line.saturating_sub(1));
            self.warn(start, "expected an indented block");
        }
    }

    fn close(&mut self, id: BlockId, end_line: u32) {
        let block = self.tree.get_mut(id);
        block.end_line = end_line.max(block.end_line).max(block.start_line);
    }

    fn statement(&mut self, range: Range<usize>) {
        let all = self.tokens;
        let tokens = &all[range.clone()];
        let parent = self.current();
        let Some(header) = detect_header(tokens) else {
            self.tree.get_mut(parent).statements.push(range);
            return;
        };

        let start_line = tokens[0].line;
        let last_line = tokens
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Comment)
            .map(Token::end_line)
            .unwrap_or(start_line);
        let id = self.tree.push_child(parent, header.kind, start_line);
        let block = self.tree.get_mut(id);
        block.name = header.name;
        block.end_line = last_line;

        let body_start = match header.colon {
            Some(colon) => range.start + colon + 1,
            None => range.end,
        };
        block.header = range.start..body_start;

        let has_inline_body = all[body_start..range.end]
            .iter()
            .any(|t| t.kind != TokenKind::Comment);
        if header.colon.is_none() {
            self.warn(start_line, "incomplete block header: missing ':'");
        } else if has_inline_body {
            self.tree.get_mut(id).statements.push(body_start..range.end);
        } else {
            self.awaiting_body = Some(id);
        }
    }
}

fn detect_header(tokens: &[Token]) -> Option<Header> {
    let mut significant = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind != TokenKind::Comment);
    let (_, mut first) = significant.next()?;
    let mut name_token = significant.next().map(|(_, t)| t);
    if first.is_keyword("async") {
        first = name_token?;
        name_token = significant.next().map(|(_, t)| t);
    }
    let colon = header_colon(tokens);

    let (kind, name) = if first.is_keyword("def") {
        (BlockKind::Function, name_token.filter(|t| t.is_identifier()))
    } else if first.is_keyword("class") {
        (BlockKind::Class, name_token.filter(|t| t.is_identifier()))
    } else if first.kind == TokenKind::Keyword && CONTROL_KEYWORDS.contains(&first.text.as_str()) {
        (BlockKind::Control, None)
    } else if first.is_identifier()
        && SOFT_CONTROL_KEYWORDS.contains(&first.text.as_str())
        && ends_with_colon(tokens)
        && name_token.is_some_and(|t| !t.is_delimiter(":") && !t.is_delimiter("="))
    {
        (BlockKind::Control, None)
    } else {
        return None;
    };

    Some(Header {
        kind,
        name: name.map(|t| t.text.clone()),
        colon,
    })
}

/// First `:` outside any brackets
fn header_colon(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (index, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Delimiter {
            continue;
        }
        match token.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            ":" if depth <= 0 => return Some(index),
            _ => {}
        }
    }
    None
}

fn ends_with_colon(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .rev()
        .find(|t| t.kind != TokenKind::Comment)
        .is_some_and(|t| t.is_delimiter(":"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize_all;

    fn build(source: &str) -> BlockStructure {
        let (tokens, errors) = tokenize_all(source, false).unwrap();
        assert!(errors.is_empty());
        BlockBuilder::new(&tokens, source.lines().count() as u32).build()
    }

    fn spans(structure: &BlockStructure) -> Vec<(BlockKind, Option<&str>, u32, u32)> {
        structure
            .tree
            .preorder()
            .into_iter()
            .skip(1)
            .map(|b| (b.kind, b.name.as_deref(), b.start_line, b.end_line))
            .collect()
    }

    #[test]
    fn test_match_and_case_open_blocks_only_as_headers() {
        let structure = build("match cmd:\n    case 'go':\n        run()\nmatch = 3\n");
        assert_eq!(
            spans(&structure),
            vec![
                (BlockKind::Control, None, 1, 3),
                (BlockKind::Control, None, 2, 3),
            ]
        );
        assert!(structure.warnings.is_empty());
    }

    #[test]
    fn test_async_def_after_decorator() {
        let structure = build("@cache\nasync def fetch():\n    pass\n");
        assert_eq!(
            spans(&structure),
            vec![(BlockKind::Function, Some("fetch"), 2, 3)]
        );
    }

    #[test]
    fn test_trailing_comment_after_header_colon() {
        let structure = build("def f():  # note\n    pass\n");
        assert_eq!(spans(&structure), vec![(BlockKind::Function, Some("f"), 1, 2)]);
        assert!(structure.warnings.is_empty());
    }

    #[test]
    fn test_header_without_body_before_next_statement() {
        let structure = build("if x:\ny = 1\n");
        assert_eq!(spans(&structure), vec![(BlockKind::Control, None, 1, 1)]);
        assert_eq!(structure.warnings.len(), 1);
        assert_eq!(structure.warnings[0].line, 1);
        assert_eq!(structure.warnings[0].reason, "expected an indented block");
    }

    #[test]
    fn test_incomplete_header_and_unexpected_indent() {
        let structure = build("def broken(a)\n    pass\n");
        assert_eq!(
            spans(&structure),
            vec![(BlockKind::Function, Some("broken"), 1, 1)]
        );
        let reasons: Vec<&str> = structure.warnings.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec!["incomplete block header: missing ':'", "unexpected indent"]
        );
    }

    #[test]
    fn test_multiline_header_starts_on_first_line() {
        let structure = build("def f(a,\n      b):\n    return a\n");
        assert_eq!(spans(&structure), vec![(BlockKind::Function, Some("f"), 1, 3)]);
    }
}
