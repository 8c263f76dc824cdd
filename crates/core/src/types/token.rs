use serde::{Deserialize, Serialize};

/// Classification of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Delimiter,
    Comment,
    Indent,
    Dedent,
    Newline,
    /// Placeholder for a stretch of input the tokenizer could not read.
    /// Only produced in recovery mode.
    Error,
    Eof,
}

/// A single token with its position in the source.
///
/// `line` is 1-based, `column` is the 0-based character offset in that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    pub fn is_delimiter(&self, delimiter: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == delimiter
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// Tokens that carry source text (everything except layout markers and comments)
    pub fn is_significant(&self) -> bool {
        !matches!(
            self.kind,
            TokenKind::Comment
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::Newline
                | TokenKind::Eof
        )
    }

    pub fn is_string_literal(&self) -> bool {
        self.kind == TokenKind::Literal && self.text.ends_with(['"', '\''])
    }

    /// Column just past the last character of this token
    pub fn end_column(&self) -> u32 {
        match self.text.rfind('\n') {
            Some(pos) => self.text[pos + 1..].chars().count() as u32,
            None => self.column + self.text.chars().count() as u32,
        }
    }

    /// Line of the last character of this token (multi-line strings span lines)
    pub fn end_line(&self) -> u32 {
        self.line + self.text.matches('\n').count() as u32
    }
}
