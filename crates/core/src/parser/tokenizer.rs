//! Hand-written tokenizer for Python source.
//!
//! The tokenizer is lazy: it implements [`Iterator`] and only scans as far as
//! the consumer pulls. Indentation is resolved here, so downstream stages see
//! INDENT/DEDENT markers instead of raw columns. Newlines inside brackets and
//! after a trailing backslash do not end a logical line.

use std::collections::VecDeque;

use tracing::trace;

use crate::error::LexicalError;
use crate::types::{Token, TokenKind};

pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "->", ":=",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", "(", ")", "[", "]", "{", "}", ",", ":",
    ".", ";", "@", "=", "+", "-", "*", "/", "%", "<", ">", "&", "|", "^", "~",
];

const TAB_SIZE: u32 = 8;

/// Tokenize `source` without recovery: the first lexical error ends the stream.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source)
}

/// Tokenize the whole input eagerly.
///
/// With `recovery` set, lexical errors are collected and returned alongside
/// the tokens instead of failing.
pub fn tokenize_all(
    source: &str,
    recovery: bool,
) -> Result<(Vec<Token>, Vec<LexicalError>), LexicalError> {
    let mut tokenizer = Tokenizer::new(source).with_recovery(recovery);
    let mut tokens = Vec::new();
    for token in tokenizer.by_ref() {
        tokens.push(token?);
    }
    Ok((tokens, tokenizer.into_errors()))
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
    column: u32,
}

pub struct Tokenizer<'src> {
    source: &'src str,
    pos: usize,
    line: u32,
    column: u32,
    line_count: u32,
    indent_stack: Vec<u32>,
    /// Open brackets with the position they were opened at
    brackets: Vec<(char, u32, u32)>,
    at_line_start: bool,
    /// A significant token was produced since the last NEWLINE
    line_has_content: bool,
    pending: VecDeque<Token>,
    recovery: bool,
    errors: Vec<LexicalError>,
    finished: bool,
}

impl std::fmt::Debug for Tokenizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("recovery", &self.recovery)
            .finish()
    }
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 0,
            line_count: source.lines().count() as u32,
            indent_stack: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            line_has_content: false,
            pending: VecDeque::new(),
            recovery: false,
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Keep going past lexical errors, emitting an ERROR token for the rest
    /// of the offending line
    pub fn with_recovery(mut self, recovery: bool) -> Self {
        self.recovery = recovery;
        self
    }

    /// Errors tolerated so far in recovery mode
    pub fn errors(&self) -> &[LexicalError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexicalError> {
        self.errors
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    fn text_from(&self, mark: Mark) -> &'src str {
        &self.source[mark.pos..self.pos]
    }

    fn token_from(&self, kind: TokenKind, mark: Mark) -> Token {
        Token::new(kind, self.text_from(mark), mark.line, mark.column)
    }

    fn skip_to_line_end(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
    }

    /// Report `error`. In recovery mode the rest of the line becomes one
    /// ERROR token and scanning resumes at the next NEWLINE.
    fn fail(&mut self, error: LexicalError, start: Mark) -> Option<Result<Token, LexicalError>> {
        if !self.recovery {
            self.finished = true;
            self.pending.clear();
            return Some(Err(error));
        }
        trace!("recovering from lexical error: {}", error);
        self.reset(start);
        self.skip_to_line_end();
        let token = Token::new(
            TokenKind::Error,
            self.text_from(start).trim_end_matches('\r'),
            error.line,
            error.column,
        );
        self.errors.push(error);
        self.brackets.clear();
        self.line_has_content = true;
        Some(Ok(token))
    }

    /// Measure the indentation of a new logical line and queue INDENT/DEDENT
    /// markers. Returns `false` when the line is blank or comment-only.
    fn handle_indentation(&mut self) -> Result<bool, LexicalError> {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => width = 0,
                _ => break,
            }
            self.bump();
        }

        match self.peek() {
            None | Some('\n') | Some('\r') | Some('#') => return Ok(false),
            _ => {}
        }

        let current = self.indent_stack.last().copied().unwrap_or(0);
        if width > current {
            self.indent_stack.push(width);
            self.pending
                .push_back(Token::new(TokenKind::Indent, "", self.line, self.column));
        } else if width < current {
            while self.indent_stack.last().is_some_and(|&level| level > width) {
                self.indent_stack.pop();
                self.pending
                    .push_back(Token::new(TokenKind::Dedent, "", self.line, self.column));
            }
            if self.indent_stack.last().copied().unwrap_or(0) != width {
                return Err(LexicalError::new(
                    self.line,
                    self.column,
                    "unindent does not match any outer indentation level",
                ));
            }
        }
        Ok(true)
    }

    fn lex_comment(&mut self) -> Token {
        let start = self.mark();
        self.skip_to_line_end();
        let mut token = self.token_from(TokenKind::Comment, start);
        token.text.truncate(token.text.trim_end_matches('\r').len());
        token
    }

    fn lex_name(&mut self) -> Result<Token, LexicalError> {
        let start = self.mark();
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let text = self.text_from(start);
        if matches!(self.peek(), Some('"') | Some('\''))
            && STRING_PREFIXES.contains(&text.to_ascii_lowercase().as_str())
        {
            return self.lex_string(start);
        }
        let kind = if KEYWORDS.contains(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(self.token_from(kind, start))
    }

    fn lex_number(&mut self) -> Token {
        let start = self.mark();
        let is_hex = self.source[self.pos..].starts_with("0x") || self.source[self.pos..].starts_with("0X");
        while let Some(c) = self.peek() {
            if matches!(c, 'e' | 'E')
                && !is_hex
                && matches!(self.peek_nth(1), Some('+') | Some('-'))
            {
                self.bump();
                self.bump();
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.bump();
            } else {
                break;
            }
        }
        self.token_from(TokenKind::Literal, start)
    }

    /// Lex a string literal whose prefix (possibly empty) starts at `start`
    /// and whose opening quote is the next character
    fn lex_string(&mut self, start: Mark) -> Result<Token, LexicalError> {
        let Some(quote) = self.peek() else {
            return Err(LexicalError::new(start.line, start.column, "expected string literal"));
        };
        let triple = self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote);
        let before = self.mark();

        if triple {
            self.bump();
            self.bump();
            self.bump();
            loop {
                match self.bump() {
                    None => {
                        self.reset(before);
                        return Err(LexicalError::new(
                            start.line,
                            start.column,
                            "unterminated triple-quoted string literal",
                        ));
                    }
                    Some('\\') => {
                        self.bump();
                    }
                    Some(c) if c == quote
                        && self.peek() == Some(quote)
                        && self.peek_nth(1) == Some(quote) =>
                    {
                        self.bump();
                        self.bump();
                        break;
                    }
                    Some(_) => {}
                }
            }
        } else {
            self.bump();
            loop {
                match self.peek() {
                    None | Some('\n') => {
                        self.reset(before);
                        return Err(LexicalError::new(
                            start.line,
                            start.column,
                            "unterminated string literal",
                        ));
                    }
                    Some('\\') => {
                        self.bump();
                        self.bump();
                    }
                    Some(c) if c == quote => {
                        self.bump();
                        break;
                    }
                    Some(_) => {
                        self.bump();
                    }
                }
            }
        }
        Ok(self.token_from(TokenKind::Literal, start))
    }

    fn lex_operator(&mut self) -> Result<Token, LexicalError> {
        let start = self.mark();
        let rest = &self.source[self.pos..];
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            let c = self.peek().unwrap_or('\0');
            return Err(LexicalError::new(
                start.line,
                start.column,
                format!("invalid character '{c}'"),
            ));
        };
        for _ in 0..op.len() {
            self.bump();
        }

        match *op {
            "(" | "[" | "{" => {
                let open = op.chars().next().unwrap_or('(');
                self.brackets.push((open, start.line, start.column));
            }
            ")" | "]" | "}" => {
                let expected = match *op {
                    ")" => '(',
                    "]" => '[',
                    _ => '{',
                };
                match self.brackets.last() {
                    Some((open, _, _)) if *open == expected => {
                        self.brackets.pop();
                    }
                    _ => {
                        return Err(LexicalError::new(
                            start.line,
                            start.column,
                            format!("unmatched '{op}'"),
                        ));
                    }
                }
            }
            _ => {}
        }
        Ok(self.token_from(TokenKind::Delimiter, start))
    }

    /// Close the stream: pending NEWLINE, one DEDENT per open level, EOF
    fn finish(&mut self) -> Option<Result<Token, LexicalError>> {
        self.finished = true;
        let end_line = self.line_count + 1;
        if let Some((open, line, column)) = self.brackets.pop() {
            let error = LexicalError::new(line, column, format!("'{open}' was never closed"));
            if !self.recovery {
                return Some(Err(error));
            }
            self.errors.push(error);
            self.brackets.clear();
        }
        if self.line_has_content {
            self.pending
                .push_back(Token::new(TokenKind::Newline, "", self.line, self.column));
            self.line_has_content = false;
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending
                .push_back(Token::new(TokenKind::Dedent, "", end_line, 0));
        }
        self.pending
            .push_back(Token::new(TokenKind::Eof, "", end_line, 0));
        self.pending.pop_front().map(Ok)
    }

    fn next_token(&mut self) -> Option<Result<Token, LexicalError>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }

            if self.at_line_start && self.brackets.is_empty() {
                match self.handle_indentation() {
                    Ok(true) => self.at_line_start = false,
                    Ok(false) => {
                        // blank or comment-only line: no layout tokens
                        match self.peek() {
                            None => return self.finish(),
                            Some('#') => return Some(Ok(self.lex_comment())),
                            Some(_) => {
                                self.bump();
                                continue;
                            }
                        }
                    }
                    Err(error) => {
                        self.at_line_start = false;
                        if !self.recovery {
                            self.finished = true;
                            self.pending.clear();
                            return Some(Err(error));
                        }
                        trace!("recovering from lexical error: {}", error);
                        self.errors.push(error.clone());
                        self.pending.push_back(Token::new(
                            TokenKind::Error,
                            "",
                            error.line,
                            error.column,
                        ));
                    }
                }
                continue;
            }

            let Some(c) = self.peek() else {
                return self.finish();
            };
            match c {
                ' ' | '\t' | '\x0c' | '\r' => {
                    self.bump();
                }
                '\\' if matches!(self.peek_nth(1), Some('\n'))
                    || (self.peek_nth(1) == Some('\r') && self.peek_nth(2) == Some('\n')) =>
                {
                    self.bump();
                    if self.peek() == Some('\r') {
                        self.bump();
                    }
                    self.bump();
                }
                '\n' => {
                    if !self.brackets.is_empty() {
                        self.bump();
                        continue;
                    }
                    let token = Token::new(TokenKind::Newline, "\n", self.line, self.column);
                    self.bump();
                    self.at_line_start = true;
                    if self.line_has_content {
                        self.line_has_content = false;
                        return Some(Ok(token));
                    }
                }
                '#' => return Some(Ok(self.lex_comment())),
                _ => {
                    let start = self.mark();
                    let result = if c == '"' || c == '\'' {
                        self.lex_string(start)
                    } else if c.is_ascii_digit()
                        || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
                    {
                        Ok(self.lex_number())
                    } else if c.is_alphabetic() || c == '_' {
                        self.lex_name()
                    } else {
                        self.lex_operator()
                    };
                    return match result {
                        Ok(token) => {
                            self.line_has_content = true;
                            Some(Ok(token))
                        }
                        Err(error) => self.fail(error, start),
                    };
                }
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn test_function_tokens_with_layout() {
        use TokenKind::*;
        let source = "def f(a, b):\n    x = 1\n    return x\n";
        assert_eq!(
            kinds(source),
            vec![
                Keyword, Identifier, Delimiter, Identifier, Delimiter, Identifier, Delimiter,
                Delimiter, Newline, Indent, Identifier, Delimiter, Literal, Newline, Keyword,
                Identifier, Newline, Dedent, Eof,
            ]
        );

        let tokens: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        let dedent = tokens.iter().find(|t| t.kind == Dedent).unwrap();
        assert_eq!(dedent.line, 4);
        let x = &tokens[10];
        assert_eq!((x.text.as_str(), x.line, x.column), ("x", 2, 4));
    }

    #[test]
    fn test_brackets_join_physical_lines() {
        use TokenKind::*;
        let source = "x = (1,\n     2)\ny = 3\n";
        let kinds = kinds(source);
        assert_eq!(kinds.iter().filter(|k| **k == Newline).count(), 2);
        assert!(!kinds.contains(&Indent));
    }

    #[test]
    fn test_backslash_continuation() {
        let source = "total = 1 + \\\n    2\n";
        let tokens: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Indent));
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Newline).count(), 1);
        assert_eq!(tokens[4].text, "2");
        assert_eq!(tokens[4].line, 2);
    }

    #[test]
    fn test_blank_and_comment_lines_have_no_layout() {
        use TokenKind::*;
        let source = "if a:\n\n    # note\n    b = 1\n";
        assert_eq!(
            kinds(source),
            vec![
                Keyword, Identifier, Delimiter, Newline, Comment, Indent, Identifier, Delimiter,
                Literal, Newline, Dedent, Eof,
            ]
        );
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let source = "s = \"\"\"one\ntwo\nthree\"\"\"\nt = 1\n";
        let tokens: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        let literal = &tokens[2];
        assert_eq!(literal.kind, TokenKind::Literal);
        assert_eq!(literal.line, 1);
        assert_eq!(literal.end_line(), 3);
        assert!(literal.is_string_literal());
        assert_eq!(tokens[4].text, "t");
        assert_eq!(tokens[4].line, 4);
    }

    #[test]
    fn test_string_prefixes_and_keywords() {
        let tokens: Vec<Token> = tokenize("x = rb'raw' if None else f\"{y}\"\n")
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens[2].text, "rb'raw'");
        assert_eq!(tokens[2].kind, TokenKind::Literal);
        assert!(tokens[3].is_keyword("if"));
        assert!(tokens[4].is_keyword("None"));
        assert_eq!(tokens[6].text, "f\"{y}\"");
    }

    #[test]
    fn test_multi_character_operators() {
        let texts: Vec<String> = tokenize("a **= b // c -> d := e\n")
            .map(|t| t.unwrap())
            .filter(|t| t.kind == TokenKind::Delimiter)
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["**=", "//", "->", ":="]);
    }

    #[test]
    fn test_unterminated_string_fails_without_recovery() {
        let results: Vec<_> = tokenize("x = 'abc\ny = 1\n").collect();
        assert_eq!(results.len(), 3);
        let error = results[2].clone().unwrap_err();
        assert_eq!((error.line, error.column), (1, 4));
        assert_eq!(error.reason, "unterminated string literal");
    }

    #[test]
    fn test_recovery_resynchronizes_at_next_line() {
        use TokenKind::*;
        let (tokens, errors) = tokenize_all("x = 'abc\ny = 1\n", true).unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Identifier, Delimiter, Error, Newline, Identifier, Delimiter, Literal, Newline, Eof]
        );
        assert_eq!(tokens[2].text, "'abc");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_invalid_character_in_recovery_mode() {
        let (tokens, errors) = tokenize_all("a = $b\nc = 2\n", true).unwrap();
        assert_eq!(errors[0].reason, "invalid character '$'");
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[2].text, "$b");
        assert!(tokens.iter().any(|t| t.text == "c"));
    }

    #[test]
    fn test_inconsistent_dedent_is_reported() {
        let error = tokenize_all("if a:\n    b\n  c\n", false).unwrap_err();
        assert_eq!(error.reason, "unindent does not match any outer indentation level");
        assert_eq!(error.line, 3);

        let (_, errors) = tokenize_all("if a:\n    b\n  c\n", true).unwrap();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unclosed_bracket_at_end_of_input() {
        let error = tokenize_all("f(a,\n", false).unwrap_err();
        assert_eq!(error.reason, "'(' was never closed");
        assert_eq!((error.line, error.column), (1, 1));

        let (tokens, errors) = tokenize_all("f(a,\n", true).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_tokenize_is_restartable() {
        let source = "class A:\n    pass\n";
        let first: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        let second: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        assert_eq!(first, second);
    }
}
