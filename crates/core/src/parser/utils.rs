use crate::types::{Token, TokenKind};

/// A parameter parsed out of a `def` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub line: u32,
    pub column: u32,
    pub default_value: Option<String>,
}

pub(crate) fn is_open(token: &Token) -> bool {
    token.kind == TokenKind::Delimiter && matches!(token.text.as_str(), "(" | "[" | "{")
}

pub(crate) fn is_close(token: &Token) -> bool {
    token.kind == TokenKind::Delimiter && matches!(token.text.as_str(), ")" | "]" | "}")
}

/// Rebuild source text from tokens with whitespace collapsed.
///
/// A single space is kept wherever the source had any whitespace between two
/// tokens, except directly inside brackets and before `,` or `:`. Comments
/// and layout tokens are dropped.
pub fn normalize_tokens(tokens: &[Token]) -> String {
    let mut text = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens.iter().filter(|t| t.is_significant()) {
        if let Some(prev) = previous {
            let gap = token.line != prev.end_line() || token.column > prev.end_column();
            let glued = is_open(prev)
                || is_close(token)
                || token.is_delimiter(",")
                || token.is_delimiter(":");
            if gap && !glued {
                text.push(' ');
            }
        }
        text.push_str(&token.text);
        previous = Some(token);
    }
    text
}

/// Split `tokens` at every top-level occurrence of `delimiter`
pub fn split_top_level<'a>(tokens: &'a [Token], delimiter: &str) -> Vec<&'a [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
        } else if depth == 0 && token.is_delimiter(delimiter) {
            parts.push(&tokens[start..index]);
            start = index + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Index of the bracket closing the one opened at `open`
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Parameters of a `def` header, in declaration order.
///
/// Bare `*` and `/` markers are skipped, annotations ignored and defaults
/// kept as normalized text.
pub fn parse_parameters(header: &[Token]) -> Vec<Parameter> {
    let header: Vec<Token> = header
        .iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .cloned()
        .collect();
    let Some(def) = header.iter().position(|t| t.is_keyword("def")) else {
        return Vec::new();
    };
    let Some(open) = header[def..].iter().position(|t| t.is_delimiter("(")).map(|i| def + i)
    else {
        return Vec::new();
    };
    let close = matching_close(&header, open).unwrap_or(header.len());
    let inner = &header[open + 1..close.max(open + 1)];

    split_top_level(inner, ",")
        .into_iter()
        .filter_map(|segment| {
            let segment: Vec<&Token> = segment
                .iter()
                .skip_while(|t| t.is_delimiter("*") || t.is_delimiter("**"))
                .collect();
            let name = segment.first().filter(|t| t.is_identifier())?;
            let default_value = segment
                .iter()
                .position(|t| t.is_delimiter("="))
                .map(|eq| {
                    let rest: Vec<Token> = segment[eq + 1..].iter().map(|t| (*t).clone()).collect();
                    normalize_tokens(&rest)
                })
                .filter(|text| !text.is_empty());
            Some(Parameter {
                name: name.text.clone(),
                line: name.line,
                column: name.column,
                default_value,
            })
        })
        .collect()
}

/// Text of a docstring literal with its prefix and quotes removed and its
/// indentation cleaned
pub fn clean_docstring(literal: &str) -> String {
    let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find(|quote| body.len() >= quote.len() * 2 && body.starts_with(**quote) && body.ends_with(**quote))
        .map(|quote| &body[quote.len()..body.len() - quote.len()])
        .unwrap_or(body);

    let expanded = body.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    if let Some(first) = lines.first() {
        cleaned.push(first.trim().to_string());
    }
    for line in lines.iter().skip(1) {
        let stripped = if line.len() >= indent { &line[indent..] } else { line.trim_start() };
        cleaned.push(stripped.trim_end().to_string());
    }
    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

/// Text of a `#` comment without the marker
pub fn comment_text(comment: &str) -> String {
    let text = comment.strip_prefix('#').unwrap_or(comment);
    text.strip_prefix(' ').unwrap_or(text).trim_end().to_string()
}
