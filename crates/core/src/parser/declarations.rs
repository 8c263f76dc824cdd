//! Collects the names each block binds and the documentation of every
//! function and class.

use std::ops::Range;

use tracing::debug;

use super::utils::{
    clean_docstring, comment_text, is_close, is_open, normalize_tokens, parse_parameters,
    split_top_level,
};
use crate::types::{
    BlockId, BlockKind, BlockTree, Declaration, DeclarationKind, DocEntry, Token,
    TokenKind,
};

const AUGMENTED_ASSIGNMENTS: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "|=", "^=", "@=",
];

pub struct DeclarationExtractor<'t> {
    tokens: &'t [Token],
}

impl<'t> DeclarationExtractor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens }
    }

    /// Fill every block's `declared_names` and return the documentation
    /// entries in source order
    pub fn extract(&self, tree: &mut BlockTree) -> Vec<DocEntry> {
        let order: Vec<BlockId> = tree.preorder().iter().map(|block| block.id).collect();
        let mut pending: Vec<Declaration> = Vec::new();
        let mut docs = Vec::new();

        for id in order {
            let block = tree.get(id);
            let owner = tree.scope_of(id);

            match block.kind {
                BlockKind::Function | BlockKind::Class => {
                    if let Some(parent) = block.parent {
                        if let Some(name) = self.name_token(block.header.clone()) {
                            let kind = if block.kind == BlockKind::Function {
                                DeclarationKind::Function
                            } else {
                                DeclarationKind::Class
                            };
                            pending.push(declaration(name, kind, tree.scope_of(parent)));
                        }
                    }
                    if block.kind == BlockKind::Function {
                        for parameter in parse_parameters(&self.tokens[block.header.clone()]) {
                            pending.push(Declaration {
                                name: parameter.name,
                                kind: DeclarationKind::Parameter,
                                defined_at_line: parameter.line,
                                column: parameter.column,
                                default_value: parameter.default_value,
                                owning_block: id,
                            });
                        }
                    }
                    if let Some(entry) = self.doc_entry(tree, id) {
                        docs.push(entry);
                    }
                }
                BlockKind::Control => {
                    self.header_bindings(&self.tokens[block.header.clone()], owner, &mut pending);
                }
                BlockKind::Module => {}
            }

            for statement in &block.statements {
                for simple in split_top_level(&self.tokens[statement.clone()], ";") {
                    self.statement_bindings(simple, owner, &mut pending);
                }
            }
        }

        debug!(
            "extracted {} declarations and {} doc entries",
            pending.len(),
            docs.len()
        );
        for declaration in pending {
            tree.get_mut(declaration.owning_block)
                .declared_names
                .push(declaration);
        }
        for index in 0..tree.len() {
            tree.get_mut(BlockId(index))
                .declared_names
                .sort_by_key(|d| (d.defined_at_line, d.column));
        }
        docs
    }

    /// Identifier following `def` or `class` in a header
    fn name_token(&self, header: Range<usize>) -> Option<&'t Token> {
        let header = &self.tokens[header];
        let keyword = header
            .iter()
            .position(|t| t.is_keyword("def") || t.is_keyword("class"))?;
        header.get(keyword + 1).filter(|t| t.is_identifier())
    }

    fn doc_entry(&self, tree: &BlockTree, id: BlockId) -> Option<DocEntry> {
        let block = tree.get(id);
        let name = block.name.clone()?;
        let kind = tree.symbol_kind(id)?;
        Some(DocEntry {
            symbol_name: name,
            qualified_path: tree.qualified_path(id),
            signature: normalize_tokens(&self.tokens[block.header.clone()]),
            doc_text: self.documentation(tree, id),
            defined_at_line: block.start_line,
            kind,
        })
    }

    /// First docstring or contiguous comment run directly after the header
    fn documentation(&self, tree: &BlockTree, id: BlockId) -> Option<String> {
        let block = tree.get(id);
        let header_end_line = self.tokens[block.header.clone()]
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Comment)
            .map(Token::end_line)?;

        let mut comments: Vec<&Token> = Vec::new();
        let mut indented = false;
        let body = &self.tokens[block.header.end..];
        for (offset, token) in body.iter().enumerate() {
            match token.kind {
                TokenKind::Comment if token.line == header_end_line && comments.is_empty() => {}
                TokenKind::Comment => {
                    let expected = comments.last().map_or(header_end_line + 1, |c| c.line + 1);
                    if token.line != expected || !block.contains_line(token.line) {
                        break;
                    }
                    comments.push(token);
                }
                TokenKind::Newline => {}
                TokenKind::Indent => indented = true,
                _ if !comments.is_empty() => break,
                TokenKind::Literal if token.is_string_literal() => {
                    let inline = token.line == header_end_line;
                    let alone = body.get(offset + 1).is_none_or(|next| {
                        matches!(next.kind, TokenKind::Newline | TokenKind::Comment)
                            || next.is_delimiter(";")
                    });
                    if (inline || indented) && alone {
                        return Some(clean_docstring(&token.text));
                    }
                    return None;
                }
                _ => return None,
            }
        }

        if comments.is_empty() {
            return None;
        }
        Some(
            comments
                .iter()
                .map(|c| comment_text(&c.text))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Targets bound by a control header: `for` targets and `as` clauses
    fn header_bindings(&self, header: &[Token], owner: BlockId, out: &mut Vec<Declaration>) {
        let significant: Vec<&Token> = header.iter().filter(|t| t.is_significant()).collect();
        let owned: Vec<Token> = significant.iter().map(|t| (*t).clone()).collect();
        for name in comprehension_targets(&owned) {
            out.push(declaration(name, DeclarationKind::Variable, owner));
        }

        let start = if significant.first().is_some_and(|t| t.is_keyword("async")) {
            1
        } else {
            0
        };

        if significant.get(start).is_some_and(|t| t.is_keyword("for")) {
            let targets: Vec<Token> = significant[start + 1..]
                .iter()
                .take_while(|t| !t.is_keyword("in"))
                .map(|t| (*t).clone())
                .collect();
            for name in target_names(&targets) {
                out.push(declaration(name, DeclarationKind::Variable, owner));
            }
            return;
        }

        self.as_bindings(&owned, DeclarationKind::Variable, owner, out);
    }

    fn as_bindings(
        &self,
        tokens: &[Token],
        kind: DeclarationKind,
        owner: BlockId,
        out: &mut Vec<Declaration>,
    ) {
        let mut index = 0;
        while index < tokens.len() {
            if !tokens[index].is_keyword("as") {
                index += 1;
                continue;
            }
            // the target runs to the next `,` or `:` at its own bracket depth,
            // or to the bracket that encloses the whole item
            let mut depth = 0i32;
            let end = tokens[index + 1..]
                .iter()
                .position(|t| {
                    if is_open(t) {
                        depth += 1;
                    } else if is_close(t) {
                        depth -= 1;
                    }
                    depth < 0 || (depth == 0 && (t.is_delimiter(",") || t.is_delimiter(":")))
                })
                .map_or(tokens.len(), |offset| index + 1 + offset);
            for name in target_names(&tokens[index + 1..end]) {
                out.push(declaration(name, kind, owner));
            }
            index = end;
        }
    }

    fn statement_bindings(&self, statement: &[Token], owner: BlockId, out: &mut Vec<Declaration>) {
        let tokens: Vec<Token> = statement
            .iter()
            .filter(|t| t.is_significant())
            .cloned()
            .collect();
        for name in comprehension_targets(&tokens) {
            out.push(declaration(name, DeclarationKind::Variable, owner));
        }
        let Some(first) = tokens.first() else {
            return;
        };

        if first.is_keyword("import") {
            for clause in split_top_level(&tokens[1..], ",") {
                if let Some(alias) = alias_of(clause) {
                    out.push(declaration(alias, DeclarationKind::Import, owner));
                } else if let Some(module) = clause.first().filter(|t| t.is_identifier()) {
                    out.push(declaration(module, DeclarationKind::Import, owner));
                }
            }
            return;
        }

        if first.is_keyword("from") {
            let Some(import) = tokens.iter().position(|t| t.is_keyword("import")) else {
                return;
            };
            let names: Vec<Token> = tokens[import + 1..]
                .iter()
                .filter(|t| !t.is_delimiter("(") && !t.is_delimiter(")"))
                .cloned()
                .collect();
            for clause in split_top_level(&names, ",") {
                if let Some(alias) = alias_of(clause) {
                    out.push(declaration(alias, DeclarationKind::Import, owner));
                } else if let [name] = clause {
                    if name.is_identifier() {
                        out.push(declaration(name, DeclarationKind::Import, owner));
                    }
                }
            }
            return;
        }

        if first.kind == TokenKind::Keyword {
            return;
        }

        let assignments = split_top_level(&tokens, "=");
        if assignments.len() > 1 {
            for target in &assignments[..assignments.len() - 1] {
                let target = annotation_target(target);
                for name in target_names(target) {
                    out.push(declaration(name, DeclarationKind::Variable, owner));
                }
            }
            return;
        }

        let augmented = tokens.iter().position(|t| {
            t.kind == TokenKind::Delimiter && AUGMENTED_ASSIGNMENTS.contains(&t.text.as_str())
        });
        if let Some(operator) = augmented {
            if let [name] = &tokens[..operator] {
                if name.is_identifier() {
                    out.push(declaration(name, DeclarationKind::Variable, owner));
                }
            }
            return;
        }

        // bare annotation: `x: int`
        let annotated = split_top_level(&tokens, ":");
        if annotated.len() > 1 {
            if let [name] = annotated[0] {
                if name.is_identifier() {
                    out.push(declaration(name, DeclarationKind::Variable, owner));
                }
            }
        }
    }
}

fn declaration(token: &Token, kind: DeclarationKind, owner: BlockId) -> Declaration {
    Declaration {
        name: token.text.clone(),
        kind,
        defined_at_line: token.line,
        column: token.column,
        default_value: None,
        owning_block: owner,
    }
}

/// `name as alias` → alias token
fn alias_of(clause: &[Token]) -> Option<&Token> {
    let position = clause.iter().position(|t| t.is_keyword("as"))?;
    clause.get(position + 1).filter(|t| t.is_identifier())
}

/// Strip an annotation from an assignment target: `x: int` → `x`
fn annotation_target(target: &[Token]) -> &[Token] {
    split_top_level(target, ":")
        .into_iter()
        .next()
        .unwrap_or(target)
}

/// Names bound by an assignment target, unpacking tuples and lists.
/// Attribute, subscript and call targets bind nothing.
fn target_names(target: &[Token]) -> Vec<&Token> {
    let elements = split_top_level(target, ",");
    let mut names = Vec::new();
    for element in elements {
        let element = match element.first() {
            Some(first) if first.is_delimiter("*") => &element[1..],
            _ => element,
        };
        match element {
            [] => {}
            [name] if name.is_identifier() => names.push(name),
            [open, inner @ .., close]
                if (open.is_delimiter("(") && close.is_delimiter(")"))
                    || (open.is_delimiter("[") && close.is_delimiter("]")) =>
            {
                if super::utils::matching_close(element, 0) == Some(element.len() - 1) {
                    names.extend(target_names(inner));
                }
            }
            _ => {}
        }
    }
    names
}

/// Targets of the `for ... in` clauses of comprehensions and generator
/// expressions, i.e. every `for` nested inside brackets
fn comprehension_targets(tokens: &[Token]) -> Vec<&Token> {
    let mut names = Vec::new();
    let mut depth = 0i32;
    for (index, token) in tokens.iter().enumerate() {
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
        } else if depth > 0 && token.is_keyword("for") {
            let mut inner = 0i32;
            let end = tokens[index + 1..]
                .iter()
                .position(|t| {
                    if is_open(t) {
                        inner += 1;
                    } else if is_close(t) {
                        inner -= 1;
                    }
                    inner < 0 || (inner == 0 && t.is_keyword("in"))
                })
                .map_or(tokens.len(), |offset| index + 1 + offset);
            names.extend(target_names(&tokens[index + 1..end]));
        }
    }
    names
}
