use tracing::trace;

use crate::{
    error::Result,
    snapshot::ParsedSnapshot,
    types::{BlockId, Occurrence, Token, TokenKind},
};

type Position = (u32, u32);

impl ParsedSnapshot {
    /// Every spelling of the name under the cursor that refers to the same
    /// binding.
    ///
    /// The search is limited to the block declaring the name and to the
    /// stretch between the binding in effect at the cursor and the next
    /// rebinding. Nested functions and classes that bind the name themselves
    /// are skipped. Returns nothing when the cursor is not on a known name.
    pub fn occurrences(&self, line: u32, column: u32) -> Result<Vec<Occurrence>> {
        self.check_line(line)?;

        let Some(target) = self.identifier_at(line, column) else {
            return Ok(Vec::new());
        };
        let name = target.text.as_str();
        let Some(scope) = self.declaring_scope(name, line) else {
            trace!("{} is not declared around line {}", name, line);
            return Ok(Vec::new());
        };
        let scope_block = self.tree.get(scope);

        let cursor = (line, column);
        let bindings: Vec<Position> = scope_block
            .declared_names
            .iter()
            .filter(|d| d.name == name)
            .map(|d| (d.defined_at_line, d.column))
            .collect();
        let lower = bindings
            .iter()
            .copied()
            .filter(|binding| *binding <= cursor)
            .max()
            .unwrap_or((scope_block.start_line, 0));
        let upper = bindings
            .iter()
            .copied()
            .filter(|binding| *binding > cursor)
            .min()
            .unwrap_or((scope_block.end_line + 1, 0));

        let found: Vec<Occurrence> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.kind == TokenKind::Identifier && token.text == name)
            .filter(|(_, token)| {
                let position = (token.line, token.column);
                position >= lower && position < upper
            })
            .filter(|(index, _)| !self.is_attribute(*index))
            .filter(|(_, token)| self.resolves_to(token, scope))
            .map(|(_, token)| Occurrence {
                line: token.line,
                column: token.column,
                length: token.text.chars().count() as u32,
            })
            .collect();
        trace!("{} occurrences of {} in block {:?}", found.len(), name, scope);
        Ok(found)
    }

    fn identifier_at(&self, line: u32, column: u32) -> Option<&Token> {
        self.tokens.iter().find(|token| {
            token.kind == TokenKind::Identifier
                && token.line == line
                && column >= token.column
                && column < token.end_column()
        })
    }

    /// Nearest scope on the cursor's ancestor chain that binds `name`
    fn declaring_scope(&self, name: &str, line: u32) -> Option<BlockId> {
        self.tree
            .ancestors(self.tree.innermost_at(line))
            .find(|block| block.declared_names.iter().any(|d| d.name == name))
            .map(|block| block.id)
    }

    /// `obj.name` refers to an attribute, not to the binding
    fn is_attribute(&self, index: usize) -> bool {
        index > 0 && self.tokens[index - 1].is_delimiter(".")
    }

    /// Whether `token` reaches `scope` without passing through a nested
    /// block that binds the same name
    fn resolves_to(&self, token: &Token, scope: BlockId) -> bool {
        for block in self.tree.ancestors(self.tree.innermost_at(token.line)) {
            if block.id == scope {
                return true;
            }
            if block.declared_names.iter().any(|d| d.name == token.text) {
                return false;
            }
        }
        false
    }
}
