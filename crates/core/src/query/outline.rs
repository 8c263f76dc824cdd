use crate::{
    parser::normalize_tokens,
    snapshot::ParsedSnapshot,
    types::{Block, NavigationItem, Token},
};

const HEADER_PREFIXES: &[&str] = &["async def ", "def ", "class "];

impl ParsedSnapshot {
    /// One outline item per function and class, in source order
    pub fn navigation(&self) -> Vec<NavigationItem> {
        self.tree
            .preorder()
            .into_iter()
            .filter_map(|block| {
                let kind = self.tree.symbol_kind(block.id)?;
                Some(NavigationItem {
                    title: self.title(block),
                    start_line: block.start_line,
                    line_count: block.line_count(),
                    kind,
                })
            })
            .collect()
    }

    /// First line of the header without its keyword. A header continued on
    /// later lines is marked with ` ...`.
    fn title(&self, block: &Block) -> String {
        let header: Vec<Token> = self.tokens[block.header.clone()]
            .iter()
            .filter(|t| t.is_significant())
            .cloned()
            .collect();
        let first_line: Vec<Token> = header
            .iter()
            .filter(|t| t.line == block.start_line)
            .cloned()
            .collect();
        let mut title = normalize_tokens(&first_line);
        for prefix in HEADER_PREFIXES {
            if let Some(rest) = title.strip_prefix(*prefix) {
                title = rest.to_string();
                break;
            }
        }

        let continued = header.len() > first_line.len();
        if continued {
            title.push_str(" ...");
        } else if let Some(stripped) = title.strip_suffix(':') {
            title = stripped.to_string();
        }
        title
    }
}
