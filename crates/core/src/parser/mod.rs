//! Python source parsing: tokens, blocks, declarations

pub mod block_builder;
pub mod declarations;
pub mod tokenizer;
pub mod utils;

// Re-export commonly used items
pub use block_builder::{BlockBuilder, BlockStructure};
pub use declarations::DeclarationExtractor;
pub use tokenizer::{Tokenizer, tokenize, tokenize_all};
pub use utils::{Parameter, normalize_tokens, parse_parameters};

use std::path::Path;

use tracing::{debug, warn};

use crate::{
    error::{Diagnostic, Error, Result},
    snapshot::ParsedSnapshot,
};

/// Lowercase hex MD5 of the source text
pub fn content_hash(source: &str) -> String {
    format!("{:x}", md5::compute(source.as_bytes()))
}

/// Runs the full pipeline: tokenizer, block builder, declaration extractor
#[derive(Debug, Clone)]
pub struct SourceParser {
    recovery: bool,
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser {
    pub fn new() -> Self {
        Self { recovery: true }
    }

    pub fn with_recovery(mut self, recovery: bool) -> Self {
        self.recovery = recovery;
        self
    }

    /// Parse `source` into a snapshot.
    ///
    /// Recoverable problems end up in the snapshot's diagnostics. Only empty
    /// input, or a lexical error with recovery disabled, fails.
    pub fn parse(&self, file_path: &Path, source: &str) -> Result<ParsedSnapshot> {
        if source.trim().is_empty() {
            return Err(Error::EmptySource {
                path: file_path.to_path_buf(),
            });
        }

        let (tokens, lexical_errors) = tokenize_all(source, self.recovery)?;
        let line_count = source.lines().count() as u32;
        debug!(
            "tokenized {:?}: {} tokens over {} lines",
            file_path,
            tokens.len(),
            line_count
        );

        let BlockStructure { mut tree, warnings } = BlockBuilder::new(&tokens, line_count).build();
        let doc_entries = DeclarationExtractor::new(&tokens).extract(&mut tree);

        let mut diagnostics: Vec<Diagnostic> = lexical_errors
            .into_iter()
            .map(Diagnostic::Lexical)
            .chain(warnings.into_iter().map(Diagnostic::Structural))
            .collect();
        diagnostics.sort_by_key(Diagnostic::line);
        for diagnostic in &diagnostics {
            warn!("{:?}: {}", file_path, diagnostic);
        }

        Ok(ParsedSnapshot {
            file_path: file_path.to_path_buf(),
            tree,
            doc_entries,
            source_hash: content_hash(source),
            line_count,
            diagnostics,
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockKind, DeclarationKind};
    use std::path::PathBuf;

    fn parse(source: &str) -> ParsedSnapshot {
        SourceParser::new()
            .parse(&PathBuf::from("test.py"), source)
            .unwrap()
    }

    fn names(snapshot: &ParsedSnapshot, block: usize) -> Vec<(String, DeclarationKind)> {
        snapshot
            .tree
            .get(crate::types::BlockId(block))
            .declared_names
            .iter()
            .map(|d| (d.name.clone(), d.kind))
            .collect()
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let result = SourceParser::new().parse(&PathBuf::from("empty.py"), "  \n\n");
        assert!(matches!(result, Err(Error::EmptySource { .. })));
    }

    #[test]
    fn test_strict_mode_fails_on_lexical_error() {
        let result = SourceParser::new()
            .with_recovery(false)
            .parse(&PathBuf::from("bad.py"), "x = 'open\n");
        assert!(matches!(result, Err(Error::Lexical(_))));
    }

    #[test]
    fn test_recovery_mode_keeps_partial_structure() {
        let source = "def f(a):\n    s = 'open\n    return a\n";
        let snapshot = parse(source);
        assert_eq!(snapshot.diagnostics.len(), 1);
        assert!(matches!(snapshot.diagnostics[0], Diagnostic::Lexical(_)));
        insta::assert_snapshot!(
            snapshot.diagnostics[0].to_string(),
            @"lexical error: unterminated string literal at line 2, column 8"
        );
        let function = snapshot.tree.get(snapshot.tree.root().children[0]);
        assert_eq!((function.start_line, function.end_line), (1, 3));
    }

    #[test]
    fn test_block_ranges_follow_indentation() {
        let source = "\
class A:
    def m(self):
        if self.x:
            return 1

        return 2

    def n(self):
        pass
x = 1
";
        let snapshot = parse(source);
        let tree = &snapshot.tree;
        let class = tree.get(tree.root().children[0]);
        assert_eq!((class.kind, class.start_line, class.end_line), (BlockKind::Class, 1, 9));
        let m = tree.get(class.children[0]);
        assert_eq!((m.start_line, m.end_line), (2, 7));
        let control = tree.get(m.children[0]);
        assert_eq!((control.kind, control.start_line, control.end_line), (BlockKind::Control, 3, 5));
        let n = tree.get(class.children[1]);
        assert_eq!((n.start_line, n.end_line), (8, 9));
        assert!(snapshot.diagnostics.is_empty());
    }

    #[test]
    fn test_inline_suite_spans_one_line() {
        let snapshot = parse("if ready: go = True\nelse: go = False\n");
        let tree = &snapshot.tree;
        let ranges: Vec<(u32, u32)> = tree
            .root()
            .children
            .iter()
            .map(|id| (tree.get(*id).start_line, tree.get(*id).end_line))
            .collect();
        assert_eq!(ranges, vec![(1, 1), (2, 2)]);
        assert_eq!(
            names(&snapshot, 0),
            vec![
                ("go".to_string(), DeclarationKind::Variable),
                ("go".to_string(), DeclarationKind::Variable)
            ]
        );
    }

    #[test]
    fn test_missing_body_at_end_of_input_is_a_warning() {
        let snapshot = parse("class A:\n    def g(self):\n");
        let tree = &snapshot.tree;
        let class = tree.get(tree.root().children[0]);
        let method = tree.get(class.children[0]);
        assert_eq!(class.end_line, 2);
        assert_eq!(method.end_line, 2);
        assert!(
            snapshot
                .diagnostics
                .iter()
                .all(|d| matches!(d, Diagnostic::Structural(_)))
        );
        assert_eq!(snapshot.diagnostics.len(), 1);
        insta::assert_snapshot!(
            snapshot.diagnostics[0].to_string(),
            @"structural warning: expected an indented block (block starting at line 2)"
        );
    }

    #[test]
    fn test_declarations_by_owner() {
        let source = "\
import os.path, sys as system
from collections import (OrderedDict, defaultdict as dd)

def f(a, b=2, *rest, **kw):
    x = y = 0
    p, (q, *r) = pair
    self.attr = 1
    total += 1
    for i, item in enumerate(rest):
        found: bool = True
    with open(a) as handle:
        pass
    try:
        pass
    except ValueError as error:
        pass
";
        let snapshot = parse(source);
        assert_eq!(
            names(&snapshot, 0),
            vec![
                ("os".to_string(), DeclarationKind::Import),
                ("system".to_string(), DeclarationKind::Import),
                ("OrderedDict".to_string(), DeclarationKind::Import),
                ("dd".to_string(), DeclarationKind::Import),
                ("f".to_string(), DeclarationKind::Function),
            ]
        );
        let f: Vec<String> = names(&snapshot, 1).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            f,
            vec![
                "a", "b", "rest", "kw", "x", "y", "p", "q", "r", "total", "i", "item", "found",
                "handle", "error"
            ]
        );
        let b = &snapshot.tree.get(crate::types::BlockId(1)).declared_names[1];
        assert_eq!(b.default_value.as_deref(), Some("2"));
    }

    #[test]
    fn test_comprehension_targets_bind_in_enclosing_scope() {
        let source = "\
def func3(arg4):
    x = [comp_arg1 for comp_arg1 in arg4]
    x = (comp_arg2 for comp_arg2 in arg4)
    x = {comp_arg3 for comp_arg3 in arg4}
    x = {comp_key: comp_arg4 for (comp_key, comp_arg4) in arg4}
    return sum(n for n in [m for m in arg4] if n)
";
        let snapshot = parse(source);
        let declared: Vec<(String, DeclarationKind)> = names(&snapshot, 1);
        let variables: Vec<&str> = declared
            .iter()
            .filter(|(_, kind)| *kind == DeclarationKind::Variable)
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(
            variables,
            vec![
                "x", "comp_arg1", "x", "comp_arg2", "x", "comp_arg3", "x", "comp_key",
                "comp_arg4", "n", "m"
            ]
        );
    }

    #[test]
    fn test_parenthesized_as_target_is_unpacked() {
        let source = "\
with pair() as (left, right), open(path) as handle:
    pass
z = 1
";
        let snapshot = parse(source);
        let module: Vec<String> = names(&snapshot, 0).into_iter().map(|(n, _)| n).collect();
        assert_eq!(module, vec!["left", "right", "handle", "z"]);
    }

    #[test]
    fn test_documentation_entries() {
        let source = "\
@decorator
def first(a,
          b):
    \"\"\"Add things.

    More detail.
    \"\"\"
    return a + b

class Box(Base):
    # A container.
    # Holds one value.
    def get(self): return self.value
";
        let snapshot = parse(source);
        let docs = &snapshot.doc_entries;
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].symbol_name, "first");
        assert_eq!(docs[0].signature, "def first(a, b):");
        assert_eq!(docs[0].doc_text.as_deref(), Some("Add things.\n\nMore detail."));
        assert_eq!(docs[0].defined_at_line, 2);
        assert_eq!(docs[1].signature, "class Box(Base):");
        assert_eq!(docs[1].doc_text.as_deref(), Some("A container.\nHolds one value."));
        assert_eq!(docs[2].qualified_path, vec!["Box", "get"]);
        assert_eq!(docs[2].kind, crate::types::SymbolKind::Method);
        assert_eq!(docs[2].doc_text, None);
    }
}
