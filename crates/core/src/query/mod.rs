//! Read-only queries against a [`ParsedSnapshot`]
//!
//! Every query borrows the snapshot, so any number of them can run at the
//! same time while the cache swaps in newer snapshots.

mod outline;
mod references;
mod scope;

use crate::{
    error::{Diagnostic, Error, Result},
    snapshot::ParsedSnapshot,
    types::{DocEntry, NestableRange},
};

impl ParsedSnapshot {
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    /// Problems tolerated while parsing, ordered by line
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Documentation for every function and class, in source order
    pub fn all_documentation(&self) -> &[DocEntry] {
        &self.doc_entries
    }

    /// One range per block, the module included, outer ranges before the
    /// ranges they contain
    pub fn nestable_ranges(&self) -> Vec<NestableRange> {
        let mut ranges: Vec<NestableRange> = self
            .tree
            .preorder()
            .into_iter()
            .map(|block| NestableRange {
                start_line: block.start_line,
                end_line: block.end_line,
                kind: block.kind,
            })
            .collect();
        ranges.sort_by(|a, b| {
            a.start_line
                .cmp(&b.start_line)
                .then(b.end_line.cmp(&a.end_line))
        });
        ranges
    }

    pub(crate) fn check_line(&self, line: u32) -> Result<()> {
        if line == 0 || line > self.line_count {
            return Err(Error::OutOfRange {
                line,
                line_count: self.line_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::SourceParser;
    use crate::types::BlockKind;
    use std::path::Path;

    #[test]
    fn test_nestable_ranges_outer_first() {
        let source = "\
class A:
    def m(self):
        if self.x:
            return 1
        return 2
def f():
    pass
";
        let snapshot = SourceParser::new().parse(Path::new("a.py"), source).unwrap();
        let ranges: Vec<(u32, u32, BlockKind)> = snapshot
            .nestable_ranges()
            .iter()
            .map(|r| (r.start_line, r.end_line, r.kind))
            .collect();
        assert_eq!(
            ranges,
            vec![
                (1, 7, BlockKind::Module),
                (1, 5, BlockKind::Class),
                (2, 5, BlockKind::Function),
                (3, 4, BlockKind::Control),
                (6, 7, BlockKind::Function),
            ]
        );
    }

    #[test]
    fn test_documentation_is_borrowed_in_order() {
        let source = "def a():\n    pass\ndef b():\n    '''B.'''\n";
        let snapshot = SourceParser::new().parse(Path::new("a.py"), source).unwrap();
        let names: Vec<&str> = snapshot
            .all_documentation()
            .iter()
            .map(|d| d.symbol_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(snapshot.all_documentation()[1].doc_text.as_deref(), Some("B."));
    }

    #[test]
    fn test_line_bounds() {
        let snapshot = SourceParser::new().parse(Path::new("a.py"), "x = 1\ny = 2\n").unwrap();
        assert_eq!(snapshot.line_count(), 2);
        assert!(snapshot.check_line(1).is_ok());
        assert!(snapshot.check_line(2).is_ok());
        assert!(snapshot.check_line(0).is_err());
        assert!(snapshot.check_line(3).is_err());
    }
}
