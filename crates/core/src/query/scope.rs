use std::collections::BTreeMap;

use crate::{
    error::Result,
    snapshot::ParsedSnapshot,
    types::{BlockKind, Declaration},
};

impl ParsedSnapshot {
    /// Names visible at `line`, sorted by name.
    ///
    /// Walks from the innermost block at `line` up to the module. A name
    /// found in a closer block hides the same name further out, and within
    /// one block the latest binding made before `line` wins. Function and
    /// class definitions of enclosing scopes and of the module are visible
    /// from any line.
    pub fn variables_in_scope(&self, line: u32) -> Result<Vec<&Declaration>> {
        self.check_line(line)?;

        let innermost = self.tree.innermost_at(line);
        let scope = self.tree.scope_of(innermost);
        let mut visible: BTreeMap<&str, &Declaration> = BTreeMap::new();
        for block in self.tree.ancestors(innermost) {
            let mut local: BTreeMap<&str, &Declaration> = BTreeMap::new();
            for declaration in block.declared_names.iter().filter(|d| d.is_visible_at(line)) {
                // declared_names is in source order, so later bindings overwrite
                local.insert(declaration.name.as_str(), declaration);
            }
            if block.id != scope || block.kind == BlockKind::Module {
                for declaration in block.declared_names.iter().filter(|d| d.is_definition()) {
                    local.entry(declaration.name.as_str()).or_insert(declaration);
                }
            }
            for (name, declaration) in local {
                visible.entry(name).or_insert(declaration);
            }
        }

        Ok(visible.into_values().collect())
    }
}
