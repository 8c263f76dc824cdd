use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::declaration::Declaration;
use super::doc_entry::SymbolKind;

/// Index of a block inside its [`BlockTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    pub const ROOT: BlockId = BlockId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Module,
    Class,
    Function,
    Control,
}

impl BlockKind {
    /// Whether the block owns a namespace. Control blocks bind into their
    /// nearest enclosing scope instead.
    pub fn is_scope(self) -> bool {
        !matches!(self, BlockKind::Control)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Module => "module",
            BlockKind::Class => "class",
            BlockKind::Function => "function",
            BlockKind::Control => "control",
        }
    }
}

/// A lexically scoped span of source lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub name: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    /// Enclosing block, lookup only
    pub parent: Option<BlockId>,
    /// Direct children in declaration order
    pub children: Vec<BlockId>,
    /// Every binding owned by this block, in source order. A name bound twice
    /// appears twice.
    pub declared_names: Vec<Declaration>,
    /// Token indices of the header's logical line (empty for the module)
    #[serde(skip)]
    pub(crate) header: Range<usize>,
    /// Token index ranges of the statements directly inside this block
    #[serde(skip)]
    pub(crate) statements: Vec<Range<usize>>,
}

impl Block {
    pub(crate) fn new(id: BlockId, kind: BlockKind, start_line: u32, parent: Option<BlockId>) -> Self {
        Self {
            id,
            kind,
            name: None,
            start_line,
            end_line: start_line,
            parent,
            children: Vec::new(),
            declared_names: Vec::new(),
            header: 0..0,
            statements: Vec::new(),
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn line_count(&self) -> u32 {
        self.end_line - self.start_line + 1
    }
}

/// Arena that owns every block of one parsed file.
///
/// Blocks refer to each other through [`BlockId`]s, so parent links never
/// keep anything alive and dropping the tree drops every block exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTree {
    blocks: Vec<Block>,
}

impl BlockTree {
    /// Create a tree holding only the module block spanning `1..=line_count`
    pub fn new(line_count: u32) -> Self {
        let mut module = Block::new(BlockId::ROOT, BlockKind::Module, 1, None);
        module.end_line = line_count.max(1);
        Self {
            blocks: vec![module],
        }
    }

    pub fn root(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn get(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub(crate) fn push_child(&mut self, parent: BlockId, kind: BlockKind, start_line: u32) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block::new(id, kind, start_line, Some(parent)));
        self.blocks[parent.0].children.push(id);
        id
    }

    /// The block itself followed by each enclosing block up to the module
    pub fn ancestors(&self, id: BlockId) -> impl Iterator<Item = &Block> + '_ {
        std::iter::successors(Some(self.get(id)), move |block| {
            block.parent.map(|parent| self.get(parent))
        })
    }

    /// Nearest block (the block itself included) that owns a namespace
    pub fn scope_of(&self, id: BlockId) -> BlockId {
        self.ancestors(id)
            .find(|block| block.kind.is_scope())
            .map(|block| block.id)
            .unwrap_or(BlockId::ROOT)
    }

    /// Innermost block whose line range contains `line`
    pub fn innermost_at(&self, line: u32) -> BlockId {
        let mut current = BlockId::ROOT;
        loop {
            let next = self
                .get(current)
                .children
                .iter()
                .copied()
                .find(|child| self.get(*child).contains_line(line));
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Blocks in depth-first pre-order, which is also textual order
    pub fn preorder(&self) -> Vec<&Block> {
        let mut ordered = Vec::with_capacity(self.blocks.len());
        let mut stack = vec![BlockId::ROOT];
        while let Some(id) = stack.pop() {
            let block = self.get(id);
            ordered.push(block);
            stack.extend(block.children.iter().rev().copied());
        }
        ordered
    }

    /// How a function or class block is presented to users. A function
    /// directly inside a class is a method.
    pub fn symbol_kind(&self, id: BlockId) -> Option<SymbolKind> {
        let block = self.get(id);
        match block.kind {
            BlockKind::Class => Some(SymbolKind::Class),
            BlockKind::Function
                if block
                    .parent
                    .is_some_and(|parent| self.get(parent).kind == BlockKind::Class) =>
            {
                Some(SymbolKind::Method)
            }
            BlockKind::Function => Some(SymbolKind::Function),
            _ => None,
        }
    }

    /// Names of the enclosing blocks below the module, outermost first,
    /// ending with the block itself. Unnamed control blocks are skipped.
    pub fn qualified_path(&self, id: BlockId) -> Vec<String> {
        let mut path: Vec<String> = self
            .ancestors(id)
            .filter_map(|block| block.name.clone())
            .collect();
        path.reverse();
        path
    }
}
