use crate::dsl::builder::Fragment;
use crate::dsl::{Block, BlockTable, Position};

/// A linear chain of blocks. Each pushed fragment's base block is linked after
/// the previous one; blocks nested inside it keep their own links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    blocks: BlockTable,
    first: Option<String>,
    last: Option<String>,
    is_shadow: bool,
    is_top_level: bool,
    position: Option<Position>,
}

impl Script {
    /// A nested chain: sub-stack or reporter input.
    pub fn new() -> Self {
        Self::default()
    }

    /// A script standing on its own in the workspace; its first block is top level.
    pub fn top_level() -> Self {
        Self {
            is_top_level: true,
            ..Self::default()
        }
    }

    /// A chain whose blocks are all shadows, e.g. a menu's default value.
    pub fn shadow() -> Self {
        Self {
            is_shadow: true,
            ..Self::default()
        }
    }

    pub fn with_flags(is_top_level: bool, is_shadow: bool) -> Self {
        Self {
            is_top_level,
            is_shadow,
            ..Self::default()
        }
    }

    /// Places the first block at `(x, y)`.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        let position = Position::new(x, y);
        if let Some(block) = self.first.as_ref().and_then(|id| self.blocks.get_mut(id)) {
            block.position = position;
        }
        self.position = Some(position);
        self
    }

    pub fn push(&mut self, fragment: Fragment) -> &mut Self {
        let Fragment { base, blocks } = fragment;
        self.merge(blocks, &base);

        match self.last.as_ref() {
            Some(last) => {
                if let Some(prev) = self.blocks.get_mut(last) {
                    prev.next = Some(base.clone());
                }
            }
            None => {
                let is_top_level = self.is_top_level;
                let position = self.position;
                if let Some(root) = self.blocks.get_mut(&base) {
                    if is_top_level {
                        root.top_level = true;
                    }
                    if let Some(position) = position {
                        root.position = position;
                    }
                }
                self.first = Some(base.clone());
            }
        }

        self.last = Some(base);
        self
    }

    /// Insert-or-overwrite by key, then mark merged blocks as shadows when
    /// this chain is a shadow and hang the new base block off the current tail.
    fn merge(&mut self, blocks: BlockTable, base: &str) {
        let merged: Vec<String> = blocks.keys().cloned().collect();
        self.blocks.extend(blocks);
        if self.is_shadow {
            for id in &merged {
                if let Some(block) = self.blocks.get_mut(id) {
                    block.shadow = true;
                }
            }
        }
        if let Some(root) = self.blocks.get_mut(base) {
            root.parent = self.last.clone();
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.first.as_deref()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn is_shadow(&self) -> bool {
        self.is_shadow
    }

    pub fn is_top_level(&self) -> bool {
        self.is_top_level
    }

    pub fn blocks(&self) -> &BlockTable {
        &self.blocks
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn into_blocks(self) -> BlockTable {
        self.blocks
    }

    /// Block ids from `first` to `last`, following `next`.
    pub fn sequence(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        let mut cursor = self.first.as_deref();
        while let Some(id) = cursor {
            ids.push(id);
            if ids.len() > self.blocks.len() {
                break;
            }
            cursor = self.blocks.get(id).and_then(|b| b.next.as_deref());
        }
        ids
    }
}
