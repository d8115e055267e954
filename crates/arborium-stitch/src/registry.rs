//! The set of blocks known to one build.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::block::Block;

/// Blocks keyed by id, in registration order.
///
/// A registry lives for one build. It is filled while pages render, completed
/// once by the highlighting service, and only read during the rewrite passes.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    blocks: IndexMap<String, Block>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `block`, replacing any earlier block with the same id.
    ///
    /// Ids are unique by construction upstream, so a repeat is logged and the
    /// newer block wins.
    pub fn register(&mut self, block: Block) {
        match self.blocks.entry(block.id.clone()) {
            Entry::Occupied(mut entry) => {
                tracing::warn!(id = %block.id, "block registered twice, keeping the latest");
                entry.insert(block);
            }
            Entry::Vacant(entry) => {
                entry.insert(block);
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All blocks in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Blocks and clones still waiting for highlighted markup, parents before their clones.
    pub fn unhighlighted(&self) -> impl Iterator<Item = &Block> {
        self.all()
            .flat_map(Block::group)
            .filter(|block| !block.is_highlighted())
    }

    pub(crate) fn all_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.values_mut()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl FromIterator<Block> for Registry {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut registry = Registry::new();
        registry.extend(iter);
        registry
    }
}

impl Extend<Block> for Registry {
    fn extend<I: IntoIterator<Item = Block>>(&mut self, iter: I) {
        for block in iter {
            self.register(block);
        }
    }
}
