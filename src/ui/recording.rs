use super::{Block, OutputSink, Tone};
use std::cell::RefCell;

/// Output sink that keeps every block instead of printing it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    blocks: RefCell<Vec<Block>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.borrow().clone()
    }

    /// Text of every block, in emission order.
    pub fn texts(&self) -> Vec<String> {
        self.blocks.borrow().iter().map(Block::text).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.blocks.borrow().iter().any(|b| b.text().contains(needle))
    }

    /// Number of blocks containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.blocks
            .borrow()
            .iter()
            .filter(|b| b.text().contains(needle))
            .count()
    }

    pub fn lines_with_tone(&self, tone: Tone) -> Vec<String> {
        self.blocks
            .borrow()
            .iter()
            .filter_map(|b| match b {
                Block::Line { text, tone: t } if *t == tone => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.blocks.borrow_mut().clear();
    }
}

impl OutputSink for RecordingSink {
    fn emit(&self, block: Block) {
        self.blocks.borrow_mut().push(block);
    }
}
