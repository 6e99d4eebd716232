//! Block slots: the ordered arena of 8×8 tiles a DCT embedder visits.
//!
//! Slot `k` always carries bit `k`, so the bit cursor is just a slot index
//! and any range of slots can be processed independently.

use super::transform::Block;
use crate::carrier::PixelImage;
use crate::config::BLOCK_SIZE;

/// One full 8×8 tile of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSlot {
    pub channel: usize,
    pub block_row: usize,
    pub block_col: usize,
}

impl BlockSlot {
    /// Top-left pixel coordinate `(x, y)`.
    pub fn origin(&self) -> (usize, usize) {
        (self.block_col * BLOCK_SIZE, self.block_row * BLOCK_SIZE)
    }

    /// Copy the tile's samples out as floats.
    pub fn read(&self, image: &PixelImage) -> Block {
        let (x0, y0) = self.origin();
        let mut block = [0.0f64; BLOCK_SIZE * BLOCK_SIZE];
        for dy in 0..BLOCK_SIZE {
            for dx in 0..BLOCK_SIZE {
                block[dy * BLOCK_SIZE + dx] = image.get(x0 + dx, y0 + dy, self.channel) as f64;
            }
        }
        block
    }

    /// Write 64 pixel values back into the tile.
    pub fn write(&self, image: &mut PixelImage, pixels: &[u8; BLOCK_SIZE * BLOCK_SIZE]) {
        let (x0, y0) = self.origin();
        for dy in 0..BLOCK_SIZE {
            for dx in 0..BLOCK_SIZE {
                image.set(x0 + dx, y0 + dy, self.channel, pixels[dy * BLOCK_SIZE + dx]);
            }
        }
    }
}

/// Channel-major, row-major enumeration of the full blocks of an image.
///
/// Trailing rows and columns that do not fill a whole block are skipped.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    blocks_wide: usize,
    blocks_tall: usize,
    channels: Vec<usize>,
}

impl BlockLayout {
    pub fn new(image: &PixelImage, channels: &[usize]) -> Self {
        Self {
            blocks_wide: image.width() / BLOCK_SIZE,
            blocks_tall: image.height() / BLOCK_SIZE,
            channels: channels.to_vec(),
        }
    }

    pub fn blocks_per_channel(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    /// Total number of slots, i.e. the capacity in bits.
    pub fn len(&self) -> usize {
        self.blocks_per_channel() * self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slot at cursor position `index`.
    pub fn slot(&self, index: usize) -> BlockSlot {
        debug_assert!(index < self.len());
        let per_channel = self.blocks_per_channel();
        let within = index % per_channel;
        BlockSlot {
            channel: self.channels[index / per_channel],
            block_row: within / self.blocks_wide,
            block_col: within % self.blocks_wide,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = BlockSlot> + '_ {
        (0..self.len()).map(move |i| self.slot(i))
    }
}
