//! Frequency-domain embedding in 8×8 block DCT coefficient parity.
//!
//! Each full block of each used channel carries one bit: the parity of
//! `floor(c)` where `c` is the block's highest-frequency coefficient
//! (row 7, column 7). Blocks whose parity already matches are left
//! byte-identical. Otherwise the coefficient is moved by the smallest
//! shift whose parity survives the inverse transform, clipping and
//! rounding back to 8-bit pixels.

mod blocks;
pub mod transform;

pub use blocks::{BlockLayout, BlockSlot};

use super::{outcome, plan_write, EmbedOutcome, Embedder};
use crate::carrier::PixelImage;
use crate::config::{
    CapacityPolicy, ChannelSelection, ALPHA_CHANNEL, BLOCK_SIZE, MAX_PARITY_SHIFT,
};
use crate::encoding::Bitstream;
use crate::error::{Error, Result};
use transform::Block;

/// Index of the highest-frequency coefficient in a row-major block.
const HIGHEST_FREQUENCY: usize = BLOCK_SIZE * BLOCK_SIZE - 1;

/// Parity bit carried by a coefficient.
pub fn coefficient_parity(c: f64) -> bool {
    (c.floor() as i64).rem_euclid(2) == 1
}

/// Candidate values for a coefficient that must change parity to `bit`.
///
/// The plain `c + 1` shift comes first. After it come the centres of the
/// unit intervals with the right parity, nearest first, up to
/// `MAX_PARITY_SHIFT` away.
fn parity_candidates(c: f64, bit: bool) -> Vec<f64> {
    let base = c.floor() as i64;
    let reach = MAX_PARITY_SHIFT as i64 + 1;

    let mut centres: Vec<f64> = (base - reach..=base + reach)
        .filter(|k| (k.rem_euclid(2) == 1) == bit)
        .map(|k| k as f64 + 0.5)
        .filter(|t| (t - c).abs() <= MAX_PARITY_SHIFT)
        .collect();
    centres.sort_by(|a, b| (a - c).abs().total_cmp(&(b - c).abs()));

    let mut candidates = Vec::with_capacity(centres.len() + 1);
    candidates.push(c + 1.0);
    candidates.extend(centres);
    candidates
}

fn to_samples(pixels: &[u8; BLOCK_SIZE * BLOCK_SIZE]) -> Block {
    let mut block = [0.0f64; BLOCK_SIZE * BLOCK_SIZE];
    for (b, &p) in block.iter_mut().zip(pixels.iter()) {
        *b = p as f64;
    }
    block
}

/// Force the parity of one slot to `bit`.
fn embed_slot(image: &mut PixelImage, slot: BlockSlot, bit: bool) -> Result<()> {
    let coeffs = transform::forward(&slot.read(image));
    let c = coeffs[HIGHEST_FREQUENCY];
    if coefficient_parity(c) == bit {
        return Ok(());
    }

    for target in parity_candidates(c, bit) {
        let mut adjusted = coeffs;
        adjusted[HIGHEST_FREQUENCY] = target;
        let pixels = transform::to_pixels(&transform::inverse(&adjusted));

        let reread = transform::forward(&to_samples(&pixels))[HIGHEST_FREQUENCY];
        if coefficient_parity(reread) == bit {
            log::trace!(
                "slot {:?}: coefficient {:.3} -> {:.3} (reads {:.3})",
                slot,
                c,
                target,
                reread
            );
            slot.write(image, &pixels);
            return Ok(());
        }
    }

    Err(Error::UnstableBlock {
        channel: slot.channel,
        block_row: slot.block_row,
        block_col: slot.block_col,
    })
}

/// Block-DCT parity embedder.
#[derive(Debug, Clone, Default)]
pub struct DctEmbedder {
    channels: ChannelSelection,
}

impl DctEmbedder {
    pub fn new(channels: ChannelSelection) -> Self {
        Self { channels }
    }

    /// Block layout for `image`; colour images use RGB, grayscale its only channel.
    pub fn layout(&self, image: &PixelImage) -> Result<BlockLayout> {
        let channels = self
            .channels
            .resolve(&image.color_channels(), image.channels())
            .map_err(Error::InvalidConfig)?;
        if channels.contains(&ALPHA_CHANNEL) {
            return Err(Error::InvalidConfig(
                "The dct method never writes the alpha channel".to_string(),
            ));
        }
        Ok(BlockLayout::new(image, &channels))
    }
}

impl Embedder for DctEmbedder {
    fn name(&self) -> &'static str {
        "dct"
    }

    fn capacity(&self, image: &PixelImage) -> Result<usize> {
        Ok(self.layout(image)?.len())
    }

    fn embed_bits(
        &self,
        image: &mut PixelImage,
        bits: &Bitstream,
        policy: CapacityPolicy,
    ) -> Result<EmbedOutcome> {
        let layout = self.layout(image)?;
        let capacity = layout.len();
        let count = plan_write(bits.len(), capacity, policy)?;

        // Work on a copy so a failing block leaves the caller's image intact.
        let mut work = image.clone();
        for (cursor, &bit) in bits.bits()[..count].iter().enumerate() {
            embed_slot(&mut work, layout.slot(cursor), bit)?;
        }
        *image = work;

        Ok(outcome(count, bits.len(), capacity))
    }

    fn extract_bits(&self, image: &PixelImage) -> Result<Vec<bool>> {
        let layout = self.layout(image)?;
        Ok(layout
            .slots()
            .map(|slot| {
                let coeffs = transform::forward(&slot.read(image));
                coefficient_parity(coeffs[HIGHEST_FREQUENCY])
            })
            .collect())
    }
}
