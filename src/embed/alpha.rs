//! LSB embedding restricted to the alpha channel.

use super::spatial::{read_lsbs, write_lsbs};
use super::{outcome, plan_write, EmbedOutcome, Embedder};
use crate::carrier::PixelImage;
use crate::config::{CapacityPolicy, ALPHA_CHANNEL};
use crate::encoding::Bitstream;
use crate::error::{Error, Result};

/// Alpha-channel LSB embedder.
///
/// The image must already be RGBA. Upgrading an RGB image is the caller's
/// decision, see [`PixelImage::with_opaque_alpha`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaEmbedder;

impl AlphaEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn check(image: &PixelImage) -> Result<()> {
        if !image.has_alpha() {
            return Err(Error::NoAlphaChannel);
        }
        Ok(())
    }
}

impl Embedder for AlphaEmbedder {
    fn name(&self) -> &'static str {
        "rgba"
    }

    fn capacity(&self, image: &PixelImage) -> Result<usize> {
        Self::check(image)?;
        Ok(image.pixel_count())
    }

    fn embed_bits(
        &self,
        image: &mut PixelImage,
        bits: &Bitstream,
        policy: CapacityPolicy,
    ) -> Result<EmbedOutcome> {
        let capacity = self.capacity(image)?;
        let count = plan_write(bits.len(), capacity, policy)?;

        write_lsbs(image, &[ALPHA_CHANNEL], &bits.bits()[..count])?;
        Ok(outcome(count, bits.len(), capacity))
    }

    fn extract_bits(&self, image: &PixelImage) -> Result<Vec<bool>> {
        Self::check(image)?;
        Ok(read_lsbs(image, &[ALPHA_CHANNEL]))
    }
}
