//! Spatial-domain LSB embedding across the RGB channels.

use super::{outcome, plan_write, EmbedOutcome, Embedder};
use crate::carrier::PixelImage;
use crate::config::{CapacityPolicy, ChannelSelection, ALPHA_CHANNEL};
use crate::encoding::Bitstream;
use crate::error::{Error, Result};

const RGB: [usize; 3] = [0, 1, 2];

/// Overwrite the LSB of each listed channel, pixel by pixel, with `bits`.
///
/// Samples past the last bit are not touched.
pub(crate) fn write_lsbs(image: &mut PixelImage, channels: &[usize], bits: &[bool]) -> Result<()> {
    let mut bits = bits.iter();
    image.update_samples(channels, |sample| match bits.next() {
        Some(&bit) => {
            *sample = (*sample & !1) | bit as u8;
            true
        }
        None => false,
    })
}

/// Read the LSB of each listed channel in the order used by [`write_lsbs`].
pub(crate) fn read_lsbs(image: &PixelImage, channels: &[usize]) -> Vec<bool> {
    image.samples(channels).map(|s| s & 1 == 1).collect()
}

/// LSB embedder over red, green and blue; alpha is left alone.
#[derive(Debug, Clone, Default)]
pub struct LsbEmbedder {
    channels: ChannelSelection,
}

impl LsbEmbedder {
    pub fn new(channels: ChannelSelection) -> Self {
        Self { channels }
    }

    fn resolve(&self, image: &PixelImage) -> Result<Vec<usize>> {
        if matches!(self.channels, ChannelSelection::Auto) && image.channels() < RGB.len() {
            return Err(Error::UnsupportedChannels {
                method: "lsb",
                channels: image.channels(),
            });
        }
        let channels = self
            .channels
            .resolve(&RGB, image.channels())
            .map_err(Error::InvalidConfig)?;
        if channels.contains(&ALPHA_CHANNEL) {
            return Err(Error::InvalidConfig(
                "The lsb method never writes the alpha channel".to_string(),
            ));
        }
        Ok(channels)
    }
}

impl Embedder for LsbEmbedder {
    fn name(&self) -> &'static str {
        "lsb"
    }

    fn capacity(&self, image: &PixelImage) -> Result<usize> {
        Ok(self.resolve(image)?.len() * image.pixel_count())
    }

    fn embed_bits(
        &self,
        image: &mut PixelImage,
        bits: &Bitstream,
        policy: CapacityPolicy,
    ) -> Result<EmbedOutcome> {
        let channels = self.resolve(image)?;
        let capacity = channels.len() * image.pixel_count();
        let count = plan_write(bits.len(), capacity, policy)?;

        write_lsbs(image, &channels, &bits.bits()[..count])?;
        Ok(outcome(count, bits.len(), capacity))
    }

    fn extract_bits(&self, image: &PixelImage) -> Result<Vec<bool>> {
        let channels = self.resolve(image)?;
        Ok(read_lsbs(image, &channels))
    }
}
