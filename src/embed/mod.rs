//! Message embedders.
//!
//! Every method implements [`Embedder`]. The bit order of `embed_bits` and
//! `extract_bits` is the contract between the two sides of a method; both
//! consume the same terminated [`Bitstream`](crate::encoding::Bitstream).

mod alpha;
pub mod dct;
mod spatial;

pub use alpha::AlphaEmbedder;
pub use dct::DctEmbedder;
pub use spatial::LsbEmbedder;

use crate::carrier::PixelImage;
use crate::config::{CapacityPolicy, Method, StegoConfig};
use crate::encoding::{self, Bitstream};
use crate::error::{Error, Result};
use serde::Serialize;

/// How much of a bitstream an embed call wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EmbedOutcome {
    /// Every bit, terminator included, was written.
    Complete { written: usize },
    /// The medium filled up; the terminator is missing and extraction will fail.
    Truncated { written: usize, capacity: usize },
}

impl EmbedOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, EmbedOutcome::Complete { .. })
    }

    pub fn bits_written(&self) -> usize {
        match *self {
            EmbedOutcome::Complete { written } | EmbedOutcome::Truncated { written, .. } => {
                written
            }
        }
    }
}

/// An embedding method bound to a channel layout.
pub trait Embedder {
    /// Short method name (for logging).
    fn name(&self) -> &'static str;

    /// Number of payload bits the image can hold with this method.
    fn capacity(&self, image: &PixelImage) -> Result<usize>;

    /// Write `bits` into `image`.
    ///
    /// Capacity is checked before any sample changes. Under
    /// [`CapacityPolicy::Strict`] an oversized bitstream leaves the image
    /// untouched and returns [`Error::CapacityExceeded`].
    fn embed_bits(
        &self,
        image: &mut PixelImage,
        bits: &Bitstream,
        policy: CapacityPolicy,
    ) -> Result<EmbedOutcome>;

    /// Read every carrier bit of `image` in embedding order.
    fn extract_bits(&self, image: &PixelImage) -> Result<Vec<bool>>;

    /// Encode `message` and embed it.
    fn embed(
        &self,
        image: &mut PixelImage,
        message: &str,
        policy: CapacityPolicy,
    ) -> Result<EmbedOutcome> {
        self.embed_bits(image, &encoding::encode(message), policy)
    }

    /// Extract and decode a text message.
    fn extract(&self, image: &PixelImage) -> Result<String> {
        let bits = self.extract_bits(image)?;
        encoding::decode_message(&bits, 0)
    }

    /// Extract the raw payload bytes.
    fn extract_bytes(&self, image: &PixelImage) -> Result<Vec<u8>> {
        let bits = self.extract_bits(image)?;
        encoding::decode(&bits, 0)
    }
}

/// Decide how many bits to write, enforcing the capacity policy.
pub(crate) fn plan_write(needed: usize, capacity: usize, policy: CapacityPolicy) -> Result<usize> {
    if needed <= capacity {
        return Ok(needed);
    }
    match policy {
        CapacityPolicy::Strict => Err(Error::CapacityExceeded {
            needed,
            available: capacity,
        }),
        CapacityPolicy::Truncate => {
            log::warn!(
                "Bitstream of {} bits truncated to capacity of {} bits",
                needed,
                capacity
            );
            Ok(capacity)
        }
    }
}

pub(crate) fn outcome(written: usize, needed: usize, capacity: usize) -> EmbedOutcome {
    if written == needed {
        EmbedOutcome::Complete { written }
    } else {
        EmbedOutcome::Truncated { written, capacity }
    }
}

/// Build the embedder described by `config`.
pub fn embedder_for(config: &StegoConfig) -> Result<Box<dyn Embedder>> {
    config.validate().map_err(Error::InvalidConfig)?;
    Ok(match config.method {
        Method::Lsb => Box::new(LsbEmbedder::new(config.channels.clone())),
        Method::Rgba => Box::new(AlphaEmbedder::new()),
        Method::Dct => Box::new(DctEmbedder::new(config.channels.clone())),
    })
}

/// Embed `message` into `image` according to `config`.
///
/// # Example
///
/// ```
/// use stegscan::{embed, PixelImage, StegoConfig, Method};
///
/// let mut image = PixelImage::filled(16, 16, 3, 128).unwrap();
/// let config = StegoConfig::new(Method::Lsb);
///
/// embed::embed(&mut image, "hidden", &config).unwrap();
/// assert_eq!(embed::extract(&image, &config).unwrap(), "hidden");
/// ```
pub fn embed(image: &mut PixelImage, message: &str, config: &StegoConfig) -> Result<EmbedOutcome> {
    let embedder = embedder_for(config)?;
    let outcome = embedder.embed(image, message, config.capacity_policy)?;
    log::debug!(
        "{}: wrote {} bits into {}",
        embedder.name(),
        outcome.bits_written(),
        image.shape()
    );
    Ok(outcome)
}

/// Extract a text message from `image` according to `config`.
pub fn extract(image: &PixelImage, config: &StegoConfig) -> Result<String> {
    embedder_for(config)?.extract(image)
}

/// Capacity of `image` in bits for the method in `config`.
pub fn capacity(image: &PixelImage, config: &StegoConfig) -> Result<usize> {
    embedder_for(config)?.capacity(image)
}
