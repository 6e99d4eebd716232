//! In-memory pixel arrays handed between the I/O layer and the codecs.

use crate::config::ALPHA_CHANNEL;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit image stored row-major with interleaved channels.
///
/// Grayscale images have 1 channel, colour images 3 (RGB) or 4 (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

/// Geometry of a [`PixelImage`], used for shape comparisons and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

impl PixelImage {
    /// Wrap an existing buffer.
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(Error::InvalidDimensions(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| Error::InvalidDimensions("image too large".to_string()))?;
        if data.len() != expected {
            return Err(Error::InvalidDimensions(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                height,
                width,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Image with every sample set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Result<Self> {
        Self::from_raw(
            width,
            height,
            channels,
            vec![value; width * height * channels],
        )
    }

    /// Build an image by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> u8,
    {
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self::from_raw(width, height, channels, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shape(&self) -> Shape {
        Shape {
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn has_alpha(&self) -> bool {
        self.channels > ALPHA_CHANNEL
    }

    /// Raw interleaved samples.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && channel < self.channels);
        (y * self.width + x) * self.channels + channel
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.data[self.index(x, y, channel)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: u8) {
        let idx = self.index(x, y, channel);
        self.data[idx] = value;
    }

    /// Iterate the samples of one channel in row-major pixel order.
    pub fn channel_values(&self, channel: usize) -> impl Iterator<Item = u8> + '_ {
        debug_assert!(channel < self.channels);
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
    }

    /// Fail unless `channels` lists distinct, in-range channel indices.
    pub fn check_channels(&self, channels: &[usize]) -> Result<()> {
        for (i, &c) in channels.iter().enumerate() {
            if c >= self.channels {
                return Err(Error::InvalidConfig(format!(
                    "Channel {} out of range for a {}-channel image",
                    c, self.channels
                )));
            }
            if channels[..i].contains(&c) {
                return Err(Error::InvalidConfig(format!(
                    "Channel {} listed twice",
                    c
                )));
            }
        }
        Ok(())
    }

    /// Visit the given channels of every pixel, in row-major pixel order and
    /// channel-list order within a pixel, until `f` returns `false`.
    pub fn update_samples<F>(&mut self, channels: &[usize], mut f: F) -> Result<()>
    where
        F: FnMut(&mut u8) -> bool,
    {
        self.check_channels(channels)?;
        for pixel in self.data.chunks_exact_mut(self.channels) {
            for &c in channels {
                if !f(&mut pixel[c]) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Samples of the given channels in the order used by [`update_samples`](Self::update_samples).
    pub fn samples<'a>(&'a self, channels: &'a [usize]) -> impl Iterator<Item = u8> + 'a {
        self.data
            .chunks_exact(self.channels)
            .flat_map(move |pixel| channels.iter().map(move |&c| pixel[c]))
    }

    /// Copy of this image with an opaque alpha channel appended.
    ///
    /// Grayscale is expanded to RGB first. Images that already carry alpha
    /// are returned unchanged.
    pub fn with_opaque_alpha(&self) -> PixelImage {
        if self.has_alpha() {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.pixel_count() * 4);
        for pixel in self.data.chunks_exact(self.channels) {
            match self.channels {
                1 => data.extend_from_slice(&[pixel[0], pixel[0], pixel[0]]),
                _ => data.extend_from_slice(&pixel[..3]),
            }
            data.push(u8::MAX);
        }
        PixelImage {
            width: self.width,
            height: self.height,
            channels: 4,
            data,
        }
    }

    /// Luma conversion with ITU-R 601-2 weights, as most image libraries use.
    pub fn to_grayscale(&self) -> PixelImage {
        if self.channels == 1 {
            return self.clone();
        }
        let data = self
            .data
            .chunks_exact(self.channels)
            .map(|p| {
                let luma = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
                luma.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        PixelImage {
            width: self.width,
            height: self.height,
            channels: 1,
            data,
        }
    }

    /// Colour channels (alpha excluded).
    pub fn color_channels(&self) -> Vec<usize> {
        match self.channels {
            1 => vec![0],
            _ => vec![0, 1, 2],
        }
    }

    /// Fail unless `other` has exactly the same geometry.
    pub fn ensure_same_shape(&self, other: &PixelImage) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape().to_string(),
                found: other.shape().to_string(),
            });
        }
        Ok(())
    }
}
