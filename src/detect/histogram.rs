//! 256-bin intensity histograms.

use crate::carrier::PixelImage;
use crate::config::HISTOGRAM_BINS;
use serde::{Serialize, Serializer};

/// Exact counts of 8-bit values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; HISTOGRAM_BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            counts: [0; HISTOGRAM_BINS],
        }
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.counts[..].serialize(serializer)
    }
}

impl Histogram {
    pub fn from_values<I: IntoIterator<Item = u8>>(values: I) -> Self {
        let mut hist = Self::default();
        for v in values {
            hist.counts[v as usize] += 1;
        }
        hist
    }

    /// Histogram built directly from bin counts.
    pub fn from_counts(counts: [u64; HISTOGRAM_BINS]) -> Self {
        Self { counts }
    }

    pub fn of_channel(image: &PixelImage, channel: usize) -> Self {
        Self::from_values(image.channel_values(channel))
    }

    /// Histogram of every sample of the listed channels pooled together.
    pub fn of_channels(image: &PixelImage, channels: &[usize]) -> Self {
        Self::from_values(image.samples(channels))
    }

    /// Histogram of `|a - b|` per sample; both images must share a shape.
    pub fn of_difference(a: &PixelImage, b: &PixelImage) -> Self {
        debug_assert_eq!(a.shape(), b.shape());
        Self::from_values(
            a.as_raw()
                .iter()
                .zip(b.as_raw())
                .map(|(&x, &y)| x.abs_diff(y)),
        )
    }

    pub fn counts(&self) -> &[u64; HISTOGRAM_BINS] {
        &self.counts
    }

    pub fn get(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of samples with even and odd value.
    pub fn parity_counts(&self) -> (u64, u64) {
        self.counts
            .iter()
            .enumerate()
            .fold((0, 0), |(even, odd), (value, &n)| {
                if value % 2 == 0 {
                    (even + n, odd)
                } else {
                    (even, odd + n)
                }
            })
    }

    /// Mean of the bin counts (not of the intensities).
    pub fn count_mean(&self) -> f64 {
        self.total() as f64 / HISTOGRAM_BINS as f64
    }

    /// Population standard deviation of the bin counts.
    pub fn count_std_dev(&self) -> f64 {
        let mean = self.count_mean();
        let var = self
            .counts
            .iter()
            .map(|&n| (n as f64 - mean).powi(2))
            .sum::<f64>()
            / HISTOGRAM_BINS as f64;
        var.sqrt()
    }

    /// Mean intensity of the underlying samples.
    pub fn intensity_mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(v, &n)| v as f64 * n as f64)
            .sum();
        sum / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_binning() {
        let hist = Histogram::from_values([0u8, 0, 255, 7, 7, 7]);

        assert_eq!(hist.get(0), 2);
        assert_eq!(hist.get(7), 3);
        assert_eq!(hist.get(255), 1);
        assert_eq!(hist.total(), 6);
    }

    #[test]
    fn test_parity_counts() {
        let hist = Histogram::from_values([0u8, 1, 2, 3, 3, 255]);
        assert_eq!(hist.parity_counts(), (2, 4));
    }

    #[test]
    fn test_of_channels_pools_samples() {
        let img = PixelImage::from_raw(2, 1, 3, vec![1, 2, 3, 1, 5, 6]).unwrap();

        assert_eq!(Histogram::of_channel(&img, 0).get(1), 2);
        let pooled = Histogram::of_channels(&img, &[0, 2]);
        assert_eq!(pooled.total(), 4);
        assert_eq!(pooled.get(1), 2);
        assert_eq!(pooled.get(3), 1);
        assert_eq!(pooled.get(6), 1);
    }

    #[test]
    fn test_difference() {
        let a = PixelImage::from_raw(3, 1, 1, vec![10, 20, 30]).unwrap();
        let b = PixelImage::from_raw(3, 1, 1, vec![11, 20, 28]).unwrap();
        let diff = Histogram::of_difference(&a, &b);

        assert_eq!(diff.get(0), 1);
        assert_eq!(diff.get(1), 1);
        assert_eq!(diff.get(2), 1);
    }

    #[test]
    fn test_count_statistics() {
        let hist = Histogram::from_values((0..=255u8).chain(0..=255u8));

        assert_eq!(hist.count_mean(), 2.0);
        assert_eq!(hist.count_std_dev(), 0.0);
        assert!((hist.intensity_mean() - 127.5).abs() < 1e-12);
    }
}
