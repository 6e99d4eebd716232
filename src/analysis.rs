//! Descriptive statistics for carriers and their stego counterparts.
//!
//! These summarise what an embedding did to an image without testing a
//! hypothesis: histogram spread, block-DCT and block-Haar coefficient
//! distributions, and per-sample differences.

use crate::carrier::{PixelImage, Shape};
use crate::config::BLOCK_SIZE;
use crate::detect::Histogram;
use crate::embed::dct::{transform, BlockLayout};
use crate::io::{self, FileInfo};
use serde::Serialize;
use std::path::Path;

/// Summary of a single image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageStats {
    pub shape: Shape,
    /// Mean of the 256 grayscale histogram bin counts.
    pub histogram_mean: f64,
    /// Standard deviation of the grayscale histogram bin counts.
    pub histogram_std_dev: f64,
    /// Mean grayscale intensity.
    pub intensity_mean: f64,
    /// Coefficient distribution of the grayscale block DCT.
    pub dct: DctStats,
    /// Coefficient distribution of the grayscale block Haar transform.
    pub dwt: DwtStats,
    /// Block DCT over the colour channels; absent for grayscale images.
    pub dct_rgb: Option<DctStats>,
    /// Block Haar transform over the colour channels; absent for grayscale.
    pub dwt_rgb: Option<DwtStats>,
}

/// Distribution of every coefficient of every full 8×8 block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DctStats {
    pub blocks: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// Distribution of the one-level Haar coefficients of every full 8×8 block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DwtStats {
    pub blocks: usize,
    /// Mean over all four subbands.
    pub mean: f64,
    pub std_dev: f64,
    /// Mean squared detail coefficient (cH, cV and cD).
    pub detail_energy: f64,
}

/// Compute [`ImageStats`]; histogram figures use the grayscale conversion.
pub fn image_stats(image: &PixelImage) -> ImageStats {
    let gray = image.to_grayscale();
    let hist = Histogram::of_channel(&gray, 0);
    let colour = (image.channels() >= 3).then(|| image.color_channels());
    ImageStats {
        shape: image.shape(),
        histogram_mean: hist.count_mean(),
        histogram_std_dev: hist.count_std_dev(),
        intensity_mean: hist.intensity_mean(),
        dct: dct_stats(&gray, &[0]),
        dwt: dwt_stats(&gray, &[0]),
        dct_rgb: colour.as_ref().map(|c| dct_stats(image, c)),
        dwt_rgb: colour.as_ref().map(|c| dwt_stats(image, c)),
    }
}

/// Running count, sum and sum of squares.
#[derive(Default)]
struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.count as f64 - mean * mean).max(0.0).sqrt()
    }

    fn mean_square(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_sq / self.count as f64
        }
    }
}

/// Mean and standard deviation of all block-DCT coefficients of `channels`.
pub fn dct_stats(image: &PixelImage, channels: &[usize]) -> DctStats {
    let layout = BlockLayout::new(image, channels);
    let mut moments = Moments::default();

    for slot in layout.slots() {
        for c in transform::forward(&slot.read(image)) {
            moments.push(c);
        }
    }

    DctStats {
        blocks: layout.len(),
        mean: moments.mean(),
        std_dev: moments.std_dev(),
    }
}

const HALF: usize = BLOCK_SIZE / 2;

/// One subband of a Haar-transformed block, row-major.
pub type Subband = [f64; HALF * HALF];

/// Subbands of a one-level 2D Haar transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaarBlock {
    /// cA
    pub approximation: Subband,
    /// cH
    pub horizontal: Subband,
    /// cV
    pub vertical: Subband,
    /// cD
    pub diagonal: Subband,
}

/// One-level orthonormal 2D Haar transform of an 8×8 block.
///
/// Each 2×2 tile `[a b; c d]` yields `cA = (a+b+c+d)/2`,
/// `cH = (a+b-c-d)/2`, `cV = (a-b+c-d)/2` and `cD = (a-b-c+d)/2`.
pub fn haar(block: &transform::Block) -> HaarBlock {
    let mut out = HaarBlock {
        approximation: [0.0; HALF * HALF],
        horizontal: [0.0; HALF * HALF],
        vertical: [0.0; HALF * HALF],
        diagonal: [0.0; HALF * HALF],
    };
    for row in 0..HALF {
        for col in 0..HALF {
            let at = |dy: usize, dx: usize| block[(2 * row + dy) * BLOCK_SIZE + 2 * col + dx];
            let (a, b, c, d) = (at(0, 0), at(0, 1), at(1, 0), at(1, 1));
            let i = row * HALF + col;
            out.approximation[i] = (a + b + c + d) / 2.0;
            out.horizontal[i] = (a + b - c - d) / 2.0;
            out.vertical[i] = (a - b + c - d) / 2.0;
            out.diagonal[i] = (a - b - c + d) / 2.0;
        }
    }
    out
}

/// Haar coefficient distribution over the full blocks of `channels`.
pub fn dwt_stats(image: &PixelImage, channels: &[usize]) -> DwtStats {
    let layout = BlockLayout::new(image, channels);
    let mut all = Moments::default();
    let mut detail = Moments::default();

    for slot in layout.slots() {
        let bands = haar(&slot.read(image));
        for &c in &bands.approximation {
            all.push(c);
        }
        for band in [&bands.horizontal, &bands.vertical, &bands.diagonal] {
            for &c in band {
                all.push(c);
                detail.push(c);
            }
        }
    }

    DwtStats {
        blocks: layout.len(),
        mean: all.mean(),
        std_dev: all.std_dev(),
        detail_energy: detail.mean_square(),
    }
}

/// [`ImageStats`] plus the file's size and container format.
#[derive(Debug, Clone, Serialize)]
pub struct FileStats {
    pub file: FileInfo,
    pub stats: ImageStats,
}

/// Load the image at `path` and describe both the file and its pixels.
pub fn analyze_file(path: &Path) -> crate::Result<FileStats> {
    let file = io::file_info(path)?;
    let image = io::load_image(path)?;
    Ok(FileStats {
        file,
        stats: image_stats(&image),
    })
}

/// Side-by-side summary of an original and a modified image.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub original: ImageStats,
    pub modified: ImageStats,
    /// Samples that differ.
    pub changed_samples: u64,
    /// Largest absolute per-sample difference.
    pub max_difference: u8,
    /// Peak signal-to-noise ratio in dB; infinite for identical images.
    pub psnr: f64,
    pub difference_histogram: Histogram,
}

/// Compare two images of the same shape.
pub fn compare(original: &PixelImage, modified: &PixelImage) -> crate::Result<Comparison> {
    original.ensure_same_shape(modified)?;

    let diff = Histogram::of_difference(original, modified);
    let total = diff.total();
    let changed_samples = total - diff.get(0);
    let max_difference = (0..=255u8).rev().find(|&v| diff.get(v) > 0).unwrap_or(0);

    let squared: f64 = diff
        .counts()
        .iter()
        .enumerate()
        .map(|(d, &n)| (d * d) as f64 * n as f64)
        .sum();
    let psnr = if squared == 0.0 || total == 0 {
        f64::INFINITY
    } else {
        let mse = squared / total as f64;
        10.0 * (255.0f64 * 255.0 / mse).log10()
    };

    Ok(Comparison {
        original: image_stats(original),
        modified: image_stats(modified),
        changed_samples,
        max_difference,
        psnr,
        difference_histogram: diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_image_dct_stats() {
        let img = PixelImage::filled(16, 16, 1, 100).unwrap();
        let stats = dct_stats(&img, &[0]);

        // One DC of 800 and 63 zeros per block.
        assert_eq!(stats.blocks, 4);
        assert!((stats.mean - 800.0 / 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_block_has_only_approximation() {
        let block = [37.0; BLOCK_SIZE * BLOCK_SIZE];
        let bands = haar(&block);

        assert!(bands.approximation.iter().all(|&c| c == 74.0));
        for band in [bands.horizontal, bands.vertical, bands.diagonal] {
            assert!(band.iter().all(|&c| c == 0.0));
        }

        let img = PixelImage::filled(16, 8, 1, 37).unwrap();
        let stats = dwt_stats(&img, &[0]);
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.detail_energy, 0.0);
        assert!((stats.mean - 74.0 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_haar_detail_bands() {
        // Columns alternate 10, 20: only the vertical detail survives.
        let mut block = [0.0; BLOCK_SIZE * BLOCK_SIZE];
        for (i, v) in block.iter_mut().enumerate() {
            *v = if i % 2 == 0 { 10.0 } else { 20.0 };
        }
        let bands = haar(&block);

        assert!(bands.approximation.iter().all(|&c| c == 30.0));
        assert!(bands.vertical.iter().all(|&c| c == -10.0));
        assert!(bands.horizontal.iter().all(|&c| c == 0.0));
        assert!(bands.diagonal.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_rgb_block_stats() {
        let rgb = PixelImage::filled(16, 16, 3, 20).unwrap();
        let stats = image_stats(&rgb);
        assert_eq!(stats.dct_rgb.map(|s| s.blocks), Some(12));
        assert_eq!(stats.dwt_rgb.map(|s| s.blocks), Some(12));
        assert_eq!(stats.dwt.blocks, 4);

        let gray = PixelImage::filled(16, 16, 1, 20).unwrap();
        let stats = image_stats(&gray);
        assert!(stats.dct_rgb.is_none());
        assert!(stats.dwt_rgb.is_none());
    }

    #[test]
    fn test_analyze_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cover.png");
        let img = PixelImage::filled(8, 8, 3, 5).unwrap();
        io::save_image(&img, &path).unwrap();

        let report = analyze_file(&path).unwrap();
        assert_eq!(report.file.format.as_deref(), Some("PNG"));
        assert!(report.file.size_bytes > 0);
        assert_eq!(report.stats.shape, img.shape());
    }

    #[test]
    fn test_image_stats_histogram() {
        let img = PixelImage::filled(16, 16, 3, 50).unwrap();
        let stats = image_stats(&img);

        assert_eq!(stats.histogram_mean, 1.0);
        assert_eq!(stats.intensity_mean, 50.0);
        assert!(stats.histogram_std_dev > 0.0);
    }

    #[test]
    fn test_compare_identical() {
        let img = PixelImage::filled(8, 8, 3, 10).unwrap();
        let cmp = compare(&img, &img).unwrap();

        assert_eq!(cmp.changed_samples, 0);
        assert_eq!(cmp.max_difference, 0);
        assert!(cmp.psnr.is_infinite());
    }

    #[test]
    fn test_compare_counts_changes() {
        let a = PixelImage::filled(4, 4, 1, 10).unwrap();
        let mut b = a.clone();
        b.set(0, 0, 0, 11);
        b.set(1, 0, 0, 13);

        let cmp = compare(&a, &b).unwrap();
        assert_eq!(cmp.changed_samples, 2);
        assert_eq!(cmp.max_difference, 3);
        assert!(cmp.psnr.is_finite());
    }
}
