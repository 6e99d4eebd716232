//! Chi-square steganalysis.
//!
//! The detector compares a reference image with a subject image. It knows
//! nothing about which embedder, if any, produced the subject. The test
//! formulations are named strategies ([`TestMethod`]); the uniform test
//! also runs on a lone subject through [`Detector::evaluate_single`]. Every
//! verdict uses the fixed [`SIGNIFICANCE_LEVEL`].

mod chi_square;
mod distribution;
mod histogram;

pub use chi_square::{
    contingency, goodness_of_fit, goodness_of_fit_uniform, lsb_pair, lsb_pair_histogram,
    ChiSquare,
};
pub use distribution::{chi_square_sf, critical_value, gamma_q, ln_gamma};
pub use histogram::Histogram;

use crate::carrier::{PixelImage, Shape};
use crate::config::{DetectorConfig, TestMethod, SIGNIFICANCE_LEVEL};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Outcome of a single hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// p-value below the significance level.
    ModificationLikely,
    NoSignificantDeviation,
}

impl Verdict {
    pub fn is_modified(&self) -> bool {
        matches!(self, Verdict::ModificationLikely)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ModificationLikely => f.write_str("modification likely"),
            Verdict::NoSignificantDeviation => f.write_str("no significant deviation"),
        }
    }
}

/// A statistic, its p-value and the resulting verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub verdict: Verdict,
}

impl From<ChiSquare> for Detection {
    fn from(chi: ChiSquare) -> Self {
        let verdict = if chi.p_value < SIGNIFICANCE_LEVEL {
            Verdict::ModificationLikely
        } else {
            Verdict::NoSignificantDeviation
        };
        Self {
            statistic: chi.statistic,
            degrees_of_freedom: chi.degrees_of_freedom,
            p_value: chi.p_value,
            verdict,
        }
    }
}

/// Turn a statistic into a verdict at the fixed significance level.
///
/// # Example
///
/// ```
/// use stegscan::detect::{evaluate, Verdict};
///
/// assert_eq!(evaluate(3.9, 1.0).verdict, Verdict::ModificationLikely);
/// assert_eq!(evaluate(3.8, 1.0).verdict, Verdict::NoSignificantDeviation);
/// ```
pub fn evaluate(statistic: f64, degrees_of_freedom: f64) -> Detection {
    ChiSquare::new(statistic, degrees_of_freedom).into()
}

/// LSB-pair results for one channel of both images.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelLsb {
    pub channel: usize,
    pub reference: Detection,
    pub subject: Detection,
}

/// Every test the detector knows, run on one image pair.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub shape: Shape,
    pub channels: Vec<usize>,
    pub goodness_of_fit: Detection,
    pub contingency: Detection,
    /// Combined LSB balance of the reference, for comparison.
    pub reference_lsb_pair: Detection,
    /// Combined LSB balance of the subject.
    pub lsb_pair: Detection,
    /// Subject histogram against a flat distribution.
    pub uniform: Detection,
    pub per_channel: Vec<ChannelLsb>,
    /// Test chosen for the overall verdict.
    pub headline: TestMethod,
    pub verdict: Verdict,
}

impl DetectionReport {
    pub fn get(&self, method: TestMethod) -> &Detection {
        match method {
            TestMethod::GoodnessOfFit => &self.goodness_of_fit,
            TestMethod::Contingency => &self.contingency,
            TestMethod::LsbPair => &self.lsb_pair,
            TestMethod::Uniform => &self.uniform,
        }
    }
}

/// Chi-square detector for reference/subject image pairs.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn channels(&self, reference: &PixelImage, subject: &PixelImage) -> Result<Vec<usize>> {
        reference.ensure_same_shape(subject)?;
        self.config
            .channels
            .resolve(&reference.color_channels(), reference.channels())
            .map_err(Error::InvalidConfig)
    }

    /// Run one named test on an image pair.
    pub fn evaluate(
        &self,
        method: TestMethod,
        reference: &PixelImage,
        subject: &PixelImage,
    ) -> Result<Detection> {
        let channels = self.channels(reference, subject)?;
        Ok(run_test(method, reference, subject, &channels).into())
    }

    /// Run the uniform test on `subject` alone.
    ///
    /// Without a reference the histogram is compared with a flat
    /// distribution over all 256 values, so natural images with skewed
    /// histograms are flagged as readily as stego images.
    pub fn evaluate_single(&self, subject: &PixelImage) -> Result<Detection> {
        let channels = self
            .config
            .channels
            .resolve(&subject.color_channels(), subject.channels())
            .map_err(Error::InvalidConfig)?;
        let detection: Detection =
            goodness_of_fit_uniform(&Histogram::of_channels(subject, &channels)).into();
        log::debug!(
            "{}: uniform = {:.4} (p = {:.4e}) -> {}",
            subject.shape(),
            detection.statistic,
            detection.p_value,
            detection.verdict
        );
        Ok(detection)
    }

    /// Run the configured headline test.
    pub fn detect(&self, reference: &PixelImage, subject: &PixelImage) -> Result<Detection> {
        self.evaluate(self.config.test, reference, subject)
    }

    /// Run every test plus per-channel LSB balance.
    pub fn analyze(&self, reference: &PixelImage, subject: &PixelImage) -> Result<DetectionReport> {
        let channels = self.channels(reference, subject)?;

        let goodness_of_fit: Detection =
            run_test(TestMethod::GoodnessOfFit, reference, subject, &channels).into();
        let contingency: Detection =
            run_test(TestMethod::Contingency, reference, subject, &channels).into();
        let lsb_pair: Detection =
            run_test(TestMethod::LsbPair, reference, subject, &channels).into();
        let uniform: Detection =
            run_test(TestMethod::Uniform, reference, subject, &channels).into();
        let reference_lsb_pair: Detection =
            lsb_pair_histogram(&Histogram::of_channels(reference, &channels)).into();

        let per_channel = channels
            .iter()
            .map(|&channel| ChannelLsb {
                channel,
                reference: lsb_pair_histogram(&Histogram::of_channel(reference, channel)).into(),
                subject: lsb_pair_histogram(&Histogram::of_channel(subject, channel)).into(),
            })
            .collect();

        let headline = self.config.test;
        let mut report = DetectionReport {
            shape: reference.shape(),
            channels,
            goodness_of_fit,
            contingency,
            reference_lsb_pair,
            lsb_pair,
            uniform,
            per_channel,
            headline,
            verdict: Verdict::NoSignificantDeviation,
        };
        report.verdict = report.get(headline).verdict;
        let verdict = report.verdict;

        let head = report.get(headline);
        log::debug!(
            "{}: {} = {:.4} (p = {:.4e}) -> {}",
            report.shape,
            headline,
            head.statistic,
            head.p_value,
            verdict
        );
        Ok(report)
    }
}

fn run_test(
    method: TestMethod,
    reference: &PixelImage,
    subject: &PixelImage,
    channels: &[usize],
) -> ChiSquare {
    let subject_hist = Histogram::of_channels(subject, channels);
    match method {
        TestMethod::GoodnessOfFit => {
            goodness_of_fit(&subject_hist, &Histogram::of_channels(reference, channels))
        }
        TestMethod::Contingency => {
            contingency(&Histogram::of_channels(reference, channels), &subject_hist)
        }
        TestMethod::LsbPair => lsb_pair_histogram(&subject_hist),
        TestMethod::Uniform => goodness_of_fit_uniform(&subject_hist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smooth(width: usize, height: usize, channels: usize) -> PixelImage {
        PixelImage::from_fn(width, height, channels, |x, y, c| {
            ((x + 2 * y + 40 * c) % 200) as u8
        })
        .unwrap()
    }

    #[test]
    fn test_identical_images_no_deviation() {
        let img = smooth(64, 64, 3);
        let detector = Detector::default();

        for method in TestMethod::ALL {
            if !method.needs_reference() {
                continue;
            }
            let result = detector.evaluate(method, &img, &img).unwrap();
            assert!(result.statistic.abs() < 1e-9, "{}", method);
            assert!((result.p_value - 1.0).abs() < 1e-12, "{}", method);
            assert_eq!(result.verdict, Verdict::NoSignificantDeviation);
        }
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let rgb = smooth(32, 32, 3);
        let gray = smooth(32, 32, 1);
        let detector = Detector::default();

        assert!(matches!(
            detector.evaluate(TestMethod::Contingency, &rgb, &gray),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            detector.analyze(&rgb, &smooth(32, 16, 3)),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_evaluate_threshold() {
        let above = evaluate(4.0, 1.0);
        assert!(above.verdict.is_modified());

        let below = evaluate(0.5, 1.0);
        assert!(!below.verdict.is_modified());
        assert_eq!(evaluate(0.0, 255.0).p_value, 1.0);
    }

    #[test]
    fn test_analyze_report_shape() {
        let img = smooth(16, 16, 4);
        let report = Detector::new(DetectorConfig::new(TestMethod::LsbPair))
            .analyze(&img, &img)
            .unwrap();

        assert_eq!(report.channels, vec![0, 1, 2]);
        assert_eq!(report.per_channel.len(), 3);
        assert_eq!(report.headline, TestMethod::LsbPair);
        assert_eq!(report.verdict, report.lsb_pair.verdict);
        assert_eq!(report.get(TestMethod::LsbPair), &report.lsb_pair);
    }

    #[test]
    fn test_flattened_lsb_detected() {
        // Subject with every LSB forced to 0 is maximally unbalanced.
        let reference = smooth(64, 64, 1);
        let mut subject = reference.clone();
        subject
            .update_samples(&[0], |s| {
                *s &= !1;
                true
            })
            .unwrap();

        let result = Detector::default()
            .evaluate(TestMethod::LsbPair, &reference, &subject)
            .unwrap();
        assert_eq!(result.verdict, Verdict::ModificationLikely);
    }

    #[test]
    fn test_evaluate_single_uniform() {
        // Every value appears exactly 16 times.
        let flat = PixelImage::from_fn(64, 64, 1, |x, y, _| ((x + 64 * (y % 4)) % 256) as u8)
            .unwrap();
        let detector = Detector::default();

        let result = detector.evaluate_single(&flat).unwrap();
        assert!(result.statistic.abs() < 1e-9);
        assert_eq!(result.degrees_of_freedom, 255.0);
        assert_eq!(result.verdict, Verdict::NoSignificantDeviation);

        let report = detector.analyze(&flat, &flat).unwrap();
        assert_eq!(report.get(TestMethod::Uniform), &result);
    }
}
