//! Chi-square test statistics over histograms and LSB parity counts.

use super::distribution::chi_square_sf;
use super::histogram::Histogram;
use crate::config::{BIN_CORRECTION, HISTOGRAM_BINS};
use serde::Serialize;

/// A computed chi-square statistic with its tail probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquare {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
}

impl ChiSquare {
    /// Attach a p-value to a statistic.
    pub fn new(statistic: f64, degrees_of_freedom: f64) -> Self {
        let statistic = statistic.max(0.0);
        Self {
            statistic,
            degrees_of_freedom,
            p_value: chi_square_sf(statistic, degrees_of_freedom),
        }
    }
}

fn pearson<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    pairs
        .into_iter()
        .filter(|&(_, e)| e > 0.0)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum()
}

/// Goodness of fit against a uniform distribution over all 256 values.
pub fn goodness_of_fit_uniform(observed: &Histogram) -> ChiSquare {
    let expected = observed.total() as f64 / HISTOGRAM_BINS as f64;
    let statistic = pearson(observed.counts().iter().map(|&o| (o as f64, expected)));
    ChiSquare::new(statistic, (HISTOGRAM_BINS - 1) as f64)
}

/// Goodness of fit of `observed` against the shape of `reference`.
///
/// Both histograms get the additive bin correction, then the reference is
/// scaled to the observed total.
pub fn goodness_of_fit(observed: &Histogram, reference: &Histogram) -> ChiSquare {
    let obs: Vec<f64> = corrected(observed);
    let refs: Vec<f64> = corrected(reference);
    let scale = obs.iter().sum::<f64>() / refs.iter().sum::<f64>();

    let statistic = pearson(obs.iter().zip(&refs).map(|(&o, &r)| (o, r * scale)));
    ChiSquare::new(statistic, (HISTOGRAM_BINS - 1) as f64)
}

/// Two-sample test on the 2×256 contingency table of both histograms.
pub fn contingency(a: &Histogram, b: &Histogram) -> ChiSquare {
    let rows = [corrected(a), corrected(b)];
    let row_totals: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
    let grand: f64 = row_totals.iter().sum();

    let mut statistic = 0.0;
    let mut live_columns = 0usize;
    for bin in 0..HISTOGRAM_BINS {
        let col_total = rows[0][bin] + rows[1][bin];
        if col_total <= 0.0 {
            continue;
        }
        live_columns += 1;
        for (row, &row_total) in rows.iter().zip(&row_totals) {
            let expected = row_total * col_total / grand;
            if expected > 0.0 {
                statistic += (row[bin] - expected).powi(2) / expected;
            }
        }
    }

    let dof = (rows.len() - 1) * live_columns.saturating_sub(1);
    ChiSquare::new(statistic, dof.max(1) as f64)
}

/// Balance of even and odd LSBs against an even 50/50 split.
pub fn lsb_pair(even: u64, odd: u64) -> ChiSquare {
    let expected = (even + odd) as f64 / 2.0;
    if expected == 0.0 {
        return ChiSquare::new(0.0, 1.0);
    }
    let statistic = pearson([(even as f64, expected), (odd as f64, expected)]);
    ChiSquare::new(statistic, 1.0)
}

/// [`lsb_pair`] over the parity counts of a histogram.
pub fn lsb_pair_histogram(hist: &Histogram) -> ChiSquare {
    let (even, odd) = hist.parity_counts();
    lsb_pair(even, odd)
}

fn corrected(hist: &Histogram) -> Vec<f64> {
    hist.counts()
        .iter()
        .map(|&n| n as f64 + BIN_CORRECTION)
        .collect()
}
