//! Orthonormal 8×8 DCT-II and its inverse.
//!
//! Both directions are separable and use the same normalised basis, so
//! `inverse(forward(b)) == b` up to floating-point error.

use crate::config::BLOCK_SIZE;
use std::sync::OnceLock;

/// Coefficients of one block in row-major order; index = row * 8 + col.
pub type Block = [f64; BLOCK_SIZE * BLOCK_SIZE];

/// `BASIS[u][x] = C(u) * cos((2x + 1) * u * PI / 16)` with C(0) = 1/sqrt(8), C(u>0) = 1/2.
static BASIS: OnceLock<[[f64; BLOCK_SIZE]; BLOCK_SIZE]> = OnceLock::new();

fn basis() -> &'static [[f64; BLOCK_SIZE]; BLOCK_SIZE] {
    BASIS.get_or_init(|| {
        let n = BLOCK_SIZE as f64;
        let mut table = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
        for (u, row) in table.iter_mut().enumerate() {
            let scale = if u == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            for (x, value) in row.iter_mut().enumerate() {
                *value = scale
                    * ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / (2.0 * n)).cos();
            }
        }
        table
    })
}

/// Forward 2D DCT of a block of samples.
pub fn forward(samples: &Block) -> Block {
    let b = basis();

    // Rows.
    let mut temp = [0.0f64; 64];
    for row in 0..BLOCK_SIZE {
        for u in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for x in 0..BLOCK_SIZE {
                sum += samples[row * BLOCK_SIZE + x] * b[u][x];
            }
            temp[row * BLOCK_SIZE + u] = sum;
        }
    }

    // Columns.
    let mut coeffs = [0.0f64; 64];
    for col in 0..BLOCK_SIZE {
        for v in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for y in 0..BLOCK_SIZE {
                sum += temp[y * BLOCK_SIZE + col] * b[v][y];
            }
            coeffs[v * BLOCK_SIZE + col] = sum;
        }
    }
    coeffs
}

/// Inverse 2D DCT back to (unclipped, unrounded) samples.
pub fn inverse(coeffs: &Block) -> Block {
    let b = basis();

    // Columns.
    let mut temp = [0.0f64; 64];
    for col in 0..BLOCK_SIZE {
        for y in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for v in 0..BLOCK_SIZE {
                sum += coeffs[v * BLOCK_SIZE + col] * b[v][y];
            }
            temp[y * BLOCK_SIZE + col] = sum;
        }
    }

    // Rows.
    let mut samples = [0.0f64; 64];
    for row in 0..BLOCK_SIZE {
        for x in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for u in 0..BLOCK_SIZE {
                sum += temp[row * BLOCK_SIZE + u] * b[u][x];
            }
            samples[row * BLOCK_SIZE + x] = sum;
        }
    }
    samples
}

/// Clip to [0, 255] and round to the nearest integer.
pub fn to_pixels(samples: &Block) -> [u8; 64] {
    let mut out = [0u8; 64];
    for (o, &s) in out.iter_mut().zip(samples.iter()) {
        *o = s.clamp(0.0, 255.0).round() as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured() -> Block {
        let mut block = [0.0f64; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = ((i * 37 + (i / 8) * 11) % 256) as f64;
        }
        block
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let block = textured();
        let back = inverse(&forward(&block));

        for i in 0..64 {
            assert!((block[i] - back[i]).abs() < 1e-9, "index {}", i);
        }
    }

    #[test]
    fn test_pixel_roundtrip_within_one() {
        let block = textured();
        let pixels = to_pixels(&inverse(&forward(&block)));

        for i in 0..64 {
            assert!((block[i] - pixels[i] as f64).abs() <= 1.0);
        }
    }

    #[test]
    fn test_flat_block_is_dc_only() {
        let block = [100.0f64; 64];
        let coeffs = forward(&block);

        // Orthonormal DC = 8 * mean.
        assert!((coeffs[0] - 800.0).abs() < 1e-9);
        for &c in &coeffs[1..] {
            assert!(c.abs() < 1e-9);
        }
    }

    #[test]
    fn test_energy_preserved() {
        let block = textured();
        let coeffs = forward(&block);

        let spatial: f64 = block.iter().map(|v| v * v).sum();
        let spectral: f64 = coeffs.iter().map(|v| v * v).sum();
        assert!((spatial - spectral).abs() / spatial < 1e-12);
    }

    #[test]
    fn test_to_pixels_clips() {
        let mut samples = [0.0f64; 64];
        samples[0] = -3.2;
        samples[1] = 260.0;
        samples[2] = 127.5;

        let px = to_pixels(&samples);
        assert_eq!(px[0], 0);
        assert_eq!(px[1], 255);
        assert_eq!(px[2], 128);
    }
}
