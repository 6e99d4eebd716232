//! Stegscan
//!
//! Hides text messages in raster images and tests image pairs for signs of
//! such hiding.
//!
//! # Features
//!
//! - **LSB embedding**: one bit per red, green and blue sample
//! - **Alpha embedding**: one bit per alpha sample, colour left untouched
//! - **DCT embedding**: one bit per 8×8 block, carried by the parity of its
//!   highest-frequency coefficient
//! - **Chi-square detection**: goodness-of-fit, contingency and LSB-pair tests
//!   at a fixed 0.05 significance level
//! - **CLI Interface**: single images or whole directories
//!
//! # Architecture
//!
//! ```text
//! Message → Bitstream (UTF-8 + terminator) → Embedder → Stego image
//! Reference + Subject → Histograms → Chi-square → Verdict
//! ```
//!
//! # Example
//!
//! ```rust
//! use stegscan::{embed, Detector, Method, PixelImage, StegoConfig};
//!
//! let cover = PixelImage::from_fn(64, 64, 3, |x, y, c| (x * 3 + y + c * 40) as u8).unwrap();
//! let mut stego = cover.clone();
//! let config = StegoConfig::new(Method::Lsb);
//!
//! embed::embed(&mut stego, "Hidden data", &config).unwrap();
//! assert_eq!(embed::extract(&stego, &config).unwrap(), "Hidden data");
//!
//! let report = Detector::default().analyze(&cover, &stego).unwrap();
//! println!("{}", report.verdict);
//! ```

pub mod analysis;
pub mod batch;
pub mod carrier;
pub mod config;
pub mod detect;
pub mod embed;
pub mod encoding;
pub mod error;
pub mod io;

pub use carrier::{PixelImage, Shape};
pub use config::{CapacityPolicy, ChannelSelection, DetectorConfig, Method, StegoConfig, TestMethod};
pub use detect::{Detector, Verdict};
pub use embed::{EmbedOutcome, Embedder};
pub use error::{Error, Result};
