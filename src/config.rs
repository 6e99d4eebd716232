//! Configuration constants and types for stegscan.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// End-of-payload marker appended to every bitstream: `1111111111111110`.
pub const TERMINATOR: [bool; 16] = [
    true, true, true, true, true, true, true, true, true, true, true, true, true, true, true,
    false,
];

/// Side length of a DCT block.
pub const BLOCK_SIZE: usize = 8;

/// Number of bins in an 8-bit intensity histogram.
pub const HISTOGRAM_BINS: usize = 256;

/// Significance level for every chi-square verdict.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Additive correction applied to each histogram bin before two-sample tests.
pub const BIN_CORRECTION: f64 = 0.5;

/// Largest coefficient shift tried when forcing a DCT parity bit.
pub const MAX_PARITY_SHIFT: f64 = 16.0;

/// Channel index of alpha in a 4-channel image.
pub const ALPHA_CHANNEL: usize = 3;

/// Embedding method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// LSB of the red, green and blue channels.
    Lsb,
    /// LSB of the alpha channel.
    Rgba,
    /// Parity of the highest-frequency coefficient of each 8×8 DCT block.
    Dct,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Lsb, Method::Rgba, Method::Dct];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Lsb => "lsb",
            Method::Rgba => "rgba",
            Method::Dct => "dct",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lsb" => Ok(Method::Lsb),
            "rgba" | "alpha" => Ok(Method::Rgba),
            "dct" => Ok(Method::Dct),
            other => Err(format!("Unknown method '{}': expected lsb, rgba or dct", other)),
        }
    }
}

/// What to do when the bitstream is longer than the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Refuse to embed; the image is left untouched.
    #[default]
    Strict,
    /// Embed as many bits as fit and report the truncation.
    Truncate,
}

/// Which channels an embedder writes to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSelection {
    /// The method's natural channels: RGB for `lsb` and `dct`, alpha for `rgba`.
    #[default]
    Auto,
    /// Explicit channel indices, visited in the given order.
    Only(Vec<usize>),
}

impl ChannelSelection {
    /// Resolve the selection against an image with `channels` channels.
    ///
    /// `natural` is the method's default list for that layout.
    pub fn resolve(&self, natural: &[usize], channels: usize) -> Result<Vec<usize>, String> {
        match self {
            ChannelSelection::Auto => Ok(natural.to_vec()),
            ChannelSelection::Only(list) => {
                if list.is_empty() {
                    return Err("Channel list must not be empty".to_string());
                }
                if let Some(bad) = list.iter().find(|&&c| c >= channels) {
                    return Err(format!(
                        "Channel {} out of range for a {}-channel image",
                        bad, channels
                    ));
                }
                Ok(list.clone())
            }
        }
    }
}

/// Parameters for one embed or extract call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StegoConfig {
    /// Embedding method.
    pub method: Method,

    /// Behaviour when the message does not fit.
    #[serde(default)]
    pub capacity_policy: CapacityPolicy,

    /// Channels to use.
    #[serde(default)]
    pub channels: ChannelSelection,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            method: Method::Lsb,
            capacity_policy: CapacityPolicy::Strict,
            channels: ChannelSelection::Auto,
        }
    }
}

impl StegoConfig {
    /// Create a configuration for `method` with default policy and channels.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    pub fn with_channels(mut self, channels: Vec<usize>) -> Self {
        self.channels = ChannelSelection::Only(channels);
        self
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StegoConfig = serde_json::from_str(&content)?;
        config.validate().map_err(crate::Error::InvalidConfig)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let ChannelSelection::Only(list) = &self.channels {
            if list.is_empty() {
                return Err("Channel list must not be empty".to_string());
            }
            if list.iter().any(|&c| c > ALPHA_CHANNEL) {
                return Err("Channel indices must be between 0 and 3".to_string());
            }
            let mut seen = list.clone();
            seen.sort_unstable();
            seen.dedup();
            if seen.len() != list.len() {
                return Err("Channel list must not contain duplicates".to_string());
            }
            match self.method {
                Method::Rgba if list.as_slice() != [ALPHA_CHANNEL] => {
                    return Err("The rgba method only writes the alpha channel".to_string());
                }
                Method::Lsb | Method::Dct if list.contains(&ALPHA_CHANNEL) => {
                    return Err(format!(
                        "The {} method never writes the alpha channel",
                        self.method
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Chi-square test formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestMethod {
    /// Subject histogram against the reference histogram.
    GoodnessOfFit,
    /// 2×256 contingency table of both histograms.
    #[default]
    Contingency,
    /// Even/odd LSB balance of the subject.
    LsbPair,
    /// Subject histogram against a flat distribution; needs no reference.
    Uniform,
}

impl TestMethod {
    pub const ALL: [TestMethod; 4] = [
        TestMethod::GoodnessOfFit,
        TestMethod::Contingency,
        TestMethod::LsbPair,
        TestMethod::Uniform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestMethod::GoodnessOfFit => "goodness-of-fit",
            TestMethod::Contingency => "contingency",
            TestMethod::LsbPair => "lsb-pair",
            TestMethod::Uniform => "uniform",
        }
    }

    /// Whether the test compares against a reference image.
    pub fn needs_reference(&self) -> bool {
        matches!(self, TestMethod::GoodnessOfFit | TestMethod::Contingency)
    }
}

impl fmt::Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "goodness-of-fit" | "gof" => Ok(TestMethod::GoodnessOfFit),
            "contingency" => Ok(TestMethod::Contingency),
            "lsb-pair" | "lsb" => Ok(TestMethod::LsbPair),
            "uniform" => Ok(TestMethod::Uniform),
            other => Err(format!("Unknown test '{}'", other)),
        }
    }
}

/// Detector configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Test used for the headline verdict.
    #[serde(default)]
    pub test: TestMethod,

    /// Channels to histogram; `Auto` means every colour channel (alpha excluded).
    #[serde(default)]
    pub channels: ChannelSelection,
}

impl DetectorConfig {
    pub fn new(test: TestMethod) -> Self {
        Self {
            test,
            channels: ChannelSelection::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("LSB".parse::<Method>().unwrap(), Method::Lsb);
        assert_eq!("alpha".parse::<Method>().unwrap(), Method::Rgba);
        assert_eq!("dct".parse::<Method>().unwrap(), Method::Dct);
        assert!("dwt".parse::<Method>().is_err());
    }

    #[test]
    fn test_test_method_parse() {
        assert_eq!("gof".parse::<TestMethod>().unwrap(), TestMethod::GoodnessOfFit);
        assert_eq!("Uniform".parse::<TestMethod>().unwrap(), TestMethod::Uniform);
        assert!("all".parse::<TestMethod>().is_err());

        let json = serde_json::to_string(&TestMethod::LsbPair).unwrap();
        assert_eq!(json, "\"lsb-pair\"");
        assert!(!TestMethod::Uniform.needs_reference());
        assert!(TestMethod::Contingency.needs_reference());
    }

    #[test]
    fn test_rgba_requires_alpha_channel_only() {
        let config = StegoConfig::new(Method::Rgba).with_channels(vec![0, 3]);
        assert!(config.validate().is_err());

        let config = StegoConfig::new(Method::Rgba).with_channels(vec![3]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_colour_methods_reject_alpha_channel() {
        for method in [Method::Lsb, Method::Dct] {
            let config = StegoConfig::new(method).with_channels(vec![3]);
            assert!(config.validate().is_err(), "{}", method);

            let config = StegoConfig::new(method).with_channels(vec![0, 3]);
            assert!(config.validate().is_err(), "{}", method);

            let config = StegoConfig::new(method).with_channels(vec![2, 1]);
            assert!(config.validate().is_ok(), "{}", method);
        }
    }

    #[test]
    fn test_duplicate_channels_rejected() {
        let config = StegoConfig::new(Method::Lsb).with_channels(vec![0, 0]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json() {
        let json = r#"{"method":"dct","capacity_policy":"truncate"}"#;
        let config: StegoConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.method, Method::Dct);
        assert_eq!(config.capacity_policy, CapacityPolicy::Truncate);
        assert_eq!(config.channels, ChannelSelection::Auto);
    }

    #[test]
    fn test_load_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stego.json");
        let config = StegoConfig::new(Method::Lsb).with_channels(vec![2, 0]);

        config.save(&path).unwrap();
        assert_eq!(StegoConfig::load(&path).unwrap(), config);

        std::fs::write(&path, r#"{"method":"rgba","channels":{"only":[0]}}"#).unwrap();
        assert!(matches!(
            StegoConfig::load(&path),
            Err(crate::Error::InvalidConfig(_))
        ));

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            StegoConfig::load(&path),
            Err(crate::Error::Serialization(_))
        ));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let selection = ChannelSelection::Only(vec![0, 3]);
        assert!(selection.resolve(&[0, 1, 2], 3).is_err());
        assert_eq!(selection.resolve(&[0, 1, 2], 4).unwrap(), vec![0, 3]);
    }
}
