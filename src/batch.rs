//! Directory batch runs.
//!
//! Every supported image directly under the input directory is processed
//! with every requested method. A failing item records its error and the
//! run moves on; only an unusable input directory aborts the batch.

use crate::carrier::PixelImage;
use crate::config::{DetectorConfig, Method, StegoConfig};
use crate::detect::{DetectionReport, Detector};
use crate::embed::{self, EmbedOutcome};
use crate::error::{Error, Result};
use crate::io;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of one (image, method) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus<T> {
    Ok(T),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem<T> {
    pub source: PathBuf,
    pub method: Method,
    pub status: ItemStatus<T>,
}

impl<T> BatchItem<T> {
    fn new(source: &Path, method: Method, result: std::result::Result<T, String>) -> Self {
        let status = match result {
            Ok(value) => ItemStatus::Ok(value),
            Err(e) => {
                log::warn!("Skipping {} ({}): {}", source.display(), method, e);
                ItemStatus::Failed(e)
            }
        };
        Self {
            source: source.to_path_buf(),
            method,
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, ItemStatus::Ok(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<T> {
    pub items: Vec<BatchItem<T>>,
}

impl<T> BatchReport<T> {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// What an embed item produced.
#[derive(Debug, Clone, Serialize)]
pub struct Embedded {
    pub output: PathBuf,
    pub outcome: EmbedOutcome,
}

/// Path a batch embed writes for `source` under `method`.
pub fn output_path(output_dir: &Path, method: Method, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    output_dir.join(method.as_str()).join(format!("{}.png", stem))
}

/// Supported image files directly under `dir`, sorted by name.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        // Skip hidden files
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }
        if io::is_supported(path) {
            images.push(path.to_path_buf());
        }
    }

    log::debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}

/// Embed `message` into every image of `input_dir` with each method.
///
/// `base` supplies the capacity policy and channel selection; its method is
/// replaced per item. Alpha embedding adds an opaque alpha channel to
/// carriers that lack one, since the batch has no other way to honour it.
pub fn embed_directory(
    input_dir: &Path,
    output_dir: &Path,
    message: &str,
    methods: &[Method],
    base: &StegoConfig,
) -> Result<BatchReport<Embedded>> {
    let sources = discover_images(input_dir)?;
    let mut items = Vec::with_capacity(sources.len() * methods.len());

    for source in &sources {
        let carrier = io::load_image(source).map_err(|e| e.to_string());
        for &method in methods {
            let result = match &carrier {
                Ok(image) => embed_one(image, source, output_dir, message, method, base)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.clone()),
            };
            items.push(BatchItem::new(source, method, result));
        }
    }

    let report = BatchReport { items };
    log::info!(
        "Batch embed: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

fn embed_one(
    image: &PixelImage,
    source: &Path,
    output_dir: &Path,
    message: &str,
    method: Method,
    base: &StegoConfig,
) -> Result<Embedded> {
    let config = StegoConfig {
        method,
        ..base.clone()
    };
    let mut stego = if method == Method::Rgba && !image.has_alpha() {
        image.with_opaque_alpha()
    } else {
        image.clone()
    };

    let outcome = embed::embed(&mut stego, message, &config)?;
    let output = output_path(output_dir, method, source);
    io::save_image(&stego, &output)?;
    Ok(Embedded { output, outcome })
}

/// Run the detector on each original and its stego counterparts.
///
/// Counterparts are looked up at [`output_path`] under `stego_dir`, the
/// layout [`embed_directory`] writes.
pub fn detect_directory(
    original_dir: &Path,
    stego_dir: &Path,
    methods: &[Method],
    config: &DetectorConfig,
) -> Result<BatchReport<DetectionReport>> {
    let detector = Detector::new(config.clone());
    let sources = discover_images(original_dir)?;
    let mut items = Vec::with_capacity(sources.len() * methods.len());

    for source in &sources {
        let reference = io::load_image(source).map_err(|e| e.to_string());
        for &method in methods {
            let result = match &reference {
                Ok(reference) => detect_one(&detector, reference, stego_dir, method, source)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.clone()),
            };
            items.push(BatchItem::new(source, method, result));
        }
    }

    let report = BatchReport { items };
    log::info!(
        "Batch detect: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

fn detect_one(
    detector: &Detector,
    reference: &PixelImage,
    stego_dir: &Path,
    method: Method,
    source: &Path,
) -> Result<DetectionReport> {
    let subject = io::load_image(&output_path(stego_dir, method, source))?;
    // Alpha stego files carry an extra channel the reference may lack.
    let reference = if subject.has_alpha() && !reference.has_alpha() {
        reference.with_opaque_alpha()
    } else {
        reference.clone()
    };
    detector.analyze(&reference, &subject)
}
