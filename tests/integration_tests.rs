//! Integration tests for end-to-end embedding, extraction and file I/O.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stegscan::batch::{self, ItemStatus};
use stegscan::embed::{self, DctEmbedder, LsbEmbedder};
use stegscan::encoding;
use stegscan::{
    io, CapacityPolicy, ChannelSelection, EmbedOutcome, Embedder, Error, Method, PixelImage,
    StegoConfig,
};
use std::fs;
use tempfile::TempDir;

/// Noisy gradient carrier, reproducible per seed.
fn textured(width: usize, height: usize, channels: usize, seed: u64) -> PixelImage {
    let mut rng = StdRng::seed_from_u64(seed);
    PixelImage::from_fn(width, height, channels, |x, y, c| {
        let base = 50 + ((x * 2 + y * 3 + c * 17) % 120) as i32;
        (base + rng.gen_range(-25..=25)) as u8
    })
    .expect("Failed to build carrier")
}

fn carrier_for(method: Method, seed: u64) -> PixelImage {
    let image = textured(64, 64, 3, seed);
    if method == Method::Rgba {
        image.with_opaque_alpha()
    } else {
        image
    }
}

#[test]
fn test_roundtrip_all_methods() {
    let message = "héllo ✓";

    for (seed, method) in Method::ALL.into_iter().enumerate() {
        let mut image = carrier_for(method, seed as u64);
        let config = StegoConfig::new(method);

        let outcome = embed::embed(&mut image, message, &config).expect("Failed to embed");
        assert!(outcome.is_complete(), "{}", method);
        assert_eq!(outcome.bits_written(), 10 * 8 + 16);

        let recovered = embed::extract(&image, &config).expect("Failed to extract");
        assert_eq!(recovered, message, "{}", method);
    }
}

#[test]
fn test_empty_message_roundtrip() {
    for method in Method::ALL {
        let mut image = carrier_for(method, 7);
        let config = StegoConfig::new(method);

        embed::embed(&mut image, "", &config).expect("Failed to embed");
        assert_eq!(embed::extract(&image, &config).expect("Failed to extract"), "");
    }
}

#[test]
fn test_capacity_boundary_alpha() {
    // 8x8 alpha plane: 64 bits = 6 bytes + terminator
    let cover = PixelImage::filled(8, 8, 4, 200).expect("Failed to build carrier");
    let config = StegoConfig::new(Method::Rgba);
    assert_eq!(embed::capacity(&cover, &config).unwrap(), 64);

    let mut fits = cover.clone();
    embed::embed(&mut fits, "abcdef", &config).expect("Exact fit should embed");
    assert_eq!(embed::extract(&fits, &config).unwrap(), "abcdef");

    let mut too_long = cover.clone();
    let err = embed::embed(&mut too_long, "abcdefg", &config).unwrap_err();
    assert!(matches!(
        err,
        Error::CapacityExceeded {
            needed: 72,
            available: 64
        }
    ));
    assert_eq!(too_long, cover, "failed embed must not touch the image");
}

#[test]
fn test_capacity_boundary_dct() {
    // 64x64 RGB: 8x8 blocks per channel, 192 bits = 22 bytes + terminator
    let cover = textured(64, 64, 3, 11);
    let config = StegoConfig::new(Method::Dct);
    assert_eq!(embed::capacity(&cover, &config).unwrap(), 192);

    let exact = "twenty-two bytes fit!!";
    assert_eq!(exact.len(), 22);
    let mut fits = cover.clone();
    let outcome = embed::embed(&mut fits, exact, &config).expect("Exact fit should embed");
    assert_eq!(outcome.bits_written(), 192);
    assert_eq!(embed::extract(&fits, &config).unwrap(), exact);

    let over = "twenty-three bytes fit?";
    assert_eq!(over.len(), 23);
    let mut too_long = cover.clone();
    let err = embed::embed(&mut too_long, over, &config).unwrap_err();
    assert!(matches!(
        err,
        Error::CapacityExceeded {
            needed: 200,
            available: 192
        }
    ));
    assert_eq!(too_long, cover, "failed embed must not touch the image");
}

#[test]
fn test_truncate_policy_reports_partial_write() {
    let mut image = PixelImage::filled(4, 4, 3, 100).unwrap();
    let config = StegoConfig::new(Method::Lsb).with_policy(CapacityPolicy::Truncate);

    let outcome = embed::embed(&mut image, "far too long for sixteen pixels", &config).unwrap();
    assert_eq!(
        outcome,
        EmbedOutcome::Truncated {
            written: 48,
            capacity: 48
        }
    );
    assert!(matches!(
        embed::extract(&image, &config),
        Err(Error::TerminatorNotFound { .. })
    ));
}

#[test]
fn test_alpha_requires_alpha_channel() {
    let mut rgb = textured(16, 16, 3, 1);
    let config = StegoConfig::new(Method::Rgba);

    assert!(matches!(
        embed::embed(&mut rgb, "x", &config),
        Err(Error::NoAlphaChannel)
    ));

    let mut rgba = rgb.with_opaque_alpha();
    embed::embed(&mut rgba, "x", &config).unwrap();
    for y in 0..16 {
        for x in 0..16 {
            for c in 0..3 {
                assert_eq!(rgba.get(x, y, c), rgb.get(x, y, c));
            }
        }
    }
}

#[test]
fn test_dct_skips_partial_blocks() {
    let cover = textured(37, 29, 3, 11);
    let embedder = DctEmbedder::new(ChannelSelection::Auto);

    // floor(29/8) * floor(37/8) * 3
    assert_eq!(embedder.capacity(&cover).unwrap(), 3 * 4 * 3);

    let mut stego = cover.clone();
    embedder
        .embed(&mut stego, "ok", CapacityPolicy::Strict)
        .expect("Failed to embed");
    assert_eq!(embedder.extract(&stego).unwrap(), "ok");

    for y in 0..29 {
        for x in 0..37 {
            if x < 32 && y < 24 {
                continue;
            }
            for c in 0..3 {
                assert_eq!(stego.get(x, y, c), cover.get(x, y, c), "({}, {}, {})", x, y, c);
            }
        }
    }
}

#[test]
fn test_terminator_inside_payload_ends_extraction() {
    let mut image = textured(16, 16, 3, 3);
    let embedder = LsbEmbedder::new(ChannelSelection::Auto);
    let bits = encoding::encode_bytes(&[b'A', 0xFF, 0xFE, b'B']);

    embedder
        .embed_bits(&mut image, &bits, CapacityPolicy::Strict)
        .unwrap();
    assert_eq!(embedder.extract_bytes(&image).unwrap(), vec![b'A']);
}

#[test]
fn test_extract_from_blank_carrier() {
    let image = PixelImage::filled(8, 8, 3, 0).unwrap();
    let result = embed::extract(&image, &StegoConfig::new(Method::Lsb));

    assert!(matches!(
        result,
        Err(Error::TerminatorNotFound { bits_scanned: 192 })
    ));
}

#[test]
fn test_png_file_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cover_path = temp_dir.path().join("cover.png");
    let stego_path = temp_dir.path().join("out").join("stego.png");

    io::save_image(&textured(48, 40, 3, 5), &cover_path).expect("Failed to save cover");

    let config = StegoConfig::new(Method::Dct);
    let mut image = io::load_image(&cover_path).expect("Failed to load cover");
    embed::embed(&mut image, "on disk", &config).expect("Failed to embed");
    io::save_image(&image, &stego_path).expect("Failed to save stego");

    let reloaded = io::load_image(&stego_path).expect("Failed to reload");
    assert_eq!(reloaded, image);
    assert_eq!(embed::extract(&reloaded, &config).unwrap(), "on disk");
}

#[test]
fn test_config_from_json() {
    let config: StegoConfig =
        serde_json::from_str(r#"{"method": "dct", "capacity_policy": "truncate"}"#).unwrap();

    assert_eq!(config.method, Method::Dct);
    assert_eq!(config.capacity_policy, CapacityPolicy::Truncate);
    assert_eq!(config.channels, ChannelSelection::Auto);
}

#[test]
fn test_batch_continues_past_unreadable_file() {
    let input = TempDir::new().expect("Failed to create temp dir");
    let output = TempDir::new().expect("Failed to create temp dir");

    io::save_image(&textured(32, 32, 3, 9), &input.path().join("good.png")).unwrap();
    fs::write(input.path().join("broken.png"), b"not an image").unwrap();

    let report = batch::embed_directory(
        input.path(),
        output.path(),
        "batch",
        &[Method::Lsb, Method::Rgba],
        &StegoConfig::default(),
    )
    .expect("Batch should run");

    assert_eq!(report.items.len(), 4);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.succeeded(), 2);
    for item in &report.items {
        let broken = item.source.ends_with("broken.png");
        assert_eq!(matches!(item.status, ItemStatus::Failed(_)), broken);
    }

    let stego = io::load_image(&output.path().join("lsb").join("good.png")).unwrap();
    assert_eq!(
        embed::extract(&stego, &StegoConfig::new(Method::Lsb)).unwrap(),
        "batch"
    );
    assert!(output.path().join("rgba").join("good.png").is_file());
}
