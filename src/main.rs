//! Stegscan - hide text in images and detect the hiding.
//!
//! Embeds messages with LSB, alpha-channel or block-DCT methods and runs
//! chi-square steganalysis on image pairs.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stegscan::analysis;
use stegscan::batch::{self, BatchReport, ItemStatus};
use stegscan::embed;
use stegscan::{
    io, CapacityPolicy, Detector, DetectorConfig, EmbedOutcome, Method, StegoConfig, TestMethod,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "stegscan")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Image steganography and chi-square steganalysis",
    long_about = "Hides text in images via LSB, alpha-channel or block-DCT embedding, and tests image pairs for statistical traces of embedding."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a message into an image
    Embed {
        /// Carrier image
        input: PathBuf,

        /// Output image (use a lossless format such as PNG)
        output: PathBuf,

        /// Embedding method: lsb, rgba or dct
        #[arg(long, default_value = "lsb")]
        method: Method,

        /// Message text
        #[arg(long, conflicts_with = "message_file")]
        message: Option<String>,

        /// File containing the message text
        #[arg(long, conflicts_with = "message")]
        message_file: Option<PathBuf>,

        /// Write as much of the message as fits instead of failing
        #[arg(long)]
        truncate: bool,

        /// Add an opaque alpha channel when the carrier has none
        #[arg(long)]
        add_alpha: bool,

        /// JSON file with a full embedding configuration (overrides --method)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Extract a message from an image
    Extract {
        /// Stego image
        input: PathBuf,

        /// Embedding method: lsb, rgba or dct
        #[arg(long, default_value = "lsb")]
        method: Method,

        /// JSON file with a full embedding configuration (overrides --method)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show how many bits an image can hold
    Capacity {
        /// Carrier image
        input: PathBuf,

        /// Only report this method (default: all)
        #[arg(long)]
        method: Option<Method>,
    },

    /// Compare a reference image with a subject image
    Detect {
        /// Reference then subject image, or the subject alone for the uniform test
        #[arg(required = true, num_args = 1..=2)]
        images: Vec<PathBuf>,

        /// Test: goodness-of-fit, contingency, lsb-pair, uniform or all
        /// [default: contingency, or uniform for a single image]
        #[arg(long)]
        test: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show image statistics
    Stats {
        /// Image to describe
        input: PathBuf,

        /// Modified image to compare against the input
        #[arg(long)]
        against: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Embed a message into every image of a directory
    BatchEmbed {
        /// Directory of carrier images
        input_dir: PathBuf,

        /// Output directory (one subdirectory per method)
        output_dir: PathBuf,

        /// Message text
        #[arg(long)]
        message: String,

        /// Methods to run
        #[arg(long, value_delimiter = ',', default_value = "lsb,rgba,dct")]
        methods: Vec<Method>,

        /// Write as much of the message as fits instead of failing
        #[arg(long)]
        truncate: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run detection on a directory of originals and their stego copies
    BatchDetect {
        /// Directory of original images
        original_dir: PathBuf,

        /// Directory written by batch-embed
        stego_dir: PathBuf,

        /// Methods to look for
        #[arg(long, value_delimiter = ',', default_value = "lsb,rgba,dct")]
        methods: Vec<Method>,

        /// Headline test
        #[arg(long, default_value = "contingency")]
        test: TestMethod,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("Warning: logger unavailable: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Embed {
            input,
            output,
            method,
            message,
            message_file,
            truncate,
            add_alpha,
            config,
        } => {
            let message = read_message(message, message_file)?;
            let mut config = load_config(config, method)?;
            if truncate {
                config.capacity_policy = CapacityPolicy::Truncate;
            }
            cmd_embed(&input, &output, &message, &config, add_alpha)
        }

        Commands::Extract {
            input,
            method,
            config,
        } => cmd_extract(&input, &load_config(config, method)?),

        Commands::Capacity { input, method } => cmd_capacity(&input, method),

        Commands::Detect { images, test, json } => match images.as_slice() {
            [subject] => cmd_detect_single(subject, test.as_deref(), json),
            [reference, subject] => cmd_detect(
                reference,
                subject,
                test.as_deref().unwrap_or("contingency"),
                json,
            ),
            _ => bail!("detect takes one or two images"),
        },

        Commands::Stats {
            input,
            against,
            json,
        } => cmd_stats(&input, against.as_deref(), json),

        Commands::BatchEmbed {
            input_dir,
            output_dir,
            message,
            methods,
            truncate,
            json,
        } => cmd_batch_embed(&input_dir, &output_dir, &message, &methods, truncate, json),

        Commands::BatchDetect {
            original_dir,
            stego_dir,
            methods,
            test,
            json,
        } => cmd_batch_detect(&original_dir, &stego_dir, &methods, test, json),
    }
}

fn read_message(message: Option<String>, message_file: Option<PathBuf>) -> Result<String> {
    match (message, message_file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading message from {}", path.display())),
        (None, None) => bail!("either --message or --message-file is required"),
        (Some(_), Some(_)) => unreachable!(),
    }
}

fn load_config(path: Option<PathBuf>, method: Method) -> Result<StegoConfig> {
    let Some(path) = path else {
        return Ok(StegoConfig::new(method));
    };
    StegoConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
}

fn cmd_embed(
    input: &Path,
    output: &Path,
    message: &str,
    config: &StegoConfig,
    add_alpha: bool,
) -> Result<()> {
    let mut image =
        io::load_image(input).with_context(|| format!("loading {}", input.display()))?;
    if add_alpha && !image.has_alpha() {
        image = image.with_opaque_alpha();
    }

    let outcome = embed::embed(&mut image, message, config)
        .with_context(|| format!("embedding with {}", config.method))?;
    io::save_image(&image, output).with_context(|| format!("saving {}", output.display()))?;

    match outcome {
        EmbedOutcome::Complete { written } => {
            println!("Embedded {} bits into {}", written, output.display());
        }
        EmbedOutcome::Truncated { written, capacity } => {
            println!(
                "Truncated: embedded {} bits (capacity {}) into {}",
                written,
                capacity,
                output.display()
            );
            println!("Warning: the terminator did not fit; extraction will fail");
        }
    }

    Ok(())
}

fn cmd_extract(input: &Path, config: &StegoConfig) -> Result<()> {
    let image = io::load_image(input).with_context(|| format!("loading {}", input.display()))?;
    let message = embed::extract(&image, config)
        .with_context(|| format!("extracting with {}", config.method))?;
    println!("{}", message);
    Ok(())
}

fn cmd_capacity(input: &Path, method: Option<Method>) -> Result<()> {
    let image = io::load_image(input).with_context(|| format!("loading {}", input.display()))?;
    let methods = match method {
        Some(m) => vec![m],
        None => Method::ALL.to_vec(),
    };

    println!("Capacity of {} ({})", input.display(), image.shape());
    for method in methods {
        match embed::capacity(&image, &StegoConfig::new(method)) {
            Ok(bits) => {
                // 16 bits go to the terminator.
                let chars = bits.saturating_sub(16) / 8;
                println!(
                    "  {:<6}{:>10} bits  {:>8} bytes  ~{} ASCII chars",
                    method,
                    bits,
                    bits / 8,
                    chars
                );
            }
            Err(e) => println!("  {:<6}unavailable: {}", method, e),
        }
    }

    Ok(())
}

fn cmd_detect(reference: &Path, subject: &Path, test: &str, json: bool) -> Result<()> {
    let reference_img =
        io::load_image(reference).with_context(|| format!("loading {}", reference.display()))?;
    let subject_img =
        io::load_image(subject).with_context(|| format!("loading {}", subject.display()))?;

    let headline = if test.eq_ignore_ascii_case("all") {
        TestMethod::default()
    } else {
        test.parse::<TestMethod>().map_err(anyhow::Error::msg)?
    };
    let detector = Detector::new(DetectorConfig::new(headline));
    let report = detector.analyze(&reference_img, &subject_img)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let tests: Vec<TestMethod> = if test.eq_ignore_ascii_case("all") {
        TestMethod::ALL.to_vec()
    } else {
        vec![headline]
    };

    println!("Chi-square analysis ({})", report.shape);
    println!("==========================");
    for method in tests {
        let d = report.get(method);
        println!(
            "{:<16} chi2 = {:>12.4}  df = {:>5}  p = {:.4e}  {}",
            method, d.statistic, d.degrees_of_freedom, d.p_value, d.verdict
        );
    }
    println!();
    println!("LSB balance per channel (reference / subject):");
    for ch in &report.per_channel {
        println!(
            "  channel {}: chi2 = {:.4} / {:.4}",
            ch.channel, ch.reference.statistic, ch.subject.statistic
        );
    }
    println!();
    println!("Verdict ({}): {}", report.headline, report.verdict);

    Ok(())
}

fn cmd_detect_single(subject: &Path, test: Option<&str>, json: bool) -> Result<()> {
    if let Some(test) = test.filter(|t| !t.eq_ignore_ascii_case("all")) {
        let method = test.parse::<TestMethod>().map_err(anyhow::Error::msg)?;
        if method != TestMethod::Uniform {
            bail!("the {} test needs a reference image", method);
        }
    }
    let subject_img =
        io::load_image(subject).with_context(|| format!("loading {}", subject.display()))?;

    let detector = Detector::new(DetectorConfig::new(TestMethod::Uniform));
    let detection = detector.evaluate_single(&subject_img)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
        return Ok(());
    }

    println!("Chi-square analysis ({})", subject_img.shape());
    println!("==========================");
    println!(
        "{:<16} chi2 = {:>12.4}  df = {:>5}  p = {:.4e}  {}",
        TestMethod::Uniform,
        detection.statistic,
        detection.degrees_of_freedom,
        detection.p_value,
        detection.verdict
    );
    println!();
    println!("Verdict ({}): {}", TestMethod::Uniform, detection.verdict);
    Ok(())
}

fn cmd_stats(input: &Path, against: Option<&Path>, json: bool) -> Result<()> {
    if let Some(modified) = against {
        let image =
            io::load_image(input).with_context(|| format!("loading {}", input.display()))?;
        let other =
            io::load_image(modified).with_context(|| format!("loading {}", modified.display()))?;
        let cmp = analysis::compare(&image, &other)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&cmp)?);
        } else {
            print_file(&io::file_info(input)?);
            print_stats("Original", &cmp.original);
            print_file(&io::file_info(modified)?);
            print_stats("Modified", &cmp.modified);
            println!("Changed samples:  {}", cmp.changed_samples);
            println!("Max difference:   {}", cmp.max_difference);
            println!("PSNR:             {:.2} dB", cmp.psnr);
        }
        return Ok(());
    }

    let report =
        analysis::analyze_file(input).with_context(|| format!("loading {}", input.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_file(&report.file);
        print_stats("Image", &report.stats);
    }
    Ok(())
}

fn print_file(info: &io::FileInfo) {
    println!(
        "{}: {} bytes, {}",
        info.path.display(),
        info.size_bytes,
        info.format.as_deref().unwrap_or("unknown format")
    );
}

fn print_stats(title: &str, stats: &analysis::ImageStats) {
    println!("{} ({})", title, stats.shape);
    println!("  Histogram mean:     {:.4}", stats.histogram_mean);
    println!("  Histogram std dev:  {:.4}", stats.histogram_std_dev);
    println!("  Mean intensity:     {:.4}", stats.intensity_mean);
    println!(
        "  DCT coefficients:   {} blocks, mean {:.4}, std dev {:.4}",
        stats.dct.blocks, stats.dct.mean, stats.dct.std_dev
    );
    println!(
        "  DWT coefficients:   {} blocks, mean {:.4}, std dev {:.4}, detail energy {:.4}",
        stats.dwt.blocks, stats.dwt.mean, stats.dwt.std_dev, stats.dwt.detail_energy
    );
    if let (Some(dct), Some(dwt)) = (&stats.dct_rgb, &stats.dwt_rgb) {
        println!(
            "  RGB DCT:            {} blocks, mean {:.4}, std dev {:.4}",
            dct.blocks, dct.mean, dct.std_dev
        );
        println!(
            "  RGB DWT:            {} blocks, mean {:.4}, std dev {:.4}, detail energy {:.4}",
            dwt.blocks, dwt.mean, dwt.std_dev, dwt.detail_energy
        );
    }
}

fn cmd_batch_embed(
    input_dir: &Path,
    output_dir: &Path,
    message: &str,
    methods: &[Method],
    truncate: bool,
    json: bool,
) -> Result<()> {
    let mut base = StegoConfig::default();
    if truncate {
        base.capacity_policy = CapacityPolicy::Truncate;
    }
    let report = batch::embed_directory(input_dir, output_dir, message, methods, &base)
        .with_context(|| format!("batch embedding {}", input_dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_batch(&report, |embedded| embedded.output.display().to_string());
    Ok(())
}

fn cmd_batch_detect(
    original_dir: &Path,
    stego_dir: &Path,
    methods: &[Method],
    test: TestMethod,
    json: bool,
) -> Result<()> {
    let config = DetectorConfig::new(test);
    let report = batch::detect_directory(original_dir, stego_dir, methods, &config)
        .with_context(|| format!("batch detecting {}", original_dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_batch(&report, |r| {
        let d = r.get(r.headline);
        format!("{} (p = {:.4e})", r.verdict, d.p_value)
    });
    Ok(())
}

fn print_batch<T>(report: &BatchReport<T>, describe: impl Fn(&T) -> String) {
    for item in &report.items {
        let name = item
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &item.status {
            ItemStatus::Ok(value) => println!("✓ {:<24} {:<5} {}", name, item.method, describe(value)),
            ItemStatus::Failed(e) => println!("✗ {:<24} {:<5} {}", name, item.method, e),
        }
    }
    println!();
    println!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
}
