use clap::Parser;
use handwriting_prep::{Pipeline, PixelBuffer, PreprocessingConfig, Threshold};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "handwriting-prep")]
#[command(about = "Preprocess handwriting scans for OCR")]
#[command(version)]
pub struct Args {
    /// Image to preprocess (PNG, JPEG, BMP, ...)
    pub input: PathBuf,

    /// Where to write the preprocessed PNG (default: <input>.prep.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Contrast strength, must be below 259
    #[arg(long, env = "PREP_CONTRAST", default_value = "50", allow_hyphen_values = true)]
    pub contrast: f32,

    /// Binarization threshold: 0-255, or "auto" for Otsu's method
    #[arg(long, env = "PREP_THRESHOLD", default_value = "128")]
    pub threshold: String,

    /// Print preprocessing stats as JSON on stdout
    #[arg(long)]
    pub stats: bool,

    /// Run OCR on the preprocessed image
    #[arg(long)]
    pub recognize: bool,

    /// OCR language (e.g., "tam", "eng")
    #[arg(long, env = "PREP_LANGUAGE", default_value = "tam")]
    pub language: String,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long = "tessdata", value_name = "PATH", env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Args {
    fn preprocessing_config(&self) -> anyhow::Result<PreprocessingConfig> {
        let threshold: Threshold = self.threshold.parse()?;
        Ok(PreprocessingConfig::default()
            .with_contrast_strength(self.contrast)
            .with_threshold(threshold))
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}.prep.png", stem))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let pipeline = Pipeline::new(args.preprocessing_config()?)?;

    if args.recognize {
        return recognize(&args, pipeline).await;
    }

    let buffer = PixelBuffer::open(&args.input)?;
    let result = pipeline.process(buffer)?;

    let output = args.output_path();
    std::fs::write(&output, result.buffer.encode_png()?)?;
    tracing::info!("Wrote {}", output.display());

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

#[cfg(feature = "engine-tesseract")]
async fn recognize(args: &Args, pipeline: Pipeline) -> anyhow::Result<()> {
    use handwriting_prep::engines::tesseract::TesseractEngine;
    use handwriting_prep::recognition;
    use std::sync::Arc;

    let engine = TesseractEngine::new(args.tessdata_path.as_deref(), &args.language)?;
    let bytes = std::fs::read(&args.input)?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let reporter = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            tracing::info!("{}% {}", progress.percent, progress.phase);
        }
    });

    let result = recognition::recognize(
        Arc::new(engine),
        bytes,
        pipeline,
        args.language.clone(),
        Some(tx),
    )
    .await?;
    let _ = reporter.await;

    let output = args.output_path();
    std::fs::write(&output, &result.preprocessed_png)?;

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
        eprintln!("confidence: {:.1}", result.confidence);
    }

    Ok(())
}

#[cfg(not(feature = "engine-tesseract"))]
async fn recognize(_args: &Args, _pipeline: Pipeline) -> anyhow::Result<()> {
    anyhow::bail!("No OCR engine available. Build with --features engine-tesseract")
}
