use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use icy_icon::{DEFAULT_SCALES, IconFormat, IconLayer, SaveOptions};
use image::imageops::FilterType;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ContainerFormat {
    Ico,
    Icns,
}

impl From<ContainerFormat> for IconFormat {
    fn from(format: ContainerFormat) -> Self {
        match format {
            ContainerFormat::Ico => IconFormat::Ico,
            ContainerFormat::Icns => IconFormat::Icns,
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Renders a source image into a multi-resolution icon container.")]
pub struct Cli {
    #[arg(help = "Source image (png, jpeg, bmp, ...).", required = true)]
    input: PathBuf,

    #[arg(help = "Destination icon file (.ico or .icns).", required = true)]
    output: PathBuf,

    #[arg(help = "Layer scales to render, e.g. 16,32,48,256.", long, value_delimiter = ',')]
    scales: Vec<u32>,

    #[arg(help = "Container format. Defaults to the output file extension.", long, value_enum)]
    format: Option<ContainerFormat>,

    #[arg(help = "Store no layer as an embedded PNG payload.", long, default_value_t = false)]
    no_compress: bool,

    #[arg(help = "Smallest scale that gets an embedded PNG payload.", long, default_value_t = 256)]
    compress_threshold: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let _logger = Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()
        .context("Failed to start logger")?;

    let format = match args.format {
        Some(format) => format.into(),
        None => IconFormat::from_path(&args.output)
            .with_context(|| format!("cannot detect a container format from '{}'", args.output.display()))?,
    };

    let mut scales = if args.scales.is_empty() { DEFAULT_SCALES.to_vec() } else { args.scales.clone() };
    scales.sort_unstable();
    scales.dedup();

    let options = SaveOptions {
        compress: !args.no_compress,
        compress_threshold: args.compress_threshold,
    };

    let source = image::open(&args.input)
        .with_context(|| format!("Failed to load '{}'", args.input.display()))?
        .to_rgba8();
    log::info!("{}: {}x{} source image", args.input.display(), source.width(), source.height());

    let mut layers = Vec::with_capacity(scales.len());
    for &scale in &scales {
        let resized = image::imageops::resize(&source, scale, scale, FilterType::Lanczos3);
        let mut layer = IconLayer::from_image(&resized, options.is_compressed(scale))?;
        if format == IconFormat::Icns && scale == 1024 {
            // 1024px only exists as the 512pt @2x element
            layer = layer.with_retina(true);
        }
        layers.push(layer);
    }

    format
        .save(&layers, &args.output)
        .with_context(|| format!("Failed to write '{}'", args.output.display()))?;
    log::info!("{}: {} with {} layer(s)", args.output.display(), format, layers.len());
    Ok(())
}
