mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_grid::{CmykConversion, ColorMode, GridConfig, RgbColor};
use photo_grid_runtime::{GenerationJob, GridError, JobEvent};
use std::path::{Path, PathBuf};

use crate::logger::CliLogger;

#[derive(Parser)]
#[command(name = "pgrid", about = "Lay out photos on a printable PDF grid", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a grid PDF from images
    Generate {
        /// Input images or directories of images, in placement order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// What to do with images that cannot be decoded
        #[arg(long, value_enum)]
        on_error: Option<FailureArg>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Show how many pages a number of images needs
    Stats {
        /// Number of images
        #[arg(short = 'n', long)]
        images: usize,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Grid options shared by every command. Flags override the layout file.
#[derive(Args)]
struct LayoutArgs {
    /// JSON layout file used as the base configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Rows per page
    #[arg(long)]
    rows: Option<usize>,

    /// Columns per page
    #[arg(long)]
    columns: Option<usize>,

    /// Height of one row as INDEX=MM (repeatable)
    #[arg(long = "row-height", value_parser = parse_size_override)]
    row_heights: Vec<(usize, f32)>,

    /// Width of one column as INDEX=MM (repeatable)
    #[arg(long = "column-width", value_parser = parse_size_override)]
    column_widths: Vec<(usize, f32)>,

    /// Page margin in mm (uniform on all sides)
    #[arg(long)]
    margin: Option<f32>,

    /// Don't draw grid lines
    #[arg(long)]
    no_grid_lines: bool,

    /// Grid line colour as #RRGGBB or R,G,B
    #[arg(long, value_parser = parse_color)]
    line_color: Option<RgbColor>,

    /// Grid line width in points
    #[arg(long)]
    line_width: Option<f32>,

    /// Resolution of placed images
    #[arg(long)]
    dpi: Option<f32>,

    /// Output colour model
    #[arg(long, value_enum, conflicts_with = "cmyk_profile")]
    color: Option<ColorArg>,

    /// Convert to CMYK through this ICC output profile
    #[arg(long)]
    cmyk_profile: Option<PathBuf>,

    /// Rendering intent for --cmyk-profile
    #[arg(long, value_enum, requires = "cmyk_profile")]
    intent: Option<IntentArg>,

    /// What to do when rows or columns don't fit the page
    #[arg(long, value_enum)]
    overflow: Option<OverflowArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Rgb,
    /// CMYK with grey component moved to black
    Cmyk,
    /// CMYK by plain channel inversion
    CmykInversion,
}

#[derive(Clone, Copy, ValueEnum)]
enum IntentArg {
    Perceptual,
    Relative,
    Saturation,
    Absolute,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailureArg {
    Skip,
    Abort,
}

#[derive(Clone, Copy, ValueEnum)]
enum OverflowArg {
    Warn,
    Reject,
}

impl From<PaperArg> for photo_grid::PageSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
        }
    }
}

impl From<OrientationArg> for photo_grid::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Rgb => Self::Rgb,
            ColorArg::Cmyk => Self::Cmyk(CmykConversion::GrayComponentReplacement),
            ColorArg::CmykInversion => Self::Cmyk(CmykConversion::Inversion),
        }
    }
}

impl From<IntentArg> for photo_grid::RenderingIntent {
    fn from(arg: IntentArg) -> Self {
        match arg {
            IntentArg::Perceptual => Self::Perceptual,
            IntentArg::Relative => Self::RelativeColorimetric,
            IntentArg::Saturation => Self::Saturation,
            IntentArg::Absolute => Self::AbsoluteColorimetric,
        }
    }
}

impl From<FailureArg> for photo_grid::FailurePolicy {
    fn from(arg: FailureArg) -> Self {
        match arg {
            FailureArg::Skip => Self::Skip,
            FailureArg::Abort => Self::Abort,
        }
    }
}

impl From<OverflowArg> for photo_grid::OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Warn => Self::Warn,
            OverflowArg::Reject => Self::Reject,
        }
    }
}

impl LayoutArgs {
    async fn into_config(self) -> Result<GridConfig> {
        let mut config = match &self.config {
            Some(path) => GridConfig::load(path)
                .await
                .with_context(|| format!("Failed to load layout {}", path.display()))?,
            None => GridConfig::default(),
        };

        if let Some(paper) = self.paper {
            config.page_size = paper.into();
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation.into();
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        config.row_heights_mm.extend(self.row_heights);
        config.column_widths_mm.extend(self.column_widths);
        if let Some(margin) = self.margin {
            config.margin_mm = margin;
        }
        if self.no_grid_lines {
            config.grid_lines.visible = false;
        }
        if let Some(color) = self.line_color {
            config.grid_lines.color = color;
        }
        if let Some(width) = self.line_width {
            config.grid_lines.width_pt = width;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(color) = self.color {
            config.color_mode = color.into();
        }
        if let Some(profile) = self.cmyk_profile {
            config.color_mode = ColorMode::Cmyk(CmykConversion::IccProfile {
                profile,
                intent: self.intent.map(Into::into).unwrap_or_default(),
            });
        }
        if let Some(overflow) = self.overflow {
            config.overflow_policy = overflow.into();
        }

        Ok(config)
    }
}

/// Parse `INDEX=MM`
fn parse_size_override(s: &str) -> Result<(usize, f32), String> {
    let (index, size) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=MM, got '{}'", s))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid index '{}'", index))?;
    let size = size
        .trim()
        .parse()
        .map_err(|_| format!("invalid size '{}'", size))?;
    Ok((index, size))
}

/// Parse `#RRGGBB` or `R,G,B`
fn parse_color(s: &str) -> Result<RgbColor, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #RRGGBB, got '{}'", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid hex colour '{}'", s))
        };
        return Ok(RgbColor::new(channel(0)?, channel(2)?, channel(4)?));
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b] => {
            let channel = |v: &str| v.parse::<u8>().map_err(|_| format!("invalid channel '{}'", v));
            Ok(RgbColor::new(channel(*r)?, channel(*g)?, channel(*b)?))
        }
        _ => Err(format!("expected #RRGGBB or R,G,B, got '{}'", s)),
    }
}

/// Expand directories into their supported images, sorted by file name
fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && photo_grid::is_supported_path(path))
                .collect();
            found.sort();
            log::debug!("{} image(s) in {}", found.len(), input.display());
            images.extend(found);
        } else {
            images.push(input.clone());
        }
    }
    Ok(images)
}

fn print_statistics(stats: &photo_grid::GridStatistics) {
    println!("Grid Statistics:");
    println!("  Images: {}", stats.images);
    println!("  Cells per page: {}", stats.cells_per_page);
    println!("  Pages: {}", stats.pages);
    println!("  Cells used on last page: {}", stats.last_page_filled);
    println!("  Empty cells: {}", stats.empty_cells);
}

async fn generate(images: Vec<PathBuf>, config: GridConfig, output: &Path) -> Result<()> {
    let mut job = GenerationJob::start(images, config, output);

    let cancel = job.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after the current image");
            cancel.cancel();
        }
    });

    while let Some(event) = job.next_event().await {
        match event {
            JobEvent::Progress { processed, total } => {
                log::info!("Processed {}/{} images", processed, total);
            }
            JobEvent::Skipped(skipped) => {
                log::debug!("Skipped {}", skipped.path.display());
            }
            JobEvent::Completed(_) | JobEvent::Failed { .. } | JobEvent::Cancelled => {}
        }
    }

    match job.wait().await {
        Ok(summary) => {
            println!(
                "Placed {} image(s) on {} page(s) → {}",
                summary.placed,
                summary.page_count,
                summary.output_path.display()
            );
            if !summary.skipped.is_empty() {
                println!("Skipped {} image(s):", summary.skipped.len());
                for skipped in &summary.skipped {
                    println!("  {}: {}", skipped.path.display(), skipped.reason);
                }
            }
            Ok(())
        }
        Err(GridError::Cancelled) => bail!("Cancelled; {} was not written", output.display()),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet)).init()?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            layout,
            on_error,
            title,
            stats_only,
        } => {
            let mut config = layout.into_config().await?;
            if let Some(policy) = on_error {
                config.failure_policy = policy.into();
            }
            if let Some(title) = title {
                config.title = title;
            }

            let images = collect_images(&input)?;
            if images.is_empty() {
                bail!("No images found in the given inputs");
            }

            let stats = photo_grid::calculate_statistics(images.len(), &config)?;
            print_statistics(&stats);

            if stats_only {
                return Ok(());
            }

            generate(images, config, &output).await?;
        }

        Commands::Stats { images, layout } => {
            let config = layout.into_config().await?;
            let stats = photo_grid::calculate_statistics(images, &config)?;
            print_statistics(&stats);
        }
    }

    Ok(())
}
