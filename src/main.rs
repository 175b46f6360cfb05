use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;
use walkdir::WalkDir;

use filigree::{
    Config,
    export::{BatchJob, ExportFormat, export_batch, is_supported_image},
    startup_checks,
    watermark::{GridAnchor, RelativePosition, WatermarkMode},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark images and export them
    Apply {
        /// Image files or directories to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Validate configuration and inputs without exporting anything
    Check {
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command line values that take precedence over the config file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Directory for exported images
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Watermark text (selects text mode)
    #[arg(long, conflicts_with = "image")]
    text: Option<String>,

    /// Watermark image file (selects image mode)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Relative position as "x,y", each between 0 and 1
    #[arg(long, value_parser = parse_position, conflicts_with = "anchor")]
    position: Option<RelativePosition>,

    /// Grid cell as "column,row", each between 0 and 2
    #[arg(long, value_parser = parse_anchor)]
    anchor: Option<GridAnchor>,

    /// Text alpha, or alpha multiplier for image watermarks
    #[arg(long)]
    opacity: Option<u8>,

    /// Counter-clockwise rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f32>,

    /// Resize factor for image watermarks
    #[arg(long)]
    scale: Option<f32>,

    #[arg(long)]
    font: Option<String>,

    #[arg(long)]
    font_size: Option<i32>,

    /// Text color as "r,g,b"
    #[arg(long, value_parser = parse_color)]
    color: Option<[u8; 3]>,

    #[arg(long)]
    format: Option<ExportFormat>,

    /// JPEG quality, 1-100
    #[arg(long)]
    quality: Option<u8>,

    #[arg(long)]
    prefix: Option<String>,

    #[arg(long)]
    suffix: Option<String>,
}

impl Overrides {
    fn apply_to(self, config: &mut Config) {
        let watermark = &mut config.watermark;
        if let Some(text) = self.text {
            watermark.mode = WatermarkMode::Text;
            watermark.text = text;
        }
        if let Some(image) = self.image {
            watermark.mode = WatermarkMode::Image;
            watermark.image_path = Some(image);
        }
        if let Some(position) = self.position {
            watermark.position = position;
        }
        if let Some(anchor) = self.anchor {
            watermark.position = anchor.position();
        }
        if let Some(opacity) = self.opacity {
            watermark.opacity = opacity;
        }
        if let Some(rotation) = self.rotation {
            watermark.rotation_degrees = rotation;
        }
        if let Some(scale) = self.scale {
            watermark.scale = scale;
        }
        if let Some(font) = self.font {
            watermark.font_name = font;
        }
        if let Some(font_size) = self.font_size {
            watermark.font_size = font_size;
        }
        if let Some(color) = self.color {
            watermark.color = color;
        }

        let export = &mut config.export;
        if let Some(output_dir) = self.output_dir {
            export.output_dir = output_dir;
        }
        if let Some(format) = self.format {
            export.format = format;
        }
        if let Some(quality) = self.quality {
            export.quality = quality;
        }
        if let Some(prefix) = self.prefix {
            export.prefix = prefix;
        }
        if let Some(suffix) = self.suffix {
            export.suffix = suffix;
        }
    }
}

fn parse_pair<T: std::str::FromStr>(value: &str, what: &str) -> Result<(T, T), String> {
    let (a, b) = value
        .split_once(',')
        .ok_or_else(|| format!("expected {} as two comma-separated values", what))?;
    let a = a.trim().parse().map_err(|_| format!("invalid {}: {}", what, value))?;
    let b = b.trim().parse().map_err(|_| format!("invalid {}: {}", what, value))?;
    Ok((a, b))
}

fn parse_position(value: &str) -> Result<RelativePosition, String> {
    let (x, y) = parse_pair::<f64>(value, "position")?;
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return Err(format!("position must be within 0..1, got {}", value));
    }
    Ok(RelativePosition::new(x, y))
}

fn parse_anchor(value: &str) -> Result<GridAnchor, String> {
    let (column, row) = parse_pair::<usize>(value, "anchor")?;
    GridAnchor::new(column, row).ok_or_else(|| format!("anchor must be within 0..2, got {}", value))
}

fn parse_color(value: &str) -> Result<[u8; 3], String> {
    let channels = value
        .split(',')
        .map(|channel| channel.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid color {}: {}", value, e))?;
    <[u8; 3]>::try_from(channels).map_err(|_| format!("color must be r,g,b, got {}", value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = load_config(&cli.config)?;

    match cli.command {
        Commands::Apply { inputs, overrides } => {
            overrides.apply_to(&mut config);
            run_apply(&config, &inputs)
        }
        Commands::Check { inputs, overrides } => {
            overrides.apply_to(&mut config);
            run_check(&config, &inputs)
        }
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        info!("Configuration loaded from: {:?}", config_path);
        Ok(Config::from_file(config_path)?)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

fn run_check(config: &Config, inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    match startup_checks::perform_startup_checks(config, inputs) {
        Ok(()) => {
            println!("Configuration OK");
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("Error: {}", error);
            }
            std::process::exit(1);
        }
    }
}

fn run_apply(config: &Config, inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(errors) = startup_checks::perform_startup_checks(config, inputs) {
        for error in &errors {
            tracing::error!("Startup check failed: {}", error);
        }
        return Err("Startup checks failed".into());
    }

    let images = collect_images(inputs);
    if images.is_empty() {
        warn!("No supported images found in inputs");
        return Ok(());
    }
    info!("Watermarking {} images", images.len());

    let jobs: Vec<BatchJob> = images
        .into_iter()
        .map(|input| BatchJob {
            input,
            settings: config.watermark.clone(),
        })
        .collect();

    let report = export_batch(&jobs, &config.layer_renderer(), &config.export);
    for output in &report.exported {
        println!("{}", output.display());
    }

    if report.is_success() {
        println!("Exported {} images", report.exported.len());
        Ok(())
    } else {
        for failure in &report.failures {
            eprintln!("Failed: {}: {}", failure.input.display(), failure.error);
        }
        eprintln!(
            "Exported {} of {} images",
            report.exported.len(),
            report.total()
        );
        std::process::exit(1);
    }
}

/// Expand directories into the supported images they contain, keeping
/// explicitly named files as given
fn collect_images(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_supported_image(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            images.extend(found);
        } else {
            images.push(input.clone());
        }
    }
    images
}
