//! PosterKit CLI: build tiled posters from the command line.
//!
//! Usage:
//!   posterkit init <NAME>             Create a new poster document
//!   posterkit papers                  List the paper catalog
//!   posterkit info <PATH>             Show poster layout and layers
//!   posterkit validate <PATH>         Check a poster document
//!   posterkit add-text <PATH> <TEXT>  Add a text layer
//!   posterkit add-image <PATH> <IMG>  Add an image layer
//!   posterkit set-unit <PATH> <UNIT>  Switch the poster between mm and in
//!   posterkit export <PATH>           Render pages to an export bundle
//!   posterkit config                  Show or initialize the app config

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "posterkit",
    about = "Lay out large posters and print them across standard pages",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new poster document
    Init {
        /// Poster name
        name: String,

        /// Output file (defaults to <NAME>.poster.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Measurement unit: mm or in
        #[arg(long)]
        unit: Option<String>,

        /// Paper id from `posterkit papers`
        #[arg(long)]
        paper: Option<String>,

        /// Lay pages out in landscape
        #[arg(long)]
        landscape: bool,

        /// Margin on every page side, in the poster unit
        #[arg(long)]
        margin: Option<f64>,

        /// Pages down (grid mode)
        #[arg(long, default_value = "2")]
        rows: u32,

        /// Pages across (grid mode)
        #[arg(long, default_value = "2")]
        cols: u32,

        /// Poster width; with --height, switches to size mode
        #[arg(long, requires = "height")]
        width: Option<f64>,

        /// Poster height; with --width, switches to size mode
        #[arg(long, requires = "width")]
        height: Option<f64>,
    },

    /// List available paper sizes
    Papers {
        /// Show dimensions in this unit: mm or in
        #[arg(long, default_value = "mm")]
        unit: String,
    },

    /// Show poster layout and layers
    Info {
        /// Path to the poster document
        path: PathBuf,
    },

    /// Validate a poster document
    Validate {
        /// Path to the poster document
        path: PathBuf,
    },

    /// Add a text layer on top of the poster
    AddText {
        /// Path to the poster document
        path: PathBuf,

        /// Text content; `\n` starts a new line
        text: String,

        /// Text color: #rrggbb or a palette name (black, red, blue, ...)
        #[arg(long)]
        color: Option<String>,

        /// Font size multiplier
        #[arg(long)]
        font_size: Option<f64>,

        /// Font family
        #[arg(long)]
        font: Option<String>,

        /// Bold weight
        #[arg(long)]
        bold: bool,

        #[command(flatten)]
        placement: Placement,
    },

    /// Add an image layer on top of the poster
    AddImage {
        /// Path to the poster document
        path: PathBuf,

        /// Image file (PNG, JPEG or WebP)
        image: PathBuf,

        #[command(flatten)]
        placement: Placement,
    },

    /// Convert the poster to another unit
    SetUnit {
        /// Path to the poster document
        path: PathBuf,

        /// Target unit: mm or in
        unit: String,
    },

    /// Render the poster into page tiles
    Export {
        /// Path to the poster document
        path: PathBuf,

        /// Output directory (defaults to the document's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Raster pixels per poster unit (overrides the configured default)
        #[arg(long)]
        scale: Option<f64>,
    },

    /// Show the effective application config
    Config {
        /// Write the effective config to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Layer placement, as fractions of the poster.
#[derive(Args, Debug, Clone, Default)]
pub struct Placement {
    /// Left edge [0.0, 1.0]
    #[arg(long)]
    pub x: Option<f64>,

    /// Top edge [0.0, 1.0]
    #[arg(long)]
    pub y: Option<f64>,

    /// Width as a fraction of the poster width
    #[arg(long = "frac-width")]
    pub width: Option<f64>,

    /// Height as a fraction of the poster height
    #[arg(long = "frac-height")]
    pub height: Option<f64>,

    /// Rotation in degrees
    #[arg(long)]
    pub rotation: Option<f64>,

    /// Opacity [0.0, 1.0]
    #[arg(long)]
    pub opacity: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = posterkit_common::config::AppConfig::load();

    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    posterkit_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            unit,
            paper,
            landscape,
            margin,
            rows,
            cols,
            width,
            height,
        } => commands::init::run(
            &app_config,
            commands::init::InitOptions {
                name,
                output,
                unit,
                paper,
                landscape,
                margin,
                rows,
                cols,
                size: width.zip(height),
            },
        ),
        Commands::Papers { unit } => commands::papers::run(&unit),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::AddText {
            path,
            text,
            color,
            font_size,
            font,
            bold,
            placement,
        } => commands::layers::add_text(
            path,
            text,
            commands::layers::StyleOptions {
                color,
                font_size,
                font,
                bold,
            },
            placement,
        ),
        Commands::AddImage {
            path,
            image,
            placement,
        } => commands::layers::add_image(path, image, placement),
        Commands::SetUnit { path, unit } => commands::layers::set_unit(path, &unit),
        Commands::Export {
            path,
            output,
            scale,
        } => commands::export::run(&app_config, path, output, scale).await,
        Commands::Config { save } => commands::config::run(&app_config, save),
    }
}
