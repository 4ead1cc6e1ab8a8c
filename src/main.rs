//! Terminal front-end: label images by typing one key token per line.
//!
//! Navigation tokens default to `left` and `right`. The host bindings `q`
//! (quit) and `p` (print labels) only apply when neither the class keymap
//! nor the navigation keys use those keys.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;
use image_labeller::{
    ImageLabeller, ImageSource, KeyOutcome, KeymapPreset, KeymapSpec, LabellerConfig, LogLevel,
    TerminalPresenter, folder_source, generate_test_images,
};
use ndarray::Array2;

/// Host key that ends the session
const QUIT_KEY: &str = "q";
/// Host key that prints the current labels
const PRINT_KEY: &str = "p";

#[derive(Parser, Debug)]
#[command(name = "image-labeller")]
#[command(version, about = "Label images from the terminal with single key presses")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated class names, overrides the config file
    #[arg(long, value_delimiter = ',')]
    classes: Vec<String>,

    /// Class keymap: "digits", "row", or comma-separated keys
    #[arg(long)]
    keymap: Option<String>,

    /// Allow several classes per image
    #[arg(long)]
    multiclass: bool,

    /// Stay on the current image after labelling it
    #[arg(long)]
    no_advance: bool,

    /// Folder of images to label; synthetic images are used otherwise
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Number of synthetic images
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Width and height of synthetic images
    #[arg(long, default_value_t = 32)]
    size: usize,

    /// Log level, overrides the config file
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

fn parse_keymap(value: &str) -> KeymapSpec {
    match value {
        "digits" | "1234" => KeymapSpec::Preset(KeymapPreset::Digits),
        "row" | "qwerty" => KeymapSpec::Preset(KeymapPreset::Row),
        keys => KeymapSpec::explicit(keys.split(',').map(str::trim)),
    }
}

/// Merge the config file (if any) with command line overrides.
fn resolve_config(cli: &Cli) -> Result<LabellerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => LabellerConfig::load(path)?,
        None => LabellerConfig::load_from_default_path()
            .unwrap_or_else(|| LabellerConfig::new(vec!["good".to_string(), "bad".to_string()])),
    };
    if !cli.classes.is_empty() {
        config.classes = cli.classes.clone();
    }
    if let Some(keymap) = &cli.keymap {
        config.keymap = parse_keymap(keymap);
    }
    if cli.multiclass {
        config.multiclass = true;
    }
    if cli.no_advance {
        config.labelling_advances_image = false;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    Ok(config)
}

fn print_labels(labeller: &ImageLabeller<Array2<f32>, String>) -> serde_json::Result<()> {
    let json = if labeller.mode().is_multiclass() {
        serde_json::to_string_pretty(&labeller.class_labels())?
    } else {
        serde_json::to_string_pretty(&labeller.labels())?
    };
    println!("{}", json);
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let images: ImageSource<Array2<f32>> = match &cli.folder {
        Some(folder) => folder_source(folder)?,
        None => ImageSource::from_vec(generate_test_images(cli.count, cli.size, cli.size)),
    };

    let mut labeller = config
        .builder(images)
        .presenter(Box::new(TerminalPresenter::new(std::io::stdout())))
        .build()?;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let key = line.trim();
        if key.is_empty() {
            continue;
        }

        let outcome = labeller.handle_key(key);
        log::trace!("'{}' -> {:?}", key, outcome);

        // Keys bound by the labeller never reach the host bindings.
        if labeller.is_reserved(key) {
            continue;
        }
        match key {
            QUIT_KEY => break,
            PRINT_KEY => print_labels(&labeller)?,
            _ if outcome == KeyOutcome::Ignored => {
                log::info!("Unbound key '{}'", key);
            }
            _ => {}
        }
    }

    print_labels(&labeller)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
