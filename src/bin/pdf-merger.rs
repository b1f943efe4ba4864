//! PDF Merger CLI tool
//!
//! A command-line tool for merging PDFs with optional page normalization.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use pdf_merger::config::output_file_name;
use pdf_merger::layout::{LayoutMode, LayoutPolicy, PaperSize, RotationStrategy};
use pdf_merger::pdf::{extract_metadata, merge_pdfs, MergeOptions};
use pdf_merger::preview::DEFAULT_ZOOM;
use pdf_merger::{MergeConfig, MergeSession};

/// PDF Merger - Merge PDFs in order, optionally normalizing page size
#[derive(Parser)]
#[command(name = "pdf-merger")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge PDFs as they are
    pdf-merger merge -o output.pdf intro.pdf body.pdf appendix.pdf

    # Merge numbered PDFs in order, every page portrait A4
    pdf-merger merge -o handout.pdf --layout portrait --page-size A4 \"[0-9]*.pdf\"

    # Inspect page 3 of the merged result at 150% zoom
    pdf-merger preview --layout landscape --page 3 --zoom 150 *.pdf

    # Write default settings, edit them, then merge with them
    pdf-merger config init settings.json
    pdf-merger merge --config settings.json -o out.pdf *.pdf")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (defaults to <output_name>.pdf from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Merge in memory and show the resulting pages
    Preview {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Zoom in percent (50-200, steps of 25)
        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: u32,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Manage merge settings files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default settings to a JSON file
    Init {
        /// Settings file to create
        path: PathBuf,
    },
}

/// Page normalization flags, overriding the config file
#[derive(Args)]
struct LayoutArgs {
    /// Settings file (JSON) to start from
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page layout: keep-original (merge), portrait, landscape
    #[arg(long)]
    layout: Option<String>,

    /// Target paper size: A4, A3, A5, Letter (unknown names use A4)
    #[arg(long)]
    page_size: Option<String>,

    /// Rotation strategy: auto, fixed (manual)
    #[arg(long)]
    rotation: Option<String>,
}

impl LayoutArgs {
    fn resolve(&self) -> Result<MergeConfig> {
        let mut config = match &self.config {
            Some(path) => MergeConfig::load(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?,
            None => MergeConfig::default(),
        };

        if let Some(layout) = &self.layout {
            config.layout = layout.parse::<LayoutMode>()?;
        }
        if let Some(size) = &self.page_size {
            config.page_size = PaperSize::from_name(size);
        }
        if let Some(rotation) = &self.rotation {
            config.rotation = rotation.parse::<RotationStrategy>()?;
        }

        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Merge { inputs, output, layout, open } => cmd_merge(inputs, output, layout, open),
        Commands::Preview { inputs, layout, page, zoom } => cmd_preview(inputs, layout, page, zoom),
        Commands::Info { input } => cmd_info(input),
        Commands::Config { action: ConfigAction::Init { path } } => cmd_config_init(path),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand glob patterns in input paths.
///
/// Each glob's matches are sorted; literal paths keep the position they
/// were given in.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            let entries = glob(&pattern)
                .map_err(|e| pdf_merger::Error::InvalidGlob(format!("{}: {}", pattern, e)))?;
            for entry in entries {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => tracing::warn!(%pattern, error = %e, "glob error"),
                }
            }
            if matched.is_empty() {
                return Err(pdf_merger::Error::NoFilesMatched(pattern).into());
            }
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

fn describe_policy(policy: &LayoutPolicy) -> String {
    match policy.mode {
        LayoutMode::KeepOriginal => "original page sizes".to_string(),
        LayoutMode::ForcePortrait => format!("{} portrait", policy.paper_size),
        LayoutMode::ForceLandscape => format!("{} landscape", policy.paper_size),
    }
}

/// Merge multiple PDFs into one
fn cmd_merge(inputs: Vec<String>, output: Option<PathBuf>, layout: LayoutArgs, open: bool) -> Result<()> {
    let config = layout.resolve()?;
    let inputs = expand_globs(inputs)?;
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(output_file_name(&config.output_name)?),
    };

    eprintln!(
        "Merging {} PDF files ({})...",
        inputs.len(),
        describe_policy(&config.policy())
    );

    let options = MergeOptions {
        input_paths: inputs,
        output_path: output.clone(),
        policy: config.policy(),
    };

    let merged = merge_pdfs(&options).context("Merge failed")?;

    eprintln!("Merged {} pages to: {}", merged.page_count(), output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Merge in memory and describe the result
fn cmd_preview(inputs: Vec<String>, layout: LayoutArgs, page: usize, zoom: u32) -> Result<()> {
    let config = layout.resolve()?;
    let inputs = expand_globs(inputs)?;

    let mut session = MergeSession::new(&config);
    let added = session.add_paths(&inputs)?;
    if added < inputs.len() {
        eprintln!("Skipped {} non-PDF files", inputs.len() - added);
    }

    for (i, file) in session.files().iter().enumerate() {
        println!("{:>3}. {} {}", i + 1, file.name, file.size_label());
    }

    session.preview().context("Preview failed")?;
    session.show(page.saturating_sub(1), zoom);

    let (Some(merged), Some(state)) = (session.previewed(), session.preview_state()) else {
        bail!("Preview failed");
    };

    println!();
    println!("Layout: {}", describe_policy(session.policy()));
    println!("Pages: {}", merged.page_count());
    for (i, merged_page) in merged.pages.iter().enumerate() {
        let placement = &merged_page.placement;
        println!(
            "{:>4}  {} p.{}  -> {}{}  scale {:.3}  offset ({:.1}, {:.1})",
            i + 1,
            session.files()[merged_page.source_index].name,
            merged_page.source_page,
            placement.target,
            if placement.rotated { "  rotated" } else { "" },
            placement.transform.scale,
            placement.transform.x,
            placement.transform.y,
        );
    }

    if let Some(view) = session.current_view() {
        println!();
        println!(
            "Page {} at {}%: viewport {:.0}×{:.0}",
            state.page_label(),
            state.zoom(),
            view.viewport.width,
            view.viewport.height
        );
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    for (i, size) in metadata.page_sizes.iter().enumerate() {
        let orientation = if size.is_portrait() { "portrait" } else { "landscape" };
        println!("  {:>4}: {} ({})", i + 1, size, orientation);
    }

    Ok(())
}

/// Write default settings
fn cmd_config_init(path: PathBuf) -> Result<()> {
    if path.exists() {
        bail!("Refusing to overwrite existing file: {}", path.display());
    }
    MergeConfig::default().save(&path)?;
    eprintln!("Wrote default settings to: {}", path.display());
    Ok(())
}
