//! Redaction engine CLI.
//!
//! Inspects page geometry, converts boxes between render and document
//! space, and turns a detector response into the rectangle list a
//! document-mutation service consumes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use redactor_engine::services::parse_detector_response;
use redactor_engine::{
    to_document_space, to_render_space, BBox, Document, DocumentSize, EngineConfig,
    PageGeometry, RedactionSession, RenderSize,
};

/// Redaction coordinate engine
///
/// Maps redaction marks between on-screen and document coordinates and
/// projects them for export.
#[derive(Parser)]
#[command(name = "redactor-engine")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Space {
    Document,
    Render,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the document size of every page of a PDF
    Pages {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Convert one box between render and document space
    Transform {
        /// Page document size, e.g. 612x792
        #[arg(long, value_name = "WxH", value_parser = parse_size)]
        document: (f64, f64),

        /// Page render size, e.g. 600x776.47
        #[arg(long, value_name = "WxH", value_parser = parse_size)]
        render: (f64, f64),

        /// Box to convert, e.g. 100,50,80,20
        #[arg(long, value_name = "X,Y,W,H", value_parser = parse_bbox)]
        bbox: BBox,

        /// Target space
        #[arg(long, value_enum, default_value = "document")]
        to: Space,
    },

    /// Project a detector response into export rectangles
    Project {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Detector response (JSON list of {page, bbox, text, category})
        #[arg(short, long, value_name = "FILE")]
        detections: PathBuf,

        /// Lay every page out at this render width
        #[arg(long, value_name = "WIDTH")]
        render_width: Option<f64>,

        /// Hide every entity in this category (can be specified multiple times)
        #[arg(long, value_name = "CATEGORY")]
        hide_category: Vec<String>,

        /// Hide every entity with this exact text (can be specified multiple times)
        #[arg(long, value_name = "TEXT")]
        hide_text: Vec<String>,

        /// Output JSON file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_size(value: &str) -> Result<(f64, f64), String> {
    static SIZE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*[xX]\s*(\d+(?:\.\d+)?)\s*$").expect("Valid regex pattern")
    });
    let caps = SIZE
        .captures(value)
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: f64 = caps[1].parse().map_err(|e| format!("{}", e))?;
    let height: f64 = caps[2].parse().map_err(|e| format!("{}", e))?;
    if width <= 0.0 || height <= 0.0 {
        return Err("sizes must be positive".to_string());
    }
    Ok((width, height))
}

fn parse_bbox(value: &str) -> Result<BBox, String> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{}': {}", p, e)))
        .collect::<Result<Vec<f64>, String>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(BBox::new(*x, *y, *w, *h)),
        _ => Err(format!("expected X,Y,W,H, got '{}'", value)),
    }
}

/// Command handler with the loaded configuration.
struct EngineHandler {
    config: EngineConfig,
    verbose: bool,
}

impl EngineHandler {
    fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self> {
        let config = match config_path {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        Ok(Self { config, verbose })
    }

    fn load_document(&self, input: &Path) -> Result<Document> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
        let bytes = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Document::from_pdf_bytes(&name, bytes)
            .with_context(|| format!("Failed to read page sizes from {}", input.display()))
    }

    fn pages(&self, input: &Path) -> Result<()> {
        let document = self.load_document(input)?;
        for (index, size) in document.pages().iter().enumerate() {
            if size.origin_x != 0.0 || size.origin_y != 0.0 {
                println!(
                    "page {}: {} x {} at ({}, {})",
                    index, size.width, size.height, size.origin_x, size.origin_y
                );
            } else {
                println!("page {}: {} x {}", index, size.width, size.height);
            }
        }
        Ok(())
    }

    fn transform(&self, document: (f64, f64), render: (f64, f64), bbox: BBox, to: Space) -> Result<()> {
        let geometry = PageGeometry::new(
            DocumentSize::new(document.0, document.1),
            RenderSize::new(render.0, render.1),
        );
        let converted = match to {
            Space::Document => to_document_space(&bbox, &geometry, 0)?,
            Space::Render => to_render_space(&bbox, &geometry, 0)?,
        };
        if self.verbose {
            println!("scale: {:.4} x {:.4}", geometry.scale_x(), geometry.scale_y());
        }
        println!(
            "{:.4},{:.4},{:.4},{:.4}",
            converted.x, converted.y, converted.width, converted.height
        );
        Ok(())
    }

    fn project(
        &self,
        input: &Path,
        detections: &Path,
        render_width: Option<f64>,
        hide_category: &[String],
        hide_text: &[String],
        output: Option<&Path>,
    ) -> Result<()> {
        let document = self.load_document(input)?;
        let page_count = document.page_count();
        let mut session = RedactionSession::new(document, self.config.clone())?;

        if let Some(width) = render_width {
            for page in 0..page_count {
                session.fit_page_to_width(page, width)?;
            }
        }

        let json = std::fs::read_to_string(detections)
            .with_context(|| format!("Failed to read {}", detections.display()))?;
        let ticket = session.begin_detection()?;
        let ids = session
            .complete_detection(ticket, parse_detector_response(&json))
            .with_context(|| "Detector response rejected")?;

        for category in hide_category {
            session.set_visible_by_category(category, false);
        }
        for text in hide_text {
            session.set_visible_by_text(text, false);
        }

        if self.verbose {
            let index = session.index();
            println!("Entities: {} ({} visible)", index.total, index.visible);
            for group in &index.categories {
                println!(
                    "  {}: {} ({} visible)",
                    group.category, group.count, group.visible_count
                );
            }
        }

        let rects = session.projection();
        let rendered = serde_json::to_string_pretty(&rects)?;
        match output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("Failed to write to {}", path.display()))?;
                println!(
                    "✓ Projected {} of {} entities → {}",
                    rects.len(),
                    ids.len(),
                    path.display()
                );
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let handler = EngineHandler::new(cli.config.as_deref(), cli.verbose)?;

    match &cli.command {
        Commands::Pages { input } => handler.pages(input)?,
        Commands::Transform {
            document,
            render,
            bbox,
            to,
        } => handler.transform(*document, *render, *bbox, *to)?,
        Commands::Project {
            input,
            detections,
            render_width,
            hide_category,
            hide_text,
            output,
        } => handler.project(
            input,
            detections,
            *render_width,
            hide_category,
            hide_text,
            output.as_deref(),
        )?,
    }

    Ok(())
}
