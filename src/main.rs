//! `whatnext` command-line entry point.
//!
//! No business logic lives here — only argument parsing, startup
//! (env files, logging, configuration) and output.

use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use whatnext_lib::annotate;
use whatnext_lib::config::{self, Config};
use whatnext_lib::contract::Variant;
use whatnext_lib::feedback::{self, FeedbackRecord};
use whatnext_lib::llm::{self, Provider};
use whatnext_lib::ocr::OcrEngine;
use whatnext_lib::pipeline::{self, Origin};
use whatnext_lib::report;
use whatnext_lib::upload::{self, Screenshot};

#[derive(Parser)]
#[command(name = "whatnext")]
#[command(about = "Understand the error. Know exactly what to do next.", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Error / output / log text
    #[arg(long, conflicts_with = "log_file")]
    log: Option<String>,

    /// Read log text from a file ("-" for stdin)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Screenshot to read and annotate (PNG or JPEG)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Diagnosis variant (defaults to WHATNEXT_VARIANT or "whatnext")
    #[arg(long)]
    variant: Option<Variant>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write the annotated screenshot here (.svg with labels, .png boxes only)
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Skip OCR even when tesseract is available
    #[arg(long)]
    no_ocr: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List reasoning providers and whether they are configured
    Providers,
    /// List diagnosis variants
    Variants,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = match std::env::current_dir() {
        Ok(cwd) => config::load_dotenv(&cwd),
        Err(_) => Ok(None),
    };
    env_logger::init();
    match dotenv {
        Ok(Some(path)) => log::info!("[STARTUP] Loaded {}", path.display()),
        Ok(None) => {}
        Err(e) => log::warn!("[STARTUP] Failed to load env file: {}", e),
    }

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }

    match &cli.command {
        Some(Commands::Providers) => {
            list_providers(&config);
            return ExitCode::SUCCESS;
        }
        Some(Commands::Variants) => {
            list_variants(config.variant);
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &Config) -> Result<(), String> {
    let schema = config.variant.schema();
    let log_text = read_log_text(cli).map_err(|e| format!("failed to read log text: {}", e))?;
    let screenshot = match &cli.image {
        Some(path) => Some(Screenshot::from_path(path).map_err(|e| e.to_string())?),
        None => None,
    };

    let provider = Provider::from_config(config).map_err(|e| e.to_string())?;
    let ocr = if cli.no_ocr || screenshot.is_none() {
        OcrEngine::Disabled
    } else {
        OcrEngine::detect(&config.tesseract_cmd)
    };

    let (request, diagnosis) =
        pipeline::run(&provider, &ocr, schema, log_text, screenshot.as_ref()).await;

    if cli.json {
        let json = report::render_json(schema, &diagnosis);
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        print!("{}", report::render_text(schema, &diagnosis.result));
    }

    if let (Some(out), Some(shot)) = (&cli.annotate, &screenshot) {
        if annotate::should_annotate(true, &diagnosis.result.visual_labels) {
            write_annotation(out, shot, &diagnosis.result.visual_labels)?;
        } else {
            log::info!("[ANNOTATE] No visual labels returned — nothing to draw");
        }
    }

    // Only asked interactively, once the report has been printed.
    let interactive = std::io::stdin().is_terminal() && std::io::stderr().is_terminal();
    if schema.collects_feedback && interactive && diagnosis.origin != Origin::EmptyInput {
        match feedback::prompt_judgment(std::io::stdin().lock(), std::io::stderr()) {
            Ok(Some(judgment)) => {
                let record = FeedbackRecord::new(schema, &request, &diagnosis.result, judgment);
                // Failing to record feedback does not fail the run.
                if let Err(e) = feedback::append(&config.feedback_log, schema, &record) {
                    log::error!("[FEEDBACK] {}", e);
                }
            }
            Ok(None) => log::info!("[FEEDBACK] Skipped"),
            Err(e) => log::warn!("[FEEDBACK] Could not read answer: {}", e),
        }
    }

    Ok(())
}

fn read_log_text(cli: &Cli) -> std::io::Result<Option<String>> {
    if let Some(text) = &cli.log {
        return Ok(Some(text.clone()));
    }
    match cli.log_file.as_deref() {
        Some(path) if path == Path::new("-") => read_stdin().map(Some),
        Some(path) => std::fs::read_to_string(path).map(Some),
        None if !std::io::stdin().is_terminal() && cli.image.is_none() => {
            read_stdin().map(Some)
        }
        None => Ok(None),
    }
}

fn read_stdin() -> std::io::Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_annotation(
    out: &Path,
    shot: &Screenshot,
    labels: &[whatnext_lib::contract::VisualLabel],
) -> Result<(), String> {
    let boxes = annotate::layout(labels);
    let is_png = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    let bytes = if is_png {
        let mut image = shot.image.clone();
        annotate::draw_boxes(&mut image, &boxes);
        upload::encode_png(&image).map_err(|e| e.to_string())?
    } else {
        annotate::render_svg(&shot.image, &boxes)
            .map_err(|e| e.to_string())?
            .into_bytes()
    };
    std::fs::write(out, bytes).map_err(|e| format!("failed to write {}: {}", out.display(), e))?;
    log::info!("[ANNOTATE] Wrote {} labels to {}", boxes.len(), out.display());
    Ok(())
}

fn list_providers(config: &Config) {
    for info in llm::provider::all_providers() {
        let active = if info.id == config.provider { "*" } else { " " };
        let configured = if config.is_provider_configured(info.id) {
            "configured"
        } else {
            "missing key"
        };
        println!(
            "{} {:<10} {:<40} {:<18} ({})",
            active, info.id, info.name, info.env_key, configured
        );
    }
}

fn list_variants(active: Variant) {
    for variant in Variant::ALL {
        let schema = variant.schema();
        let marker = if variant == active { "*" } else { " " };
        println!(
            "{} {:<11} {:<24} max_tokens={}{}",
            marker,
            variant,
            schema.title,
            schema.max_tokens,
            if schema.collects_feedback {
                "  (collects feedback)"
            } else {
                ""
            }
        );
    }
}
