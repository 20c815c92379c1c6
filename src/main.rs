mod app;
mod config;
mod document;
mod error;
mod event;
mod logger;
mod session;
mod submit;
mod theme;
mod ui;
mod workbench;

use anyhow::Context;
use app::ExamTaggerApp;
use clap::Parser;
use config::Config;
use document::{DocumentLoader, PdfConverter};
use eframe::egui;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;
use submit::SubmitClient;
use theme::Theme;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "exam-tagger", version, about = "Tag PDF fragments as exam questions and submit them")]
struct Args {
    /// PDF to convert on startup
    pdf: Option<PathBuf>,

    /// Config file (defaults to ~/.exam-tagger/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Question endpoint, overrides the config file
    #[arg(long)]
    endpoint: Option<String>,

    /// Directory for daily rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())
        .and_then(|config| config.with_overrides(args.endpoint, args.log_dir))
        .context("failed to load configuration")?;

    let _log_guard = logger::init(config.log_dir.as_deref());
    info!(endpoint = %config.endpoint, "starting exam-tagger");

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("exam-tagger-runtime")
        .build()?;

    let loader = DocumentLoader::new(
        Arc::new(PdfConverter::new(config.min_picture_side)),
        tx.clone(),
        runtime.handle().clone(),
    );
    let submitter = SubmitClient::new(
        config.endpoint.clone(),
        Duration::from_secs(config.request_timeout_secs),
        tx,
        runtime.handle().clone(),
    )
    .context("failed to build http client")?;

    let app = ExamTaggerApp::new(rx, loader, submitter, config, args.pdf);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Exam Tagger")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Exam Tagger",
        native_options,
        Box::new(move |creation_context| {
            Theme::default().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("window error: {err}"))?;

    Ok(())
}
