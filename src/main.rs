//! promptfx-server: per-user sound effect generation service.
//!
//! This binary can run in two modes:
//! - One-shot mode: generate a single WAV file locally for testing
//! - Serve mode: run the authenticated HTTP service

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use promptfx_server::audio::write_wav;
use promptfx_server::auth::StaticTokenVerifier;
use promptfx_server::cli::Cli;
use promptfx_server::config::ServerConfig;
use promptfx_server::generation::{GenerationPipeline, SoundGenerator, ToneGenerator};
use promptfx_server::http::{serve, AppState};
use promptfx_server::storage::{AccessGate, DirectoryAllocator, MetadataStore};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    if cli.is_serve_mode() {
        run_serve_mode(&cli)
    } else if cli.is_generate_mode() {
        run_generate_mode(&cli)
    } else {
        print_usage();
        Ok(())
    }
}

/// Runs one-shot generation without the server or storage layout.
fn run_generate_mode(cli: &Cli) -> anyhow::Result<()> {
    let prompt = cli.prompt.as_ref().expect("prompt required in one-shot mode");
    let output_path = cli.output_path();

    eprintln!("=== promptfx one-shot generation ===");
    eprintln!("Prompt: \"{}\"", prompt);
    eprintln!("Duration: {}s", cli.duration);
    eprintln!("Steps: {}", cli.steps);
    eprintln!("Output: {}", output_path.display());
    eprintln!();

    let generator = ToneGenerator::new();
    let audio = generator
        .generate(prompt, cli.steps, cli.duration)
        .context("generation failed")?;

    write_wav(&audio.samples, &output_path, audio.sample_rate)
        .context("failed to write WAV file")?;
    eprintln!("Saved to: {}", output_path.display());

    Ok(())
}

/// Runs the HTTP service.
fn run_serve_mode(cli: &Cli) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env();
    if cli.content_root.is_some() {
        config.content_root = cli.content_root.clone();
    }
    if cli.bind.is_some() {
        config.bind = cli.bind;
    }
    if cli.auth_tokens.is_some() {
        config.auth_tokens = cli.auth_tokens.clone();
    }

    if let Some(message) = config.validate() {
        bail!("invalid configuration: {}", message);
    }

    let root = config.effective_content_root();
    let allocator = Arc::new(
        DirectoryAllocator::open(&root)
            .with_context(|| format!("failed to open content root {}", root.display()))?,
    );
    let metadata = Arc::new(MetadataStore::new());

    let verifier = match config.auth_tokens {
        Some(ref path) => Arc::new(
            StaticTokenVerifier::from_file(path)
                .with_context(|| format!("failed to load token map {}", path.display()))?,
        ),
        None => {
            tracing::warn!("no token map configured; every request will be rejected");
            Arc::new(StaticTokenVerifier::default())
        }
    };

    let state = AppState::new(
        Arc::new(GenerationPipeline::new(
            allocator.clone(),
            metadata.clone(),
            Arc::new(ToneGenerator::new()),
        )),
        Arc::new(AccessGate::new(allocator, metadata)),
        verifier,
    );

    let addr = config.effective_bind();
    tracing::info!(content_root = %root.display(), "starting service");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?
        .block_on(serve(state, addr))
        .context("server error")?;

    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("promptfx-server: per-user sound effect generation service");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  One-shot generation:");
    eprintln!("    promptfx-server --prompt \"rain on a tin roof\" --duration 5 --output rain.wav");
    eprintln!();
    eprintln!("  HTTP service:");
    eprintln!("    promptfx-server --serve --content-root ./users --auth-tokens tokens.json");
    eprintln!();
    eprintln!("Run 'promptfx-server --help' for full options.");
}
