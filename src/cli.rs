//! CLI argument parser.
//!
//! Provides a one-shot generation mode for testing the backend without
//! the HTTP server, and the `--serve` flag for running the service.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// promptfx-server: per-user sound effect generation service
#[derive(Parser, Debug)]
#[command(name = "promptfx-server")]
#[command(about = "Per-user sound effect generation service with isolated on-disk storage")]
#[command(version)]
pub struct Cli {
    /// Text prompt describing the sound to generate (one-shot mode)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Duration of audio to generate in seconds (1-30)
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=30))]
    pub duration: u32,

    /// Number of inference steps
    #[arg(long, default_value = "500")]
    pub steps: u32,

    /// Output WAV file path (one-shot mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Content root holding per-user directories
    #[arg(long)]
    pub content_root: Option<PathBuf>,

    /// Address to bind the HTTP server on
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Path to a JSON file mapping bearer tokens to email addresses
    #[arg(long)]
    pub auth_tokens: Option<PathBuf>,

    /// Run the HTTP server
    #[arg(long)]
    pub serve: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running in one-shot generation mode.
    pub fn is_generate_mode(&self) -> bool {
        !self.serve && self.prompt.is_some()
    }

    /// Returns true if running the HTTP server.
    pub fn is_serve_mode(&self) -> bool {
        self.serve
    }

    /// Returns the effective output path for one-shot mode.
    ///
    /// Defaults to "output.wav" in the current directory if not specified.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from("output.wav"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            prompt: None,
            duration: 5,
            steps: 500,
            output: None,
            content_root: None,
            bind: None,
            auth_tokens: None,
            serve: false,
        }
    }

    #[test]
    fn generate_mode_detection() {
        let cli = Cli {
            prompt: Some("rain".to_string()),
            ..base_cli()
        };
        assert!(cli.is_generate_mode());
        assert!(!cli.is_serve_mode());
    }

    #[test]
    fn serve_mode_detection() {
        let cli = Cli {
            serve: true,
            ..base_cli()
        };
        assert!(cli.is_serve_mode());
        assert!(!cli.is_generate_mode());
    }

    #[test]
    fn neither_mode_without_flags() {
        let cli = base_cli();
        assert!(!cli.is_generate_mode());
        assert!(!cli.is_serve_mode());
    }

    #[test]
    fn output_path_default() {
        assert_eq!(base_cli().output_path(), PathBuf::from("output.wav"));
    }
}
