//! Plumage CLI Module
//!
//! Command-line interface for serving the classifier and for one-off
//! predictions from disk.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::inference::{InferenceConfig, InferenceEngine, LabelMap};
use crate::server::{run_server, ServerConfig};

// ─── Styling ───────────────────────────────────────────────────────────────────

const W: usize = 58; // banner text width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn warn(s: &str) -> ColoredString   { s.truecolor(230, 180, 80) }

/// Printed width of `s`, ignoring ANSI color sequences
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match c {
            '\x1b' => in_escape = true,
            'm' if in_escape => in_escape = false,
            _ if in_escape => {}
            _ => width += 1,
        }
    }
    width
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

/// Boxed banner built up line by line
struct Banner {
    out: String,
}

impl Banner {
    fn new() -> Self {
        let mut banner = Self { out: String::new() };
        banner.rule('┌', '┐');
        banner
    }

    fn rule(&mut self, left: char, right: char) {
        let line = format!("{}{}{}", left, "─".repeat(W + 3), right);
        self.out.push_str(&format!("  {}\n", dim(&line)));
    }

    fn row(&mut self, content: &str, centered: bool) {
        let pad = W.saturating_sub(visible_width(content));
        let left = if centered { pad / 2 } else { 0 };
        self.out.push_str(&format!(
            "  {}  {}{}{} {}\n",
            dim("│"),
            " ".repeat(left),
            content,
            " ".repeat(pad - left),
            dim("│")
        ));
    }

    fn blank(&mut self) {
        self.row("", false);
    }

    fn finish(mut self) -> String {
        self.rule('└', '┘');
        self.out
    }
}

/// Startup banner listing the endpoints and artifacts being served
fn serve_banner(config: &ServerConfig) -> String {
    let base = format!("http://{}:{}", config.host, config.port);

    let mut banner = Banner::new();
    banner.blank();
    banner.row(&format!("{}", "Plumage".white().bold()), true);
    banner.row(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))), true);
    banner.blank();
    banner.rule('├', '┤');
    banner.blank();
    banner.row(&kv("Upload ", &format!("POST {}/api/upload", base)), false);
    banner.row(&kv("Health ", &format!("GET  {}/api/health", base)), false);
    banner.row(&kv("Model  ", &config.model_path.display().to_string()), false);
    banner.row(&kv("Labels ", &config.labels_path.display().to_string()), false);
    banner.blank();
    banner.rule('├', '┤');
    banner.blank();
    banner.row(&format!("{}", dim("ctrl+c to stop")), true);
    banner.blank();
    banner.finish()
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "plumage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bird image classification server")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the upload API
    Serve {
        /// Address to bind
        #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "API_PORT", default_value = "8080")]
        port: u16,

        /// ONNX model artifact
        #[arg(short, long, env = "MODEL_PATH")]
        model: Option<PathBuf>,

        /// Label mapping JSON
        #[arg(short, long, env = "LABELS_PATH")]
        labels: Option<PathBuf>,
    },

    /// Classify a single image file
    Predict {
        /// Image to classify
        #[arg(short, long)]
        image: PathBuf,

        /// ONNX model artifact
        #[arg(short, long, env = "MODEL_PATH", default_value = crate::server::DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Label mapping JSON
        #[arg(short, long, env = "LABELS_PATH", default_value = crate::server::DEFAULT_LABELS_PATH)]
        labels: PathBuf,
    },

    /// Print the index → label mapping
    Labels {
        /// Label mapping JSON
        #[arg(short, long, env = "LABELS_PATH", default_value = crate::server::DEFAULT_LABELS_PATH)]
        labels: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Print the startup banner and run the server
pub async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    println!();
    print!("{}", serve_banner(&config));
    println!();

    run_server(config).await
}

/// Classify one file from disk and print the result
pub fn cmd_predict(image: &Path, model: &Path, labels: &Path) -> anyhow::Result<()> {
    let engine = InferenceEngine::load(InferenceConfig::default(), model, labels);
    if !engine.is_ready() {
        anyhow::bail!(
            "model ({}) or labels ({}) not loaded properly",
            model.display(),
            labels.display()
        );
    }

    let bytes = std::fs::read(image)?;
    let start = Instant::now();
    let prediction = engine.classify(&bytes)?;
    let elapsed = start.elapsed();

    println!();
    println!("  {} {}", ok("✓"), prediction.label.white().bold());
    println!("  {}", kv("image ", &image.display().to_string()));
    println!("  {}", kv("index ", &prediction.index.to_string()));
    println!("  {}", kv("score ", &format!("{:.4}", prediction.score)));
    println!("  {}", kv("time  ", &format!("{:.1} ms", elapsed.as_secs_f64() * 1000.0)));
    if engine.labels().and_then(|l| l.get(prediction.index)).is_none() {
        println!("  {} {}", warn("!"), dim("predicted index has no label"));
    }
    println!();
    Ok(())
}

/// Print the inverted label mapping in index order
pub fn cmd_labels(labels: &Path) -> anyhow::Result<()> {
    let map = LabelMap::load(labels)?;

    println!();
    println!("  {}", kv("labels ", &format!("{} ({} classes)", labels.display(), map.len())));
    println!("  {}", dim(&"─".repeat(56)));
    for (index, label) in map.entries() {
        println!("  {:>5}  {}", muted(&index.to_string()), label);
    }
    println!();
    Ok(())
}
