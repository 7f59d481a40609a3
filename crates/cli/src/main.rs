use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colligo_core::{FetchConfig, Options};
use owo_colors::OwoColorize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bundle web pages into a single offline document
#[derive(Parser, Debug)]
#[command(name = "colligo")]
#[command(author = "Colligo Contributors")]
#[command(version = VERSION)]
#[command(about = "Bundle web pages into a single PDF, EPUB, or HTML document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bundle pages into a PDF
    Pdf(BundleArgs),
    /// Bundle pages into an EPUB
    Epub(BundleArgs),
    /// Bundle pages into a standalone HTML file
    Html(BundleArgs),
}

#[derive(clap::Args, Debug)]
struct BundleArgs {
    /// URLs or local HTML files to bundle, in reading order
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Output file, or a directory to receive the derived name
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Replace the built-in stylesheet with a CSS file
    #[arg(long, value_name = "FILE")]
    style: Option<PathBuf>,

    /// Extra CSS appended after the stylesheet
    #[arg(long, value_name = "CSS")]
    css: Option<String>,

    /// Replace the built-in page template with an HTML file
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Produce one artifact per URL instead of a merged bundle
    #[arg(long)]
    individual: bool,

    /// Launch the browser without its sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl BundleArgs {
    fn options(&self) -> Options {
        let mut fetch = FetchConfig { timeout: self.timeout, ..Default::default() };
        if let Some(ua) = &self.user_agent {
            fetch.user_agent = ua.clone();
        }

        Options {
            individual: self.individual,
            output: self.output.clone(),
            style: self.style.clone(),
            css: self.css.clone(),
            template: self.template.clone(),
            sandbox: !self.no_sandbox,
            fetch,
        }
    }
}

/// Print a styled banner for verbose mode
fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Colligo".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Bundle web pages into a single offline document".dimmed());
    eprintln!();
}

/// Print a styled step message
fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (args, format) = match &cli.command {
        Command::Pdf(args) => (args, "PDF"),
        Command::Epub(args) => (args, "EPUB"),
        Command::Html(args) => (args, "HTML"),
    };

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
        init_logging();
    }

    let options = args.options();

    if args.verbose {
        print_step(1, 1, &format!("Bundling {} page(s) into {}", args.urls.len(), format));
        for url in &args.urls {
            eprintln!("  {} {}", "•".dimmed(), url.bright_white().underline());
        }
        eprintln!();
    }

    let result = match &cli.command {
        Command::Pdf(_) => colligo_core::pdf(&args.urls, &options).await,
        Command::Epub(_) => colligo_core::epub(&args.urls, &options).await,
        Command::Html(_) => colligo_core::html(&args.urls, &options).await,
    };
    let written = result.with_context(|| format!("Failed to bundle pages into {}", format))?;

    for path in &written {
        print_success(&format!("Output written to {}", path.display().bright_white()));
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("colligo_core=debug,colligo=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
