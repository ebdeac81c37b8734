//! VDP-Scout main entry point
//!
//! Command-line interface for retrieving vehicle descriptions from
//! dealership Vehicle Detail Pages.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vdp_scout::config::Config;
use vdp_scout::llm::LlmClient;
use vdp_scout::{pipeline, DiscoveryOutcome};

/// VDP-Scout: vehicle description retrieval from dealership pages
#[derive(Parser, Debug)]
#[command(name = "vdp-scout")]
#[command(version = "1.0.0")]
#[command(about = "Extract vehicle descriptions from dealership VDP pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a VDP and print its isolated vehicle description
    ScrapeDescription {
        /// The VDP URL to process
        vdp_url: String,
    },

    /// Derive tag chains for an unregistered dealer template
    DiscoverPaths {
        /// The VDP URL to analyze
        vdp_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = Config::from_env()?;
    let llm = LlmClient::new(config)?;
    tracing::info!(model = llm.model(), "model collaborator configured");

    match cli.command {
        Command::ScrapeDescription { vdp_url } => {
            let (description, tokens_used) = pipeline::get_description(&vdp_url, &llm).await?;
            tracing::info!("description retrieval used {} tokens", tokens_used);
            println!("{}", description);
        }
        Command::DiscoverPaths { vdp_url } => {
            let discovery = pipeline::discover_paths_for_url(&vdp_url, &llm).await?;
            tracing::info!("path discovery used {} tokens", discovery.tokens_used);
            match discovery.outcome {
                DiscoveryOutcome::Paths(chains) => {
                    println!("{}", serde_json::to_string_pretty(&chains)?);
                }
                DiscoveryOutcome::NoSection => {
                    println!("{}", pipeline::NO_SECTION_MESSAGE);
                }
                DiscoveryOutcome::HeadingNotFound => {
                    println!("Picked heading could not be re-located in the page HTML");
                }
            }
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vdp_scout=info,warn"),
            1 => EnvFilter::new("vdp_scout=debug,info"),
            2 => EnvFilter::new("vdp_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
