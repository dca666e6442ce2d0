mod commands;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "rv-cli")]
#[command(about = "Review Velocity command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TierArg {
    Standard,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    /// Self-contained HTML snapshot with schema.org markup.
    Static,
    /// Live iframe snippet pointing at the hosted widget.
    Embed,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a business by name or place identifier.
    Analyze {
        /// Business name, link, or place identifier.
        #[arg(long)]
        query: String,
        /// Access tier for the fetch.
        #[arg(long, value_enum, default_value = "standard")]
        tier: TierArg,
        /// Elevated-access credential; without it the tier falls back to
        /// standard.
        #[arg(long)]
        credential: Option<String>,
        /// Force audit-mode framing for the text analysis.
        #[arg(long)]
        audit: Option<bool>,
    },
    /// Import pasted review text from a file and analyze it.
    Import {
        /// Path to a text file of raw reviews.
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Generate embed markup from a cached analysis.
    Export {
        /// Place identifier of a previously analyzed business.
        #[arg(long)]
        place_id: String,
        #[arg(long, value_enum, default_value = "static")]
        format: ExportFormat,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = rv_core::load_app_config()?;

    match cli.command {
        Commands::Analyze {
            query,
            tier,
            credential,
            audit,
        } => {
            let tier = match tier {
                TierArg::Elevated if credential.is_some_and(|c| !c.trim().is_empty()) => {
                    rv_core::Tier::Elevated
                }
                TierArg::Elevated => {
                    tracing::warn!("--tier elevated requires --credential; using standard");
                    rv_core::Tier::Standard
                }
                TierArg::Standard => rv_core::Tier::Standard,
            };
            commands::run_analyze(&config, &query, tier, audit).await
        }
        Commands::Import { file } => commands::run_import(&config, &file).await,
        Commands::Export { place_id, format } => {
            commands::run_export(&config, &place_id, format == ExportFormat::Static)
        }
    }
}
