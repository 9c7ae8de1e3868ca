use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trip_scout::cli::{Cli, Commands, OutputFormat};
use trip_scout::config::Config;
use trip_scout::output;
use trip_scout::pipeline::AnalysisPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; --verbose and --quiet set the default level,
    // RUST_LOG still wins when present
    let default_filter = if cli.verbose {
        "trip_scout=debug"
    } else if cli.quiet {
        "trip_scout=warn"
    } else {
        "trip_scout=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Analyze {
            url,
            output,
            format,
        } => {
            let format = format
                .unwrap_or_else(|| OutputFormat::from_name(&config.app.default_output_format));
            let pipeline = AnalysisPipeline::new(&config)?;

            tracing::info!("Starting analysis for URL: {}", url);

            let result = pipeline.analyze(&url).await?;

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, &format).await?;
                    println!("Analysis saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&result, &format)?;
                }
            }
        }
        Commands::Transcript { url, output } => {
            let pipeline = AnalysisPipeline::new(&config)?;

            tracing::info!("Fetching transcript for URL: {}", url);

            let transcript = pipeline.transcript(&url).await?;

            match output {
                Some(path) => {
                    output::save_text(&transcript, &path).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    println!("{}", transcript);
                }
            }
        }
        Commands::Keys => {
            config.display_key_status();
        }
    }

    Ok(())
}
