mod posts;
mod report;
mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reeltrack_core::AppConfig;
use reeltrack_db::{JsonFileKv, MetricStore};
use reeltrack_tracker::{SimulatedSource, Tracker, TrackerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reeltrack")]
#[command(about = "Track Instagram post metrics and creator analytics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Track a single post
    Submit {
        /// Instagram reel, post or video URL
        url: String,
    },
    /// Track many posts in paced groups
    Batch {
        /// Instagram URLs
        urls: Vec<String>,
        /// File with one URL per line
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Stop tracking a post
    Delete {
        /// Post id as shown by `list`
        id: String,
    },
    /// List tracked posts, newest first
    List {
        /// Maximum number of posts to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show aggregate analytics
    Analytics,
    /// Refresh metrics for every tracked post now
    Refresh,
    /// Show the creator profile
    Profile,
    /// Update creator handle, linked accounts and payment methods
    Settings {
        /// YAML file with creator settings (defaults to `REELTRACK_CREATOR_PATH`)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run the growth simulator and print analytics on every change
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = reeltrack_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("reeltrack ready; run `reeltrack --help` for commands");
        return Ok(());
    };

    let tracker = open_tracker(&config)?;
    match command {
        Commands::Submit { url } => posts::run_submit(&tracker, &url).await?,
        Commands::Batch { urls, file } => {
            posts::run_batch(&tracker, urls, file.as_deref()).await?;
        }
        Commands::Delete { id } => posts::run_delete(&tracker, &id).await?,
        Commands::List { limit } => posts::run_list(&tracker, limit),
        Commands::Analytics => report::run_analytics(&tracker),
        Commands::Refresh => report::run_refresh(&tracker).await?,
        Commands::Profile => report::run_profile(&tracker),
        Commands::Settings { file } => {
            report::run_settings(&tracker, file.as_deref(), &config.creator_path).await?;
        }
        Commands::Watch => watch::run_watch(&tracker).await?,
    }

    Ok(())
}

/// Open the JSON store under the configured data directory.
fn open_tracker(config: &AppConfig) -> anyhow::Result<Tracker> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    let kv = Arc::new(JsonFileKv::new(&config.data_dir));
    let store = Arc::new(MetricStore::open(kv)?);
    let source = Arc::new(SimulatedSource::new(config.sim_seed));
    let tracker = Tracker::new(store, source, &TrackerConfig::from(config));

    tracing::debug!(
        env = %config.env,
        data_dir = %config.data_dir.display(),
        "tracker opened"
    );
    Ok(tracker)
}

#[cfg(test)]
mod tests;
