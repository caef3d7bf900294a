use anyhow::Result;
use clap::Parser;
use perch_common::observability::{LogConfig, init_logging};
use perch_config::PerchConfigLoader;
use perch_social::TwitterApi;
use perch_social::twitter::OauthKeys;
use perch_web::HttpPageSource;
use std::path::{Path, PathBuf};

mod dataset;
mod publisher;
mod trim;

use dataset::SourceDataset;
use publisher::Publisher;

/// Post a random bird page as an image update with a threaded description
/// reply. One run per invocation.
#[derive(Parser, Debug)]
#[command(name = "perch", version)]
struct Args {
    /// Raise console log verbosity to debug.
    #[arg(short, long)]
    debug: bool,

    /// Mirror logs to the console in addition to the log file.
    #[arg(short, long)]
    console: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config file is optional; env wins.
    let cfg = PerchConfigLoader::new().with_file("perch.yaml").load()?;

    init_logging(LogConfig {
        log_dir: cfg.log_dir.as_deref().map(PathBuf::from),
        console: args.console,
        console_debug: args.debug,
        ..Default::default()
    })?;

    let dataset = SourceDataset::load(Path::new(&cfg.dataset_path))?;

    let keys = OauthKeys {
        consumer_key: cfg.credentials.api_key.clone(),
        consumer_secret: cfg.credentials.api_secret_key.clone(),
        access_token: cfg.credentials.access_token.clone(),
        access_token_secret: cfg.credentials.access_token_secret.clone(),
    };
    let poster = TwitterApi::new(keys);
    let pages = HttpPageSource::new()?;

    let publisher = Publisher::new(
        poster,
        pages,
        dataset,
        PathBuf::from(cfg.scratch_path.as_str()),
    )
    .with_auth_failure_fatal(cfg.auth_failure_fatal);

    // Run-level failures are logged, never signalled through the exit code;
    // the log file is the ground truth for what went out.
    match publisher.run().await {
        Ok(outcome) => {
            tracing::info!(
                image_posted = outcome.posted.is_some(),
                reply_sent = outcome.reply_sent,
                "run complete"
            );
        }
        Err(err) => {
            tracing::error!(kind = err.kind(), error = ?err, "run aborted");
        }
    }

    Ok(())
}
