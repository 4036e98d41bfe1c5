use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bilicover_common::Config;
use bilicover_harvest::run;

#[derive(Parser)]
#[command(name = "bilicover-harvest")]
#[command(about = "Bilibili cover-song data harvester")]
#[command(version)]
struct Cli {
    /// Candidate videos to harvest, as bvids.
    #[arg(value_name = "BVID")]
    bvids: Vec<String>,

    /// File with one bvid per line ('#' lines ignored), read in addition
    /// to any bvids given as arguments.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Do not page through nested replies beyond what the API inlines.
    #[arg(long)]
    no_replies: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bilicover_harvest=info".parse()?)
                .add_directive("bili_client=warn".parse()?),
        )
        .init();

    info!("Bilicover harvester starting...");

    let cli = Cli::parse();

    // Load config
    let config = Config::from_env();
    config.log_redacted();

    let mut bvids = cli.bvids.clone();
    if let Some(path) = &cli.input {
        let raw = std::fs::read_to_string(path)?;
        bvids.extend(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }
    if bvids.is_empty() {
        anyhow::bail!("no videos to harvest: pass bvids as arguments or via --input");
    }

    let stats = run::run(&config, &bvids, !cli.no_replies).await?;

    info!(
        videos = stats.videos,
        comments = stats.comments,
        danmaku = stats.danmaku,
        "Harvest run complete"
    );
    for path in &stats.files {
        info!(path = %path.display(), "wrote");
    }

    Ok(())
}
