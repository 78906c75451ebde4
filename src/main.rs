use anyhow::{Context, Result};
use argh::FromArgs;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod commands;
mod config;
mod dispatcher;
mod fetcher;
mod logging;
mod report;
mod tile;

#[cfg(test)]
mod test_server;

use commands::{download_tiles, print_plan};
use config::{BoundingBox, Config, ZoomRange, DEFAULT_CONCURRENCY, DEFAULT_TILE_URL};

static USER_AGENT: &str = "quadtiles/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(FromArgs)]
/// Downloads quadkey-addressed map tiles covering a bounding box into <output>/<zoom>/<x>/<y>.jpg, skipping tiles already on disk.
struct Args {
    #[argh(option, short = 'o', default = "PathBuf::from(\"tiles\")")]
    /// directory to save tiles into
    output: PathBuf,

    #[argh(option, default = "37.7749")]
    /// southern edge of the bounding box in degrees
    south: f64,

    #[argh(option, default = "37.8044")]
    /// northern edge of the bounding box in degrees
    north: f64,

    #[argh(option, default = "-122.4194")]
    /// western edge of the bounding box in degrees
    west: f64,

    #[argh(option, default = "-122.3890")]
    /// eastern edge of the bounding box in degrees
    east: f64,

    #[argh(option, short = 'z', default = "ZoomRange::default()")]
    /// zoom levels: N, A-B or A..=B (inclusive), A..B (exclusive)
    zoom: ZoomRange,

    #[argh(option, short = 'c', default = "DEFAULT_CONCURRENCY")]
    /// number of tiles to download at once
    concurrency: usize,

    #[argh(option)]
    /// tile url template containing {quadkey}, overrides TILE_URL_TEMPLATE
    url: Option<String>,

    #[argh(switch)]
    /// only print the tiles each zoom level would cover
    plan: bool,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = logging::init();
    let args: Args = argh::from_env();

    let url_template = args
        .url
        .or_else(|| env::var("TILE_URL_TEMPLATE").ok())
        .unwrap_or_else(|| DEFAULT_TILE_URL.to_string());
    let config = Config::new(
        args.output,
        BoundingBox {
            south: args.south,
            north: args.north,
            west: args.west,
            east: args.east,
        },
        args.zoom,
        args.concurrency,
        url_template,
    )?;
    info!(?config, "starting run");

    if args.plan {
        print_plan(&config);
        return Ok(());
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received interrupt, finishing in-flight tiles");
            println!("Interrupted, stopping... (press Ctrl-C again to exit immediately)");
            interrupt.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received second interrupt, exiting");
            std::process::exit(130);
        }
    });

    let run_report = download_tiles(&client, &config, &cancel).await?;
    let failed = run_report.total_failed();
    if failed > 0 {
        println!(
            "{} tiles failed, see {} and re-run to retry them",
            failed,
            config.output_dir.join(report::REPORT_FILE_NAME).display()
        );
    }
    Ok(())
}
