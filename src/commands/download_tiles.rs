use anyhow::Result;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::Config;
use crate::dispatcher::run_zoom_level;
use crate::report::RunReport;
use crate::tile::plan_tiles;

/// Downloads every configured zoom level in order, one level at a time,
/// then writes `report.json` into the output directory.
pub async fn download_tiles(
    client: &Client,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<RunReport> {
    let mut report = RunReport::new();
    for &zoom in &config.zoom_levels {
        if cancel.is_cancelled() {
            warn!(zoom, "cancelled, not starting zoom level");
            break;
        }
        let range = plan_tiles(&config.bounding_box, zoom);
        info!(
            zoom,
            min_x = range.min_x,
            min_y = range.min_y,
            max_x = range.max_x,
            max_y = range.max_y,
            tiles = range.len(),
            "processing zoom level"
        );
        if range.is_empty() {
            warn!(zoom, "bounding box covers no tiles at this zoom level");
        }
        println!("Processing zoom level {}...", zoom);
        let results = run_zoom_level(
            client,
            &config.url_template,
            &config.output_dir,
            range.tiles().collect(),
            config.concurrency,
            cancel,
        )
        .instrument(info_span!("zoom", zoom))
        .await;
        let summary = report.record_zoom(zoom, range.len(), &results);
        println!("{}", summary);
    }
    report.finish(cancel.is_cancelled());
    report.write(&config.output_dir)?;
    Ok(report)
}
