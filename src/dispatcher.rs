use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::fetcher::{fetch, FetchError, FetchResult};
use crate::tile::TileCoord;

/// Fetches every tile of one zoom level with at most `concurrency` requests
/// in flight, and returns once all of them have finished.
///
/// Results come back in completion order, one per input tile. A failed tile
/// never stops its siblings. After `cancel` fires no new fetch is started;
/// unstarted and interrupted tiles report `FetchError::Cancelled`.
pub async fn run_zoom_level(
    client: &Client,
    url_template: &str,
    output_dir: &Path,
    coords: Vec<TileCoord>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Vec<(TileCoord, FetchResult)> {
    stream::iter(coords)
        .map(|coord| async move {
            if cancel.is_cancelled() {
                return (coord, FetchResult::Failed(FetchError::Cancelled));
            }
            let result = tokio::select! {
                result = fetch(client, url_template, coord, output_dir) => result,
                _ = cancel.cancelled() => FetchResult::Failed(FetchError::Cancelled),
            };
            match &result {
                FetchResult::Skipped => debug!(tile = %coord, "skipped"),
                FetchResult::Downloaded => debug!(tile = %coord, "downloaded"),
                FetchResult::Failed(FetchError::Cancelled) => {}
                FetchResult::Failed(err) => {
                    warn!(tile = %coord, quadkey = %coord.quadkey(), error = %err, "failed to fetch tile")
                }
            }
            (coord, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}
