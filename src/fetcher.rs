use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::tile::TileCoord;

pub const TILE_EXTENSION: &str = "jpg";

#[derive(Debug)]
pub enum FetchError {
    Transport(reqwest::Error),
    Status(StatusCode),
    Filesystem(std::io::Error),
    Cancelled,
}

impl Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(err) => write!(f, "transport error: {}", err),
            FetchError::Status(status) => write!(f, "server responded with {}", status),
            FetchError::Filesystem(err) => write!(f, "filesystem error: {}", err),
            FetchError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(err) => Some(err),
            FetchError::Filesystem(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Filesystem(err)
    }
}

#[derive(Debug)]
pub enum FetchResult {
    Skipped,
    Downloaded,
    Failed(FetchError),
}

/// `<output_dir>/<zoom>/<x>/<y>.jpg`
pub fn tile_path(output_dir: &Path, coord: &TileCoord) -> PathBuf {
    output_dir
        .join(coord.zoom.to_string())
        .join(coord.x.to_string())
        .join(format!("{}.{}", coord.y, TILE_EXTENSION))
}

pub fn tile_url(url_template: &str, quadkey: &str) -> String {
    url_template.replace("{quadkey}", quadkey)
}

/// Downloads one tile unless it is already on disk.
///
/// The body is streamed into a temporary file next to the destination and
/// only renamed onto `<y>.jpg` once complete, so an interrupted or failed
/// download never leaves a file that a later run would skip.
#[instrument(level = "debug", skip(client, url_template, coord, output_dir), fields(tile = %coord))]
pub async fn fetch(
    client: &Client,
    url_template: &str,
    coord: TileCoord,
    output_dir: &Path,
) -> FetchResult {
    match try_fetch(client, url_template, coord, output_dir).await {
        Ok(result) => result,
        Err(err) => FetchResult::Failed(err),
    }
}

async fn try_fetch(
    client: &Client,
    url_template: &str,
    coord: TileCoord,
    output_dir: &Path,
) -> Result<FetchResult, FetchError> {
    let quadkey = coord.quadkey();
    let path = tile_path(output_dir, &coord);
    let dir = path
        .parent()
        .expect("tile path always has a zoom/x parent directory");
    // create_dir_all succeeds when another worker created the directory first
    tokio::fs::create_dir_all(dir).await?;

    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {
            debug!(path = %path.display(), "tile already on disk, skipping");
            return Ok(FetchResult::Skipped);
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(FetchError::Filesystem(err)),
    }

    let res = client.get(tile_url(url_template, &quadkey)).send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let temp = NamedTempFile::new_in(dir)?;
    let mut file = File::from_std(temp.reopen()?);

    // Body errors stay Transport, write errors stay Filesystem.
    let mut byte_stream = res.bytes_stream();
    let mut bytes = 0;
    while let Some(chunk) = byte_stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bytes += chunk.len();
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    temp.persist(&path).map_err(|err| err.error)?;
    debug!(%quadkey, bytes, path = %path.display(), "downloaded tile");
    Ok(FetchResult::Downloaded)
}
