use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::fetcher::FetchResult;
use crate::tile::TileCoord;

pub const REPORT_FILE_NAME: &str = "report.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ZoomSummary {
    pub zoom: u8,
    pub planned: u64,
    pub skipped: u64,
    pub downloaded: u64,
    pub failed: u64,
}

impl Display for ZoomSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zoom {:>2}: {} planned, {} downloaded, {} skipped, {} failed",
            self.zoom, self.planned, self.downloaded, self.skipped, self.failed
        )
    }
}

/// Enough to retry a tile by hand or from a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTile {
    #[serde(flatten)]
    pub tile: TileCoord,
    pub quadkey: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cancelled: bool,
    pub zooms: Vec<ZoomSummary>,
    pub failed_tiles: Vec<FailedTile>,
}

impl RunReport {
    pub fn new() -> Self {
        RunReport {
            started_at: Utc::now(),
            finished_at: None,
            cancelled: false,
            zooms: Vec::new(),
            failed_tiles: Vec::new(),
        }
    }

    /// Tallies one zoom level's results and keeps its failures.
    pub fn record_zoom(
        &mut self,
        zoom: u8,
        planned: u64,
        results: &[(TileCoord, FetchResult)],
    ) -> &ZoomSummary {
        let mut summary = ZoomSummary {
            zoom,
            planned,
            ..ZoomSummary::default()
        };
        for (tile, result) in results {
            match result {
                FetchResult::Skipped => summary.skipped += 1,
                FetchResult::Downloaded => summary.downloaded += 1,
                FetchResult::Failed(err) => {
                    summary.failed += 1;
                    self.failed_tiles.push(FailedTile {
                        tile: *tile,
                        quadkey: tile.quadkey(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        info!(
            zoom,
            planned,
            skipped = summary.skipped,
            downloaded = summary.downloaded,
            failed = summary.failed,
            "finished zoom level"
        );
        self.zooms.push(summary);
        &self.zooms[self.zooms.len() - 1]
    }

    pub fn total_failed(&self) -> u64 {
        self.zooms.iter().map(|zoom| zoom.failed).sum()
    }

    pub fn finish(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
        self.finished_at = Some(Utc::now());
    }

    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(REPORT_FILE_NAME);
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        write!(file, "{}", serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), failed = self.failed_tiles.len(), "wrote run report");
        Ok(path)
    }
}
