// CSV output sink. One run writes three files (summary, comments, danmaku)
// sharing a label + timestamp suffix so batches sort together.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bilicover_common::{CommentRecord, DanmakuRecord, VideoSummary};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

pub struct CsvStore {
    out_dir: PathBuf,
}

impl CsvStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write all three result files, creating the output directory if
    /// needed. Returns the paths written, summary first.
    pub fn write_all(
        &self,
        label: &str,
        summaries: &[VideoSummary],
        comments: &[CommentRecord],
        danmaku: &[DanmakuRecord],
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let safe_label = label.replace(' ', "_");

        let summary_path = self
            .out_dir
            .join(format!("bili_covers_summary_{safe_label}_{stamp}.csv"));
        let comments_path = self
            .out_dir
            .join(format!("bili_covers_comments_{safe_label}_{stamp}.csv"));
        let danmaku_path = self
            .out_dir
            .join(format!("bili_covers_danmu_{safe_label}_{stamp}.csv"));

        write_rows(&summary_path, summaries)?;
        write_rows(&comments_path, comments)?;
        write_rows(&danmaku_path, danmaku)?;

        info!(
            summaries = summaries.len(),
            comments = comments.len(),
            danmaku = danmaku.len(),
            dir = %self.out_dir.display(),
            "Results written"
        );

        Ok(vec![summary_path, comments_path, danmaku_path])
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
