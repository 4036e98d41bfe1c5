// The harvest run: strictly sequential, one video at a time, pacing
// between every network interaction. Results accumulate in memory and are
// flushed to CSV at the end whatever happened along the way.

use std::path::PathBuf;

use anyhow::Result;
use bili_client::BiliClient;
use bilicover_common::{Config, DanmakuRecord};
use tracing::info;

use crate::comments::{CommentHarvester, HarvestOptions};
use crate::danmaku::{DanmakuFetcher, MAX_DANMAKU_PER_CID};
use crate::metadata::{self, MetadataService};
use crate::pacing::Pacer;
use crate::store::CsvStore;

pub struct RunStats {
    pub videos: usize,
    pub comments: usize,
    pub danmaku: usize,
    pub files: Vec<PathBuf>,
}

pub async fn run(config: &Config, bvids: &[String], expand_replies: bool) -> Result<RunStats> {
    let client = BiliClient::new(config.cookie.clone());
    let pacer = Pacer::standard();

    // Candidate metadata, publication-window filter, study-size sample.
    let service = MetadataService::new(&client);
    let mut candidates = Vec::new();
    for bvid in bvids {
        if let Some(summary) = service.summary(bvid).await {
            candidates.push(summary);
        }
        pacer.metadata().await;
    }
    let in_window = metadata::within_window(candidates, config.window_start, config.window_end);
    let summaries = metadata::sample_videos(in_window, config.target_count);
    info!(count = summaries.len(), "videos selected for harvesting");

    let options = HarvestOptions {
        limit: config.comment_limit,
        mode: config.sort_mode,
        expand_replies,
    };
    let harvester = CommentHarvester::new(&client, &pacer, options);
    let danmaku_fetcher = DanmakuFetcher::new(&client);

    let mut all_comments = Vec::new();
    let mut all_danmaku = Vec::new();

    for summary in &summaries {
        info!(bvid = %summary.bvid, title = %summary.title, "harvesting video");

        for &cid in &summary.cids {
            let lines = danmaku_fetcher.fetch(cid, &summary.bvid).await;
            info!(bvid = %summary.bvid, cid, count = lines.len(), "danmaku fetched");
            all_danmaku.extend(lines.into_iter().take(MAX_DANMAKU_PER_CID).map(|text| {
                DanmakuRecord {
                    bvid: summary.bvid.clone(),
                    cid,
                    text,
                }
            }));
            pacer.danmaku().await;
        }

        let harvest = harvester.collect(&summary.key()).await;
        info!(
            bvid = %summary.bvid,
            count = harvest.records.len(),
            outcome = ?harvest.outcome,
            "comments harvested"
        );
        all_comments.extend(harvest.records);

        pacer.between_videos().await;
    }

    let store = CsvStore::new(&config.output_dir);
    let files = store.write_all(&config.song_label, &summaries, &all_comments, &all_danmaku)?;

    Ok(RunStats {
        videos: summaries.len(),
        comments: all_comments.len(),
        danmaku: all_danmaku.len(),
        files,
    })
}
