// Video metadata: view-endpoint lookup, publication-window filtering, and
// sampling of the candidate list down to a study-sized set.

use bili_client::BiliClient;
use bilicover_common::VideoSummary;
use chrono::{DateTime, NaiveDate};
use rand::seq::SliceRandom;
use tracing::warn;

pub struct MetadataService<'a> {
    client: &'a BiliClient,
}

impl<'a> MetadataService<'a> {
    pub fn new(client: &'a BiliClient) -> Self {
        Self { client }
    }

    /// Look up one video's metadata. `None` when the API has nothing for
    /// the bvid (deleted or region-locked videos) or the lookup failed;
    /// the candidate is simply skipped either way.
    pub async fn summary(&self, bvid: &str) -> Option<VideoSummary> {
        let view = match self.client.video_view(bvid).await {
            Ok(Some(view)) => view,
            Ok(None) => {
                warn!(bvid, "view endpoint returned no data, skipping");
                return None;
            }
            Err(e) => {
                warn!(bvid, error = %e, "view lookup failed, skipping");
                return None;
            }
        };

        let cids = view.cids();
        let url = format!("https://www.bilibili.com/video/{}", view.bvid);
        Some(VideoSummary {
            aid: view.aid,
            title: view.title,
            pubdate: DateTime::from_timestamp(view.pubdate, 0).unwrap_or_default(),
            view: view.stat.view,
            like: view.stat.like,
            coin: view.stat.coin,
            favorite: view.stat.favorite,
            share: view.stat.share,
            danmaku: view.stat.danmaku,
            reply_count: view.stat.reply,
            cids,
            url,
            bvid: view.bvid,
        })
    }
}

/// Keep summaries published inside the `[start, end]` window (inclusive).
pub fn within_window(
    summaries: Vec<VideoSummary>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<VideoSummary> {
    summaries
        .into_iter()
        .filter(|s| {
            let day = s.pubdate.date_naive();
            day >= start && day <= end
        })
        .collect()
}

/// Randomly sample the candidate list down to `target`; smaller lists pass
/// through untouched.
pub fn sample_videos(mut summaries: Vec<VideoSummary>, target: usize) -> Vec<VideoSummary> {
    if summaries.len() > target {
        summaries.shuffle(&mut rand::rng());
        summaries.truncate(target);
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary(bvid: &str, pubdate: &str) -> VideoSummary {
        let day = NaiveDate::parse_from_str(pubdate, "%Y-%m-%d").expect("invalid test date");
        VideoSummary {
            bvid: bvid.to_string(),
            aid: 1,
            title: "t".to_string(),
            pubdate: Utc
                .from_utc_datetime(&day.and_hms_opt(12, 0, 0).expect("invalid test time")),
            view: 0,
            like: 0,
            coin: 0,
            favorite: 0,
            share: 0,
            danmaku: 0,
            reply_count: 0,
            cids: vec![1],
            url: String::new(),
        }
    }

    fn window(start: &str, end: &str) -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::parse_from_str(start, "%Y-%m-%d").expect("invalid test date"),
            NaiveDate::parse_from_str(end, "%Y-%m-%d").expect("invalid test date"),
        )
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let (start, end) = window("2023-01-01", "2023-12-31");
        let kept = within_window(
            vec![
                summary("a", "2022-12-31"),
                summary("b", "2023-01-01"),
                summary("c", "2023-06-15"),
                summary("d", "2023-12-31"),
                summary("e", "2024-01-01"),
            ],
            start,
            end,
        );
        let bvids: Vec<_> = kept.iter().map(|s| s.bvid.as_str()).collect();
        assert_eq!(bvids, vec!["b", "c", "d"]);
    }

    #[test]
    fn sampling_caps_at_target() {
        let candidates: Vec<_> = (0..25)
            .map(|i| summary(&format!("BV{i}"), "2023-06-01"))
            .collect();
        assert_eq!(sample_videos(candidates, 10).len(), 10);
    }

    #[test]
    fn sampling_passes_small_lists_through() {
        let candidates = vec![summary("a", "2023-06-01"), summary("b", "2023-06-01")];
        let sampled = sample_videos(candidates, 10);
        assert_eq!(sampled.len(), 2);
    }
}
