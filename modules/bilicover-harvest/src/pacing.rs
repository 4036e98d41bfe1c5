// Self-imposed pacing between consecutive network calls: randomized sleeps
// that keep the request rate under the platform's anti-scraping radar.
// This is the only concurrency concept in the harvester.

use std::ops::Range;
use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Pacer {
    enabled: bool,
}

impl Pacer {
    pub fn standard() -> Self {
        Self { enabled: true }
    }

    /// No delays at all. For tests and dry runs.
    pub fn none() -> Self {
        Self { enabled: false }
    }

    /// Between consecutive cursor pages of the top-level comment walk.
    pub async fn cursor_page(&self) {
        self.rest(1200..2000).await;
    }

    /// Between consecutive pages of a nested-reply thread.
    pub async fn nested_page(&self) {
        self.rest(800..1600).await;
    }

    /// Between consecutive pages of the legacy fallback endpoint.
    pub async fn legacy_page(&self) {
        self.rest(800..1400).await;
    }

    /// After a metadata lookup.
    pub async fn metadata(&self) {
        self.rest(1000..2000).await;
    }

    /// After fetching the danmaku of one cid.
    pub async fn danmaku(&self) {
        self.rest(1200..2000).await;
    }

    /// Between one video and the next.
    pub async fn between_videos(&self) {
        self.rest(1800..3500).await;
    }

    async fn rest(&self, range_ms: Range<u64>) {
        if self.enabled {
            let ms = rand::rng().random_range(range_ms);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::standard()
    }
}
