use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// The two ids Bilibili assigns to the same video. The comment APIs key on
/// the numeric `aid`; page URLs and the view endpoint key on the short
/// alphanumeric `bvid`. Both are required.
#[derive(Debug, Clone, Serialize)]
pub struct VideoKey {
    pub aid: u64,
    pub bvid: String,
}

/// One harvested comment, immutable once appended to a result collection.
/// Nested replies carry a "↳ " prefix on `message` and the parent comment's
/// rpid in `root`; top-level comments have `root = None`.
#[derive(Debug, Clone, Serialize)]
pub struct CommentRecord {
    pub bvid: String,
    pub rpid: u64,
    pub message: String,
    pub like: u64,
    pub ctime: DateTime<Utc>,
    pub mid: Option<u64>,
    pub uname: Option<String>,
    pub pinned: bool,
    pub root: Option<u64>,
}

/// One danmaku line, keyed by the video part it was fired on.
#[derive(Debug, Clone, Serialize)]
pub struct DanmakuRecord {
    pub bvid: String,
    pub cid: u64,
    pub text: String,
}

/// Per-video metadata row from the view endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    pub bvid: String,
    pub aid: u64,
    pub title: String,
    pub pubdate: DateTime<Utc>,
    pub view: u64,
    pub like: u64,
    pub coin: u64,
    pub favorite: u64,
    pub share: u64,
    pub danmaku: u64,
    pub reply_count: u64,
    #[serde(serialize_with = "join_cids")]
    pub cids: Vec<u64>,
    pub url: String,
}

impl VideoSummary {
    pub fn key(&self) -> VideoKey {
        VideoKey {
            aid: self.aid,
            bvid: self.bvid.clone(),
        }
    }
}

/// Multi-part videos have several cids; flat CSV rows hold them "|"-joined.
fn join_cids<S: Serializer>(cids: &[u64], serializer: S) -> Result<S::Ok, S::Error> {
    let joined = cids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("|");
    serializer.serialize_str(&joined)
}
