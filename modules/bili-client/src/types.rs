use serde::Deserialize;

/// Wrapper for Bilibili API responses. A non-zero `code` is an API-level
/// error (rate limiting, permission denial); `data` may be absent even on
/// success when there is nothing left to return.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// Pagination state returned by the cursor-based comment endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Cursor {
    #[serde(default)]
    pub is_end: bool,
    #[serde(default)]
    pub next: u64,
}

/// `data` object of `/x/v2/reply/main`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMainData {
    pub cursor: Option<Cursor>,
    pub top_replies: Option<Vec<ReplyItem>>,
    pub replies: Option<Vec<ReplyItem>>,
}

impl ReplyMainData {
    /// Whether the walk has reached the last page. A missing cursor block
    /// counts as the end.
    pub fn is_end(&self) -> bool {
        self.cursor.as_ref().map_or(true, |c| c.is_end)
    }

    /// Cursor for the next page, 0 when absent.
    pub fn next_cursor(&self) -> u64 {
        self.cursor.as_ref().map_or(0, |c| c.next)
    }
}

/// `data` object of `/x/v2/reply/reply` and the legacy `/x/v2/reply`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyPageData {
    pub replies: Option<Vec<ReplyItem>>,
}

impl ReplyPageData {
    pub fn into_replies(self) -> Vec<ReplyItem> {
        self.replies.unwrap_or_default()
    }
}

/// A single comment as returned by every reply endpoint. Nested replies the
/// API chose to inline arrive in `replies`; `rcount` is the declared total.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyItem {
    pub rpid: u64,
    #[serde(default)]
    pub rcount: u64,
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub ctime: i64,
    pub content: Option<ReplyContent>,
    pub member: Option<ReplyMember>,
    pub replies: Option<Vec<ReplyItem>>,
}

impl ReplyItem {
    pub fn message(&self) -> &str {
        self.content.as_ref().map_or("", |c| c.message.as_str())
    }

    pub fn inline_replies(&self) -> &[ReplyItem] {
        self.replies.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyContent {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMember {
    pub mid: Option<u64>,
    pub uname: Option<String>,
}

/// `data` object of `/x/web-interface/view`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoViewData {
    pub aid: u64,
    pub bvid: String,
    pub cid: Option<u64>,
    pub pages: Option<Vec<VideoPage>>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pubdate: i64,
    #[serde(default)]
    pub stat: VideoStat,
}

impl VideoViewData {
    /// Content ids of every part of the video. Multi-part videos list them
    /// under `pages`; single-part videos may only carry the top-level `cid`.
    pub fn cids(&self) -> Vec<u64> {
        match self.pages.as_deref() {
            Some(pages) if !pages.is_empty() => pages.iter().map(|p| p.cid).collect(),
            _ => self.cid.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoPage {
    pub cid: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoStat {
    #[serde(default)]
    pub view: u64,
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub coin: u64,
    #[serde(default)]
    pub favorite: u64,
    #[serde(default)]
    pub share: u64,
    #[serde(default)]
    pub danmaku: u64,
    #[serde(default)]
    pub reply: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_data_with_cursor_and_replies() {
        let data: ReplyMainData = serde_json::from_str(
            r#"{
                "cursor": { "is_end": false, "next": 12345 },
                "top_replies": [{ "rpid": 1, "rcount": 0, "like": 3, "ctime": 1700000000,
                                  "content": { "message": "pinned" },
                                  "member": { "mid": 42, "uname": "up" } }],
                "replies": [{ "rpid": 2, "content": { "message": "hi" } }]
            }"#,
        )
        .expect("invalid test JSON");

        assert!(!data.is_end());
        assert_eq!(data.next_cursor(), 12345);
        let top = data.top_replies.as_deref().unwrap();
        assert_eq!(top[0].message(), "pinned");
        assert_eq!(top[0].member.as_ref().unwrap().mid, Some(42));
        assert!(data.replies.as_deref().unwrap()[0].inline_replies().is_empty());
    }

    #[test]
    fn missing_cursor_counts_as_end() {
        let data: ReplyMainData =
            serde_json::from_str(r#"{ "replies": [] }"#).expect("invalid test JSON");
        assert!(data.is_end());
        assert_eq!(data.next_cursor(), 0);
    }

    #[test]
    fn null_replies_decode_as_empty() {
        let data: ReplyPageData =
            serde_json::from_str(r#"{ "replies": null }"#).expect("invalid test JSON");
        assert!(data.into_replies().is_empty());
    }

    #[test]
    fn view_data_prefers_pages_for_cids() {
        let view: VideoViewData = serde_json::from_str(
            r#"{
                "aid": 99, "bvid": "BV1xx411c7mD", "cid": 1,
                "pages": [{ "cid": 10 }, { "cid": 11 }],
                "title": "t", "pubdate": 1700000000,
                "stat": { "view": 5, "reply": 2 }
            }"#,
        )
        .expect("invalid test JSON");
        assert_eq!(view.cids(), vec![10, 11]);
    }

    #[test]
    fn view_data_falls_back_to_single_cid() {
        let view: VideoViewData = serde_json::from_str(
            r#"{ "aid": 99, "bvid": "BV1xx411c7mD", "cid": 7, "title": "t" }"#,
        )
        .expect("invalid test JSON");
        assert_eq!(view.cids(), vec![7]);
    }

    #[test]
    fn envelope_with_error_code_and_no_data() {
        let env: ApiEnvelope<ReplyMainData> =
            serde_json::from_str(r#"{ "code": -412, "message": "request was blocked" }"#)
                .expect("invalid test JSON");
        assert_eq!(env.code, -412);
        assert!(env.data.is_none());
    }
}
