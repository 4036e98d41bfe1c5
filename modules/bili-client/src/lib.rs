pub mod error;
pub mod retry;
pub mod types;

pub use error::{BiliError, Result};
pub use retry::RetryPolicy;
pub use types::{
    ApiEnvelope, Cursor, ReplyContent, ReplyItem, ReplyMainData, ReplyMember, ReplyPageData,
    VideoStat, VideoViewData,
};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.bilibili.com";
const DANMAKU_BASE: &str = "https://comment.bilibili.com";
const SITE: &str = "https://www.bilibili.com";

/// Several endpoints reject requests without a browser-looking User-Agent.
const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

/// Comment-area content type for videos.
const COMMENT_AREA_VIDEO: u32 = 1;

/// Page size of the nested-reply endpoint.
pub const NESTED_PAGE_SIZE: u32 = 49;
/// Page size of the legacy comment endpoint.
pub const LEGACY_PAGE_SIZE: u32 = 20;
/// Fixed sort value the legacy endpoint is queried with.
const LEGACY_SORT: u32 = 2;

/// Bilibili REST client. The session cookie is an explicit constructor
/// value attached verbatim as the `Cookie` header; without one, endpoints
/// that require a login return restricted or empty results rather than
/// failing.
pub struct BiliClient {
    client: reqwest::Client,
    cookie: Option<String>,
    retry: RetryPolicy,
    nested_retry: RetryPolicy,
    danmaku_retry: RetryPolicy,
}

impl BiliClient {
    pub fn new(cookie: Option<String>) -> Self {
        Self::with_policies(
            cookie,
            RetryPolicy::main_walk(),
            RetryPolicy::nested_walk(),
            RetryPolicy::danmaku(),
        )
    }

    pub fn with_policies(
        cookie: Option<String>,
        retry: RetryPolicy,
        nested_retry: RetryPolicy,
        danmaku_retry: RetryPolicy,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            cookie,
            retry,
            nested_retry,
            danmaku_retry,
        }
    }

    /// One page of top-level comments from the cursor-based endpoint.
    /// `Ok(None)` means the endpoint answered but had no data object left.
    pub async fn reply_main(
        &self,
        aid: u64,
        bvid: &str,
        mode: u8,
        cursor: u64,
    ) -> Result<Option<ReplyMainData>> {
        let url = format!("{API_BASE}/x/v2/reply/main");
        let query = [
            ("type", COMMENT_AREA_VIDEO.to_string()),
            ("oid", aid.to_string()),
            ("mode", mode.to_string()),
            ("next", cursor.to_string()),
        ];
        self.get_json(&url, &query, &video_referer(bvid), &self.retry)
            .await
    }

    /// One page of nested replies under `root`. Pages are numbered from 1
    /// with a fixed size of [`NESTED_PAGE_SIZE`].
    pub async fn reply_replies(
        &self,
        aid: u64,
        bvid: &str,
        root: u64,
        pn: u32,
        mode: u8,
    ) -> Result<Vec<ReplyItem>> {
        let url = format!("{API_BASE}/x/v2/reply/reply");
        let query = [
            ("type", COMMENT_AREA_VIDEO.to_string()),
            ("oid", aid.to_string()),
            ("root", root.to_string()),
            ("pn", pn.to_string()),
            ("ps", NESTED_PAGE_SIZE.to_string()),
            ("mode", mode.to_string()),
        ];
        let data: Option<ReplyPageData> = self
            .get_json(&url, &query, &video_referer(bvid), &self.nested_retry)
            .await?;
        Ok(data.map(ReplyPageData::into_replies).unwrap_or_default())
    }

    /// One page of the legacy page-numbered comment endpoint. No retries:
    /// the fallback walk treats any failure as the end of the road.
    pub async fn reply_legacy(&self, aid: u64, bvid: &str, pn: u32) -> Result<Vec<ReplyItem>> {
        let url = format!("{API_BASE}/x/v2/reply");
        let query = [
            ("type", COMMENT_AREA_VIDEO.to_string()),
            ("oid", aid.to_string()),
            ("pn", pn.to_string()),
            ("ps", LEGACY_PAGE_SIZE.to_string()),
            ("sort", LEGACY_SORT.to_string()),
        ];
        let data: Option<ReplyPageData> = self
            .get_json(&url, &query, &video_referer(bvid), &RetryPolicy::once())
            .await?;
        Ok(data.map(ReplyPageData::into_replies).unwrap_or_default())
    }

    /// Video metadata (title, publication date, stats, content ids).
    pub async fn video_view(&self, bvid: &str) -> Result<Option<VideoViewData>> {
        let url = format!("{API_BASE}/x/web-interface/view");
        let query = [("bvid", bvid.to_string())];
        self.get_json(&url, &query, &format!("{SITE}/"), &RetryPolicy::once())
            .await
    }

    /// Raw danmaku XML from the public per-cid document.
    pub async fn danmaku_xml(&self, cid: u64, bvid: &str) -> Result<String> {
        let url = format!("{DANMAKU_BASE}/{cid}.xml");
        self.get_xml(&url, &[], &video_referer(bvid), true).await
    }

    /// Raw danmaku XML from the legacy `list.so` endpoint. The cookie is
    /// deliberately omitted here; the endpoint is sensitive to it.
    pub async fn danmaku_legacy(&self, cid: u64, bvid: &str) -> Result<String> {
        let url = format!("{API_BASE}/x/v1/dm/list.so");
        let query = [("oid", cid.to_string())];
        self.get_xml(&url, &query, &video_referer(bvid), false).await
    }

    /// Shared JSON envelope fetch with retry. Transport failures and
    /// non-zero API codes are retried identically; exhausting the policy
    /// returns the last error so callers can tell a failed fetch from an
    /// empty result.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
        policy: &RetryPolicy,
    ) -> Result<Option<T>> {
        let mut last_err = BiliError::Network("no attempt made".to_string());
        for attempt in 1..=policy.max_attempts {
            match self.get_json_once(url, query, referer).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        "bilibili api request failed"
                    );
                    last_err = e;
                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.delay_after(attempt)).await;
                    }
                }
            }
        }
        Err(last_err)
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<Option<T>> {
        debug!(url, "bilibili api request");

        let mut req = self
            .client
            .get(url)
            .query(query)
            .header(REFERER, referer)
            .header(ORIGIN, SITE)
            .header(ACCEPT, "application/json, text/plain, */*");
        if let Some(ref cookie) = self.cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BiliError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = resp.json().await?;
        if envelope.code != 0 {
            return Err(BiliError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope.data)
    }

    /// Raw XML fetch with the danmaku retry policy. Success means a 200
    /// whose body actually looks like a danmaku document.
    async fn get_xml(
        &self,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
        with_cookie: bool,
    ) -> Result<String> {
        let mut last_err = BiliError::Network("no attempt made".to_string());
        for attempt in 1..=self.danmaku_retry.max_attempts {
            match self.get_xml_once(url, query, referer, with_cookie).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.danmaku_retry.max_attempts,
                        error = %e,
                        "danmaku request failed"
                    );
                    last_err = e;
                    if attempt < self.danmaku_retry.max_attempts {
                        tokio::time::sleep(self.danmaku_retry.delay_after(attempt)).await;
                    }
                }
            }
        }
        Err(last_err)
    }

    async fn get_xml_once(
        &self,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
        with_cookie: bool,
    ) -> Result<String> {
        debug!(url, "danmaku request");

        let mut req = self
            .client
            .get(url)
            .header(REFERER, referer)
            .header(ACCEPT, "application/xml,text/xml;q=0.9,*/*;q=0.8");
        if !query.is_empty() {
            req = req.query(query);
        }
        if with_cookie {
            if let Some(ref cookie) = self.cookie {
                req = req.header(reqwest::header::COOKIE, cookie);
            }
        }

        let resp = req.send().await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = resp.text().await?;

        if status.is_success() && (content_type.contains("xml") || body.contains("<d p=")) {
            Ok(body)
        } else {
            Err(BiliError::Http {
                status: status.as_u16(),
                message: format!("unexpected danmaku response (content-type: {content_type})"),
            })
        }
    }
}

fn video_referer(bvid: &str) -> String {
    format!("{SITE}/video/{bvid}/")
}
