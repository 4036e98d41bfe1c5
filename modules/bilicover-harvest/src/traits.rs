// Trait abstraction over the comment endpoints.
//
// CommentApi is the seam between the pagination walk and the live client:
// the harvester only ever sees these three calls, so tests drive it with
// MockCommentApi instead. Scripted pages, no network.

use async_trait::async_trait;
use bili_client::{BiliClient, ReplyItem, ReplyMainData, Result};

#[async_trait]
pub trait CommentApi: Send + Sync {
    /// One cursor page of top-level comments. `Ok(None)` means the endpoint
    /// answered but had no data object left to serve.
    async fn main_page(
        &self,
        aid: u64,
        bvid: &str,
        mode: u8,
        cursor: u64,
    ) -> Result<Option<ReplyMainData>>;

    /// One page of nested replies under `root`, numbered from 1.
    async fn nested_page(
        &self,
        aid: u64,
        bvid: &str,
        root: u64,
        pn: u32,
        mode: u8,
    ) -> Result<Vec<ReplyItem>>;

    /// One page of the legacy page-numbered endpoint.
    async fn legacy_page(&self, aid: u64, bvid: &str, pn: u32) -> Result<Vec<ReplyItem>>;
}

#[async_trait]
impl CommentApi for BiliClient {
    async fn main_page(
        &self,
        aid: u64,
        bvid: &str,
        mode: u8,
        cursor: u64,
    ) -> Result<Option<ReplyMainData>> {
        self.reply_main(aid, bvid, mode, cursor).await
    }

    async fn nested_page(
        &self,
        aid: u64,
        bvid: &str,
        root: u64,
        pn: u32,
        mode: u8,
    ) -> Result<Vec<ReplyItem>> {
        self.reply_replies(aid, bvid, root, pn, mode).await
    }

    async fn legacy_page(&self, aid: u64, bvid: &str, pn: u32) -> Result<Vec<ReplyItem>> {
        self.reply_legacy(aid, bvid, pn).await
    }
}
