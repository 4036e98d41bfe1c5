// Test mocks for the comment walk.
//
// MockCommentApi matches the CommentApi boundary: scripted cursor pages,
// nested-reply pages, and legacy pages served out of HashMaps, plus
// request counters so tests can assert how many calls a walk made.
// Builder pattern: `.on_main()`, `.fail_main_at()`, `.on_nested()`,
// `.on_legacy()`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use bili_client::{BiliError, Cursor, ReplyContent, ReplyItem, ReplyMainData, ReplyMember, Result};

use crate::traits::CommentApi;

pub struct MockCommentApi {
    main_pages: HashMap<u64, ReplyMainData>,
    nested_pages: HashMap<(u64, u32), Vec<ReplyItem>>,
    legacy_pages: HashMap<u32, Vec<ReplyItem>>,
    failing_cursors: HashSet<u64>,
    fail_all_main: bool,
    main_count: AtomicU32,
    nested_count: AtomicU32,
    legacy_count: AtomicU32,
}

impl MockCommentApi {
    pub fn new() -> Self {
        Self {
            main_pages: HashMap::new(),
            nested_pages: HashMap::new(),
            legacy_pages: HashMap::new(),
            failing_cursors: HashSet::new(),
            fail_all_main: false,
            main_count: AtomicU32::new(0),
            nested_count: AtomicU32::new(0),
            legacy_count: AtomicU32::new(0),
        }
    }

    pub fn on_main(mut self, cursor: u64, page: ReplyMainData) -> Self {
        self.main_pages.insert(cursor, page);
        self
    }

    /// The main endpoint fails (after its retries, from the walk's point of
    /// view) when asked for this cursor.
    pub fn fail_main_at(mut self, cursor: u64) -> Self {
        self.failing_cursors.insert(cursor);
        self
    }

    /// Every main-endpoint request fails.
    pub fn fail_all_main(mut self) -> Self {
        self.fail_all_main = true;
        self
    }

    pub fn on_nested(mut self, root: u64, pn: u32, replies: Vec<ReplyItem>) -> Self {
        self.nested_pages.insert((root, pn), replies);
        self
    }

    pub fn on_legacy(mut self, pn: u32, replies: Vec<ReplyItem>) -> Self {
        self.legacy_pages.insert(pn, replies);
        self
    }

    pub fn main_calls(&self) -> u32 {
        self.main_count.load(Ordering::Relaxed)
    }

    pub fn nested_calls(&self) -> u32 {
        self.nested_count.load(Ordering::Relaxed)
    }

    pub fn legacy_calls(&self) -> u32 {
        self.legacy_count.load(Ordering::Relaxed)
    }
}

impl Default for MockCommentApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentApi for MockCommentApi {
    async fn main_page(
        &self,
        _aid: u64,
        _bvid: &str,
        _mode: u8,
        cursor: u64,
    ) -> Result<Option<ReplyMainData>> {
        self.main_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_all_main || self.failing_cursors.contains(&cursor) {
            return Err(BiliError::Api {
                code: -412,
                message: "request was blocked".to_string(),
            });
        }
        Ok(self.main_pages.get(&cursor).cloned())
    }

    async fn nested_page(
        &self,
        _aid: u64,
        _bvid: &str,
        root: u64,
        pn: u32,
        _mode: u8,
    ) -> Result<Vec<ReplyItem>> {
        self.nested_count.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .nested_pages
            .get(&(root, pn))
            .cloned()
            .unwrap_or_default())
    }

    async fn legacy_page(&self, _aid: u64, _bvid: &str, pn: u32) -> Result<Vec<ReplyItem>> {
        self.legacy_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.legacy_pages.get(&pn).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Fixture constructors
// ---------------------------------------------------------------------------

/// A bare comment with no nested replies declared.
pub fn reply(rpid: u64, message: &str) -> ReplyItem {
    ReplyItem {
        rpid,
        rcount: 0,
        like: 0,
        ctime: 1700000000,
        content: Some(ReplyContent {
            message: message.to_string(),
        }),
        member: Some(ReplyMember {
            mid: Some(100 + rpid),
            uname: Some(format!("user{rpid}")),
        }),
        replies: None,
    }
}

/// A comment declaring `rcount` total replies, `inline` of them carried in
/// the payload.
pub fn reply_with_children(
    rpid: u64,
    message: &str,
    rcount: u64,
    inline: Vec<ReplyItem>,
) -> ReplyItem {
    ReplyItem {
        rcount,
        replies: Some(inline),
        ..reply(rpid, message)
    }
}

/// One cursor page of the primary endpoint.
pub fn main_page(
    is_end: bool,
    next: u64,
    top: Vec<ReplyItem>,
    ordinary: Vec<ReplyItem>,
) -> ReplyMainData {
    ReplyMainData {
        cursor: Some(Cursor { is_end, next }),
        top_replies: Some(top),
        replies: Some(ordinary),
    }
}
