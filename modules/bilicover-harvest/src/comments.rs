// Comment harvesting: cursor-based top-level pagination, nested-reply
// expansion, and the legacy page-numbered fallback.

use bili_client::ReplyItem;
use bilicover_common::{CommentRecord, VideoKey};
use chrono::DateTime;
use tracing::{info, warn};

use crate::pacing::Pacer;
use crate::traits::CommentApi;

/// Marker prefixed to nested-reply messages in the flat output.
const NESTING_PREFIX: &str = "↳ ";

/// The legacy fallback stops at this many records regardless of the
/// requested limit. Inherited from the source behavior; kept as an
/// explicit constant rather than inferring anything smarter.
pub const LEGACY_FALLBACK_CAP: usize = 1000;

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Hard cap on returned records.
    pub limit: usize,
    /// Sort mode forwarded to the comment endpoints.
    pub mode: u8,
    /// Page through nested replies beyond what the payload inlines.
    pub expand_replies: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            limit: 5000,
            mode: 3,
            expand_replies: true,
        }
    }
}

/// How a harvest run ended. The record collection is returned whatever the
/// outcome; this tells callers whether it can be read as "everything there
/// was" or as the leftovers of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// The walk reached the endpoint's end-of-results flag.
    Complete,
    /// The requested limit was hit before the end of the data.
    LimitReached,
    /// A page fetch failed after retries; records are partial.
    Aborted,
    /// The primary walk produced nothing; records came from the legacy
    /// endpoint, without pinned or nesting information.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Harvest {
    pub records: Vec<CommentRecord>,
    pub outcome: HarvestOutcome,
}

/// Walks a video's comment section front-to-back in the order the API
/// serves it. Never returns an error: whatever was collected comes back,
/// with the outcome saying how the walk ended.
pub struct CommentHarvester<'a, A: CommentApi> {
    api: &'a A,
    pacer: &'a Pacer,
    options: HarvestOptions,
}

impl<'a, A: CommentApi> CommentHarvester<'a, A> {
    pub fn new(api: &'a A, pacer: &'a Pacer, options: HarvestOptions) -> Self {
        Self {
            api,
            pacer,
            options,
        }
    }

    pub async fn collect(&self, key: &VideoKey) -> Harvest {
        info!(
            bvid = %key.bvid,
            limit = self.options.limit,
            mode = self.options.mode,
            "harvesting comments"
        );

        let mut records = Vec::new();
        let mut cursor = 0u64;
        let mut walk_failed = false;

        while records.len() < self.options.limit {
            let page = match self
                .api
                .main_page(key.aid, &key.bvid, self.options.mode, cursor)
                .await
            {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    warn!(bvid = %key.bvid, cursor, error = %e, "comment page fetch failed, stopping walk");
                    walk_failed = true;
                    break;
                }
            };

            let is_end = page.is_end();
            let next = page.next_cursor();
            let pinned = page.top_replies.unwrap_or_default();
            let ordinary = page.replies.unwrap_or_default();

            // Pinned comments come first within their page.
            for item in &pinned {
                if records.len() >= self.options.limit {
                    break;
                }
                records.push(self.record(key, item, true, None));
                if self.needs_expansion(item) {
                    self.expand_replies(&mut records, key, item.rpid).await;
                }
            }

            for item in &ordinary {
                if records.len() >= self.options.limit {
                    break;
                }
                records.push(self.record(key, item, false, None));
                if self.needs_expansion(item) {
                    // Paging starts over from page 1, so the inlined subset
                    // would be fetched again; take the paged set only.
                    self.expand_replies(&mut records, key, item.rpid).await;
                } else {
                    for sub in item.inline_replies() {
                        records.push(self.record(key, sub, false, Some(item.rpid)));
                        if records.len() >= self.options.limit {
                            break;
                        }
                    }
                }
            }

            if is_end
                || (ordinary.is_empty() && pinned.is_empty())
                || records.len() >= self.options.limit
            {
                break;
            }

            cursor = next;
            self.pacer.cursor_page().await;
        }

        if records.is_empty() {
            let fallback = self.legacy_fallback(key).await;
            if !fallback.is_empty() {
                let mut records = fallback;
                records.truncate(self.options.limit);
                info!(bvid = %key.bvid, count = records.len(), "comment harvest finished via legacy fallback");
                return Harvest {
                    records,
                    outcome: HarvestOutcome::Fallback,
                };
            }
        }

        let outcome = if walk_failed {
            HarvestOutcome::Aborted
        } else if records.len() >= self.options.limit {
            HarvestOutcome::LimitReached
        } else {
            HarvestOutcome::Complete
        };

        records.truncate(self.options.limit);
        info!(
            bvid = %key.bvid,
            count = records.len(),
            outcome = ?outcome,
            "comment harvest finished"
        );
        Harvest { records, outcome }
    }

    /// Whether a comment declares more replies than its payload inlined.
    fn needs_expansion(&self, item: &ReplyItem) -> bool {
        self.options.expand_replies && item.rcount as usize > item.inline_replies().len()
    }

    /// Page through the nested-reply endpoint under `root` until it runs
    /// dry. A failed page terminates this thread only, not the outer walk.
    async fn expand_replies(&self, records: &mut Vec<CommentRecord>, key: &VideoKey, root: u64) {
        let mut pn = 1u32;
        while records.len() < self.options.limit {
            let subs = match self
                .api
                .nested_page(key.aid, &key.bvid, root, pn, self.options.mode)
                .await
            {
                Ok(subs) => subs,
                Err(e) => {
                    warn!(bvid = %key.bvid, root, pn, error = %e, "nested reply page failed, leaving thread");
                    break;
                }
            };
            if subs.is_empty() {
                break;
            }
            for sub in &subs {
                records.push(self.record(key, sub, false, Some(root)));
                if records.len() >= self.options.limit {
                    break;
                }
            }
            pn += 1;
            self.pacer.nested_page().await;
        }
    }

    /// Page-numbered walk of the legacy endpoint. No pinned or nesting
    /// information exists there; every record is a bare top-level comment.
    async fn legacy_fallback(&self, key: &VideoKey) -> Vec<CommentRecord> {
        info!(bvid = %key.bvid, "primary walk yielded nothing, trying legacy endpoint");

        let cap = self.options.limit.min(LEGACY_FALLBACK_CAP);
        let mut records = Vec::new();
        let mut pn = 1u32;

        while records.len() < cap {
            let replies = match self.api.legacy_page(key.aid, &key.bvid, pn).await {
                Ok(replies) => replies,
                Err(e) => {
                    warn!(bvid = %key.bvid, pn, error = %e, "legacy page failed, stopping fallback");
                    break;
                }
            };
            if replies.is_empty() {
                break;
            }
            for item in &replies {
                records.push(self.record(key, item, false, None));
                if records.len() >= cap {
                    break;
                }
            }
            pn += 1;
            self.pacer.legacy_page().await;
        }

        records
    }

    fn record(
        &self,
        key: &VideoKey,
        item: &ReplyItem,
        pinned: bool,
        root: Option<u64>,
    ) -> CommentRecord {
        let message = match root {
            Some(_) => format!("{NESTING_PREFIX}{}", item.message()),
            None => item.message().to_string(),
        };
        CommentRecord {
            bvid: key.bvid.clone(),
            rpid: item.rpid,
            message,
            like: item.like,
            ctime: DateTime::from_timestamp(item.ctime, 0).unwrap_or_default(),
            mid: item.member.as_ref().and_then(|m| m.mid),
            uname: item.member.as_ref().and_then(|m| m.uname.clone()),
            pinned,
            root,
        }
    }
}
