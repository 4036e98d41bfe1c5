//! Fallback and failure-outcome tests: the legacy page-numbered walk, and
//! the distinction between "every request failed" and "nothing to fetch".

use bilicover_common::VideoKey;
use bilicover_harvest::comments::{
    CommentHarvester, Harvest, HarvestOptions, HarvestOutcome, LEGACY_FALLBACK_CAP,
};
use bilicover_harvest::pacing::Pacer;
use bilicover_harvest::testing::{main_page, reply, MockCommentApi};

fn key() -> VideoKey {
    VideoKey {
        aid: 170001,
        bvid: "BV1xx411c7mD".to_string(),
    }
}

fn options(limit: usize) -> HarvestOptions {
    HarvestOptions {
        limit,
        mode: 3,
        expand_replies: true,
    }
}

async fn collect(api: &MockCommentApi, options: HarvestOptions) -> Harvest {
    let pacer = Pacer::none();
    CommentHarvester::new(api, &pacer, options)
        .collect(&key())
        .await
}

fn legacy_page(base_rpid: u64, count: u64) -> Vec<bili_client::ReplyItem> {
    (base_rpid..base_rpid + count)
        .map(|i| reply(i, "recovered"))
        .collect()
}

// ---------------------------------------------------------------------------
// Legacy fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_primary_falls_back_to_legacy_endpoint() {
    let api = MockCommentApi::new()
        .fail_all_main()
        .on_legacy(1, legacy_page(1, 10))
        .on_legacy(2, legacy_page(11, 10));

    let harvest = collect(&api, options(100)).await;

    assert_eq!(harvest.records.len(), 20);
    assert!(harvest
        .records
        .iter()
        .all(|r| !r.pinned && r.root.is_none()));
    assert_eq!(harvest.outcome, HarvestOutcome::Fallback);
    assert_eq!(api.legacy_calls(), 3, "two full pages plus the empty one");
}

#[tokio::test]
async fn empty_primary_also_tries_legacy() {
    // The primary endpoint answers fine but has nothing; the walk still
    // gives the legacy endpoint one chance, as the source behavior did.
    let api = MockCommentApi::new()
        .on_main(0, main_page(true, 0, vec![], vec![]))
        .on_legacy(1, legacy_page(1, 4));

    let harvest = collect(&api, options(100)).await;

    assert_eq!(harvest.records.len(), 4);
    assert_eq!(harvest.outcome, HarvestOutcome::Fallback);
}

#[tokio::test]
async fn fallback_respects_the_requested_limit() {
    let api = MockCommentApi::new()
        .fail_all_main()
        .on_legacy(1, legacy_page(1, 10))
        .on_legacy(2, legacy_page(11, 10))
        .on_legacy(3, legacy_page(21, 10));

    let harvest = collect(&api, options(15)).await;

    assert_eq!(harvest.records.len(), 15);
    assert_eq!(harvest.outcome, HarvestOutcome::Fallback);
    assert_eq!(api.legacy_calls(), 2, "stops mid-walk once capped");
}

#[test]
fn fallback_cap_is_below_the_default_limit() {
    // The degraded mode recovers at most this many records however large
    // the requested limit is.
    assert_eq!(LEGACY_FALLBACK_CAP, 1000);
    assert!(LEGACY_FALLBACK_CAP < HarvestOptions::default().limit);
}

// ---------------------------------------------------------------------------
// Failure outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mid_walk_failure_returns_partial_records_as_aborted() {
    let api = MockCommentApi::new()
        .on_main(
            0,
            main_page(false, 55, vec![], vec![reply(1, "a"), reply(2, "b")]),
        )
        .fail_main_at(55);

    let harvest = collect(&api, options(100)).await;

    assert_eq!(harvest.records.len(), 2);
    assert_eq!(harvest.outcome, HarvestOutcome::Aborted);
    assert_eq!(
        api.legacy_calls(),
        0,
        "fallback is only for a walk that produced nothing"
    );
}

#[tokio::test]
async fn genuinely_empty_section_reads_complete_not_aborted() {
    let api = MockCommentApi::new().on_main(0, main_page(true, 0, vec![], vec![]));

    let harvest = collect(&api, options(100)).await;

    assert!(harvest.records.is_empty());
    assert_eq!(harvest.outcome, HarvestOutcome::Complete);
}

#[tokio::test]
async fn total_failure_reads_aborted_with_no_records() {
    let api = MockCommentApi::new().fail_all_main();

    let harvest = collect(&api, options(100)).await;

    assert!(harvest.records.is_empty());
    assert_eq!(harvest.outcome, HarvestOutcome::Aborted);
    assert_eq!(api.legacy_calls(), 1, "legacy endpoint was given a chance");
}
