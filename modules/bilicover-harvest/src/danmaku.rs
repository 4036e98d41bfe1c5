// Danmaku retrieval: the public per-cid XML document first, the legacy
// list.so endpoint when that keeps failing. Best-effort throughout; a cid
// whose danmaku cannot be fetched contributes nothing.

use bili_client::BiliClient;
use tracing::warn;

/// Cap on danmaku rows kept per cid.
pub const MAX_DANMAKU_PER_CID: usize = 1000;

pub struct DanmakuFetcher<'a> {
    client: &'a BiliClient,
}

impl<'a> DanmakuFetcher<'a> {
    pub fn new(client: &'a BiliClient) -> Self {
        Self { client }
    }

    /// Fetch the danmaku lines of one video part.
    pub async fn fetch(&self, cid: u64, bvid: &str) -> Vec<String> {
        match self.client.danmaku_xml(cid, bvid).await {
            Ok(body) => return extract_danmaku(&body),
            Err(e) => {
                warn!(cid, error = %e, "danmaku xml fetch failed, trying legacy endpoint");
            }
        }

        match self.client.danmaku_legacy(cid, bvid).await {
            Ok(body) => extract_danmaku(&body),
            Err(e) => {
                warn!(cid, error = %e, "legacy danmaku fetch failed");
                Vec::new()
            }
        }
    }
}

/// Pull the text of every `<d>` element out of a danmaku XML document.
pub fn extract_danmaku(xml: &str) -> Vec<String> {
    let d_re = regex::Regex::new(r"<d p=[^>]*>(.*?)</d>").expect("valid regex");
    d_re.captures_iter(xml)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_d_elements() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><i>
            <d p="23.826,1,25,16777215,1700000000,0,abc,123">first one</d>
            <d p="24.105,4,25,16707842,1700000001,0,def,456">第二条弹幕</d>
        </i>"#;
        assert_eq!(extract_danmaku(xml), vec!["first one", "第二条弹幕"]);
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(extract_danmaku("<i></i>").is_empty());
        assert!(extract_danmaku("").is_empty());
    }

    #[test]
    fn ignores_elements_without_p_attribute() {
        let xml = "<i><d>stray</d><d p=\"1,1\">kept</d></i>";
        assert_eq!(extract_danmaku(xml), vec!["kept"]);
    }
}
