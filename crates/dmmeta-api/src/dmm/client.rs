use dmmeta_core::{AppConfig, MetadataRecord, SearchResultSummary};
use scraper::Html;
use url::Url;

use super::candidates::candidates;
use super::cid_from_link;
use super::extract::{extract, Page};
use super::preview::{find_triggers, PreviewResolver};
use super::search::{parse_listing, search_url};
use crate::error::DmmError;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::traits::MovieProvider;

/// DMM metadata client.
///
/// Holds no per-lookup state; concurrent lookups are independent.
#[derive(Debug, Clone)]
pub struct DmmClient<F = HttpFetcher> {
    fetcher: F,
    base_url: Url,
}

impl DmmClient<HttpFetcher> {
    pub fn new(config: &AppConfig) -> Result<Self, DmmError> {
        let base_url = Url::parse(&config.provider.base_url)
            .map_err(|e| DmmError::Config(format!("base_url: {e}")))?;
        Ok(Self::with_fetcher(HttpFetcher::new(config)?, base_url))
    }
}

impl<F: PageFetcher> DmmClient<F> {
    pub fn with_fetcher(fetcher: F, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }
}

impl<F: PageFetcher> MovieProvider for DmmClient<F> {
    type Error = DmmError;

    #[tracing::instrument(name = "movie_by_id", skip(self))]
    async fn get_movie_info_by_id(&self, id: &str) -> Result<MetadataRecord, DmmError> {
        for link in candidates(&self.base_url, id) {
            match self.get_movie_info_by_link(link.as_str()).await {
                Ok(record) if record.is_valid() => {
                    tracing::info!(homepage = %record.homepage, number = %record.number, "Resolved movie");
                    return Ok(record);
                }
                Ok(_) => tracing::debug!(%link, "Candidate page has no usable metadata"),
                Err(e) => tracing::debug!(%link, error = %e, "Candidate failed"),
            }
        }
        Err(DmmError::NotFound(id.to_string()))
    }

    #[tracing::instrument(name = "movie_by_link", skip(self))]
    async fn get_movie_info_by_link(&self, link: &str) -> Result<MetadataRecord, DmmError> {
        let cid = cid_from_link(link)?;
        let url = Url::parse(link).map_err(|_| DmmError::InvalidLink(link.to_string()))?;

        let page = self.fetcher.fetch(&url).await?;
        let mut record = MetadataRecord::new(page.url.as_str(), cid.as_str());

        // The parsed document is not Send; drop it before the preview fetches.
        let triggers = {
            let doc = Html::parse_document(&page.body);
            let view = Page {
                doc: &doc,
                url: &page.url,
                cid: &cid,
            };
            extract(&view, &mut record);
            find_triggers(&doc, &page.url)
        };

        PreviewResolver::new(self.fetcher.clone())
            .apply(triggers, &mut record)
            .await;
        Ok(record)
    }

    #[tracing::instrument(name = "search", skip(self))]
    async fn search_movie(&self, keyword: &str) -> Result<Vec<SearchResultSummary>, DmmError> {
        let url = search_url(&self.base_url, keyword)?;
        let page = self.fetcher.fetch(&url).await?;
        let results = parse_listing(&page.body, &page.url)?;
        tracing::debug!(count = results.len(), "Parsed search listing");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetcher;

    const VIDEOA: &str = "https://www.dmm.co.jp/digital/videoa/-/detail/=/cid=abc00123/";
    const MONO_DVD: &str = "https://www.dmm.co.jp/mono/dvd/-/detail/=/cid=abc00123/";

    const VALID_PAGE: &str = r#"<html><body>
<h1 id="title">Disc Title</h1>
<table><tr><td>品番：</td><td>abc00123</td></tr></table>
</body></html>"#;

    fn client(fetcher: FakeFetcher) -> DmmClient<FakeFetcher> {
        DmmClient::with_fetcher(fetcher, Url::parse("https://www.dmm.co.jp/").unwrap())
    }

    #[tokio::test]
    async fn probes_digital_before_mono_dvd() {
        let fetcher = FakeFetcher::new().with_page(MONO_DVD, VALID_PAGE);
        let record = client(fetcher.clone())
            .get_movie_info_by_id("abc00123")
            .await
            .unwrap();

        assert_eq!(record.homepage, MONO_DVD);
        assert_eq!(record.title, "Disc Title");
        assert_eq!(fetcher.visited(), [VIDEOA, MONO_DVD]);
    }

    #[tokio::test]
    async fn first_valid_candidate_wins() {
        let fetcher = FakeFetcher::new()
            .with_page(VIDEOA, r#"<h1 id="title">Digital Title</h1>"#)
            .with_page(MONO_DVD, VALID_PAGE);
        let record = client(fetcher.clone())
            .get_movie_info_by_id("abc00123")
            .await
            .unwrap();

        assert_eq!(record.title, "Digital Title");
        assert_eq!(fetcher.visited(), [VIDEOA]);
    }

    #[tokio::test]
    async fn invalid_candidate_page_is_skipped() {
        let fetcher = FakeFetcher::new()
            .with_page(VIDEOA, "<html><body><p>age check</p></body></html>")
            .with_page(MONO_DVD, VALID_PAGE);
        let record = client(fetcher)
            .get_movie_info_by_id("abc00123")
            .await
            .unwrap();
        assert_eq!(record.homepage, MONO_DVD);
    }

    #[tokio::test]
    async fn unrelated_structured_data_does_not_stop_probing() {
        let gate = r#"<html><head><script type="application/ld+json">{"@context": "http://schema.org", "@type": "WebSite", "url": "https://www.dmm.co.jp/"}</script></head>
<body><p>age check</p></body></html>"#;
        let fetcher = FakeFetcher::new()
            .with_page(VIDEOA, gate)
            .with_page(MONO_DVD, VALID_PAGE);
        let record = client(fetcher.clone())
            .get_movie_info_by_id("abc00123")
            .await
            .unwrap();

        assert_eq!(record.homepage, MONO_DVD);
        assert_eq!(record.number, "ABC-123");
        assert_eq!(fetcher.visited(), [VIDEOA, MONO_DVD]);
    }

    #[tokio::test]
    async fn exhaustion_is_not_found() {
        let mut fetcher = FakeFetcher::new();
        for url in candidates(&Url::parse("https://www.dmm.co.jp/").unwrap(), "abc00123") {
            fetcher = fetcher.with_page(url.as_str(), "<html><body></body></html>");
        }
        let result = client(fetcher.clone()).get_movie_info_by_id("abc00123").await;

        assert!(matches!(result, Err(DmmError::NotFound(id)) if id == "abc00123"));
        assert_eq!(fetcher.visited().len(), 6);
    }

    #[tokio::test]
    async fn fetch_failures_everywhere_is_not_found() {
        let result = client(FakeFetcher::new())
            .get_movie_info_by_id("abc00123")
            .await;
        assert!(matches!(result, Err(DmmError::NotFound(_))));
    }

    #[tokio::test]
    async fn link_without_cid_is_rejected_before_fetching() {
        let fetcher = FakeFetcher::new();
        let result = client(fetcher.clone())
            .get_movie_info_by_link("https://www.dmm.co.jp/digital/videoa/")
            .await;

        assert!(matches!(result, Err(DmmError::InvalidLink(_))));
        assert!(fetcher.visited().is_empty());
    }

    #[tokio::test]
    async fn link_fetch_failure_propagates() {
        let result = client(FakeFetcher::new())
            .get_movie_info_by_link(VIDEOA)
            .await;
        assert!(matches!(result, Err(DmmError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn end_to_end_without_structured_data() {
        let link = "https://www.dmm.co.jp/digital/videoa/-/detail/=/cid=abc-001/";
        let page = r#"<html><body>
<h1 id="title">Title</h1>
<img id="package-src-abc-001" src="https://pics.dmm.co.jp/digital/video/abc-001/abc-001ps.jpg">
<table><tr><td>品番：</td><td>abc-001</td></tr></table>
</body></html>"#;
        let record = client(FakeFetcher::new().with_page(link, page))
            .get_movie_info_by_id("abc-001")
            .await
            .unwrap();

        assert_eq!(record.title, "Title");
        assert_eq!(record.id, "abc-001");
        assert_eq!(record.number, "ABC-001");
        assert_eq!(
            record.cover_url,
            "https://pics.dmm.co.jp/digital/video/abc-001/abc-001pl.jpg"
        );
        assert!(record.preview_video_url.is_empty());
    }

    #[tokio::test]
    async fn preview_chain_runs_after_extraction() {
        let page = r#"<html><body>
<h1 id="title">Title</h1>
<script type="application/ld+json">{"name": "Title", "sku": "abc00123", "subjectOf": {"contentUrl": "https://cc3001.dmm.co.jp/json.mp4"}}</script>
<div id="detail-sample-movie"><div><a onclick="sampleplay('/digital/videoa/-/detail/ajax-movie/=/cid=abc00123/'); return false;">play</a></div></div>
</body></html>"#;
        let player = r#"<iframe src="https://www.dmm.co.jp/service/digitalapi/-/html5_player/=/cid=abc00123/"></iframe>"#;
        let embed = r#"<script>const args = {"bitrates":[{"bitrate":1000,"src":"//cc3001.dmm.co.jp/best.mp4"},{"bitrate":300,"src":"//cc3001.dmm.co.jp/low.mp4"}]};</script>"#;

        let fetcher = FakeFetcher::new()
            .with_page(VIDEOA, page)
            .with_page(
                "https://www.dmm.co.jp/digital/videoa/-/detail/ajax-movie/=/cid=abc00123/",
                player,
            )
            .with_page(
                "https://www.dmm.co.jp/service/digitalapi/-/html5_player/=/cid=abc00123/",
                embed,
            );
        let record = client(fetcher).get_movie_info_by_link(VIDEOA).await.unwrap();

        assert_eq!(record.number, "ABC-123");
        assert_eq!(record.preview_video_url, "https://cc3001.dmm.co.jp/best.mp4");
    }

    #[tokio::test]
    async fn broken_preview_chain_keeps_record() {
        let page = r#"<h1 id="title">Title</h1>
<div id="detail-sample-vr-movie"><div><a onclick="vrsampleplay('/digital/-/vr-sample-player/=/cid=abc00123/');">vr</a></div></div>"#;
        let record = client(FakeFetcher::new().with_page(VIDEOA, page))
            .get_movie_info_by_link(VIDEOA)
            .await
            .unwrap();

        assert_eq!(record.title, "Title");
        assert!(record.preview_video_url.is_empty());
    }

    #[tokio::test]
    async fn search_goes_through_fetcher() {
        let listing = r#"<ul id="list"><li><p class="tmb"><a href="/digital/videoa/-/detail/=/cid=abc00123/"><span><img src="/p/abc00123pt.jpg" alt="Hit"></span></a></p></li></ul>"#;
        let fetcher = FakeFetcher::new().with_page(
            "https://www.dmm.co.jp/digital/-/list/search/=/?searchstr=abc00123",
            listing,
        );
        let results = client(fetcher).search_movie("ABC00123").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Hit");
        assert_eq!(results[0].number, "ABC-123");
    }

    #[test]
    fn new_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.provider.base_url = "::".into();
        assert!(matches!(DmmClient::new(&config), Err(DmmError::Config(_))));
    }
}
