//! Page fetching.
//!
//! The provider only needs "GET this URL and give me the final URL and the
//! body". Sub-fetches for preview players go through a clone of the same
//! fetcher so they share the user agent, cookies and timeout.

use std::future::Future;
use std::time::Duration;

use dmmeta_core::AppConfig;
use reqwest::header::{HeaderValue, COOKIE};
use reqwest::Client;
use url::Url;

use crate::error::DmmError;

/// A fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects, used to resolve relative links.
    pub url: Url,
    pub body: String,
}

/// Performs GET requests on behalf of the provider.
pub trait PageFetcher: Clone + Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, DmmError>> + Send;
}

/// reqwest-backed fetcher with a fixed user agent and site cookies.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    /// Cookies are only sent to the site host, not to CDN or player hosts.
    cookie_host: Option<String>,
    cookie: Option<HeaderValue>,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, DmmError> {
        let mut builder = Client::builder().user_agent(config.http.user_agent.as_str());
        if config.http.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.http.timeout_secs));
        }

        let cookie_host = Url::parse(&config.provider.base_url)
            .map_err(|e| DmmError::Config(format!("base_url: {e}")))?
            .host_str()
            .map(str::to_string);

        let header = config.cookie_header();
        let cookie = if header.is_empty() {
            None
        } else {
            Some(HeaderValue::from_str(&header).map_err(|e| DmmError::Config(e.to_string()))?)
        };

        Ok(Self {
            http: builder.build()?,
            cookie_host,
            cookie,
        })
    }

    fn cookie_for(&self, url: &Url) -> Option<&HeaderValue> {
        match (&self.cookie_host, url.host_str()) {
            (Some(site), Some(host)) if site == host => self.cookie.as_ref(),
            _ => None,
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, DmmError> {
        tracing::debug!(%url, "GET");
        let mut request = self.http.get(url.clone());
        if let Some(cookie) = self.cookie_for(url) {
            request = request.header(COOKIE, cookie.clone());
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DmmError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = resp.url().clone();
        let body = resp.text().await?;
        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookies_only_go_to_site_host() {
        let fetcher = HttpFetcher::new(&AppConfig::default()).unwrap();
        let site = Url::parse("https://www.dmm.co.jp/digital/videoa/").unwrap();
        let cdn = Url::parse("https://cc3001.dmm.co.jp/litevideo/").unwrap();

        assert_eq!(
            fetcher.cookie_for(&site).and_then(|v| v.to_str().ok()),
            Some("age_check_done=1")
        );
        assert!(fetcher.cookie_for(&cdn).is_none());
    }

    #[test]
    fn no_cookies_configured() {
        let mut config = AppConfig::default();
        config.provider.cookies.clear();
        let fetcher = HttpFetcher::new(&config).unwrap();
        let site = Url::parse("https://www.dmm.co.jp/").unwrap();
        assert!(fetcher.cookie_for(&site).is_none());
    }

    #[test]
    fn rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.provider.base_url = "not a url".into();
        assert!(matches!(
            HttpFetcher::new(&config),
            Err(DmmError::Config(_))
        ));
    }
}
