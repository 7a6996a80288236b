//! Network access: pages as parsed documents, prior configs as JSON.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, REFERER};
use scraper::Html;
use serde_json::Value;
use url::Url;

use crate::config::HttpOptions;
use crate::error::Result;

/// How far into a page to look for a `<meta>` charset declaration.
const META_SNIFF_BYTES: usize = 4096;

/// Everything the pipeline needs from the network.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetch a page and parse it into a document tree.
    async fn fetch_page(&self, url: &Url) -> Result<Html>;

    /// Fetch a JSON document.
    async fn fetch_json(&self, url: &Url) -> Result<Value>;
}

/// Picks a page's character encoding: the `Content-Type` charset first, then
/// a byte order mark, then a `<meta>` declaration, else UTF-8.
#[derive(Debug, Clone)]
pub struct HtmlDecoder {
    header_charset: Regex,
    meta_charset: Regex,
}

impl HtmlDecoder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header_charset: Regex::new(r#"(?i)charset\s*=\s*["']?([\w:.-]+)"#)?,
            meta_charset: Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?([\w:.-]+)"#)?,
        })
    }

    pub fn encoding_for(&self, content_type: Option<&str>, bytes: &[u8]) -> &'static Encoding {
        content_type
            .and_then(|header| label(&self.header_charset, header))
            .or_else(|| Encoding::for_bom(bytes).map(|(encoding, _)| encoding))
            .or_else(|| {
                let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SNIFF_BYTES)]);
                label(&self.meta_charset, &head)
            })
            .unwrap_or(UTF_8)
    }

    pub fn decode(&self, content_type: Option<&str>, bytes: &[u8]) -> String {
        let encoding = self.encoding_for(content_type, bytes);
        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            log::debug!("Page did not decode cleanly as {}, some characters were replaced", used.name());
        }
        text.into_owned()
    }
}

fn label(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let caps = pattern.captures(haystack)?;
    Encoding::for_label(caps.get(1)?.as_str().as_bytes())
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    decoder: HtmlDecoder,
}

impl HttpFetcher {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let mut client_builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str());

        if let Some(proxy_url) = &options.proxy {
            log::debug!("Using proxy: {}", proxy_url);
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: client_builder.build()?,
            decoder: HtmlDecoder::new()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<Html> {
        log::debug!("Fetching: {}", url);

        // Some sources only answer when they see themselves as referrer.
        let response = self
            .client
            .get(url.clone())
            .header(REFERER, url.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!("Non-success status code {} from {}", response.status().as_u16(), url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        let html = self.decoder.decode(content_type.as_deref(), &bytes);
        Ok(Html::parse_document(&html))
    }

    async fn fetch_json(&self, url: &Url) -> Result<Value> {
        log::debug!("Fetching JSON: {}", url);

        let value = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }
}
