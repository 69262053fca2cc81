//! Generic news article scraper.
//!
//! Works on arbitrary article pages rather than a single outlet: the title,
//! body paragraphs and a top image are pulled out with a handful of
//! structural heuristics (see the table in the parent module).

use crate::error::FetchError;
use crate::models::ArticleRecord;
use crate::utils::{http_client, truncate_for_log};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Paragraphs shorter than this are navigation, captions or bylines.
const MIN_PARAGRAPH_CHARS: usize = 25;

static OG_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", r#"[itemprop="articleBody"]"#, "main"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static TOP_IMAGE_META: Lazy<Vec<(Selector, &'static str)>> = Lazy::new(|| {
    vec![
        (Selector::parse(r#"meta[name="twitter:image"]"#).unwrap(), "content"),
        (Selector::parse(r#"meta[property="twitter:image"]"#).unwrap(), "content"),
        (Selector::parse(r#"link[rel="image_src"]"#).unwrap(), "href"),
    ]
});
static CONTENT_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());

/// Downloads and parses article pages.
#[derive(Debug, Clone)]
pub struct ArticleFetcher {
    client: Client,
}

/// What the structural pass found on a page.
#[derive(Debug, Default, PartialEq, Eq)]
struct ParsedPage {
    title: String,
    body_text: String,
    top_image: Option<String>,
}

impl ArticleFetcher {
    /// Create a fetcher whose requests give up after `page_timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(page_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(page_timeout)?,
        })
    }

    /// Fetch `url` and extract an [`ArticleRecord`].
    ///
    /// A missing top image is not an error: the page is re-fetched once and
    /// its `og:image` tag consulted, and if that fails too the record simply
    /// carries no image.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute http(s) URL of the article page
    ///
    /// # Returns
    ///
    /// The headline, the body paragraphs joined by newlines, the top image
    /// URL made absolute against `url`, and `url` itself. Title and body may
    /// be empty when the page has no recognisable structure.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `url` does not parse
    /// - [`FetchError::Request`] on network failure or timeout
    /// - [`FetchError::Status`] for a non-success HTTP status
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<ArticleRecord, FetchError> {
        let base = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let html = self.get_page(&base).await?;
        let mut page = parse_article(&html, &base);
        info!(
            title = %page.title,
            body_bytes = page.body_text.len(),
            "Parsed article"
        );
        debug!(preview = %truncate_for_log(&page.body_text, 200), "Article body");

        if page.top_image.is_none() {
            debug!("No top image from content heuristics; checking og:image");
            page.top_image = self.og_image_fallback(&base).await;
        }

        Ok(ArticleRecord {
            title: page.title,
            body_text: page.body_text,
            candidate_image_url: page.top_image,
            source_url: url.to_string(),
        })
    }

    async fn get_page(&self, url: &Url) -> Result<String, FetchError> {
        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(request_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(request_err)
    }

    /// Re-fetch the raw page and read its Open Graph image.
    async fn og_image_fallback(&self, url: &Url) -> Option<String> {
        match self.get_page(url).await {
            Ok(html) => {
                let found = og_image(&html, url);
                match &found {
                    Some(image) => info!(%image, "Found og:image"),
                    None => debug!("Page has no og:image"),
                }
                found
            }
            Err(e) => {
                warn!(error = %e, "og:image lookup failed");
                None
            }
        }
    }
}

fn parse_article(html: &str, base: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let container = find_container(&document);

    ParsedPage {
        title: extract_title(&document),
        body_text: extract_body(&document, container),
        top_image: extract_top_image(&document, container, base),
    }
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).next())
}

fn extract_title(document: &Html) -> String {
    if let Some(content) = document
        .select(&OG_TITLE)
        .filter_map(|e| e.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
    {
        return content;
    }

    [&*TITLE, &*H1]
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}

fn extract_body(document: &Html, container: Option<ElementRef<'_>>) -> String {
    let paragraphs: Vec<ElementRef<'_>> = match container {
        Some(root) => root.select(&PARAGRAPH).collect(),
        None => document.select(&PARAGRAPH).collect(),
    };

    paragraphs
        .into_iter()
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|text| text.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_top_image(document: &Html, container: Option<ElementRef<'_>>, base: &Url) -> Option<String> {
    let from_meta = TOP_IMAGE_META.iter().find_map(|(selector, attr)| {
        document
            .select(selector)
            .filter_map(|e| e.value().attr(attr))
            .find_map(|href| resolve_image_url(base, href))
    });
    if from_meta.is_some() {
        return from_meta;
    }

    container?
        .select(&CONTENT_IMAGE)
        .filter_map(|e| e.value().attr("src"))
        .find_map(|src| resolve_image_url(base, src))
}

fn og_image(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&OG_IMAGE)
        .filter_map(|e| e.value().attr("content"))
        .find_map(|href| resolve_image_url(base, href))
}

/// Absolute http(s) URL for an image reference, skipping inline data.
fn resolve_image_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("data:") {
        return None;
    }
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
