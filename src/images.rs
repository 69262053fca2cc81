//! Background image resolution.
//!
//! Two stages, first success wins:
//!
//! 1. **Direct**: download the article's candidate image, normalise it to
//!    RGB, crop-and-resize it to the target size with Lanczos filtering and
//!    save it as JPEG.
//! 2. **Search**: query the image search endpoint with the article title,
//!    extract the `vqd` session token from the search page, fetch the JSON
//!    results with it and run the first result through stage 1.
//!
//! Neither stage ever fails the pipeline. Their errors are classified
//! ([`ImageError`], [`SearchError`]) and logged so that a dead link can be
//! told apart from a broken search endpoint, then collapsed into `None`.

use crate::error::{ImageError, SearchError};
use crate::models::ImageAsset;
use crate::utils::http_client;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::REFERER;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// File name of the normalised image inside the work directory. Reused by
/// every run, so only one run may be in flight per work directory.
pub const IMAGE_FILE_NAME: &str = "article_image.jpg";

const JPEG_QUALITY: u8 = 85;

static VQD_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"vqd='([^']+)'").unwrap());
static VQD_DOUBLE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"vqd="([^"]+)""#).unwrap());

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    image: Option<String>,
}

/// Produces a normalised background image, or reports that none exists.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    image_client: Client,
    search_client: Client,
    search_url: String,
    work_dir: PathBuf,
    target_size: (u32, u32),
}

impl ImageResolver {
    /// Resolver writing into `work_dir` at `target_size`, with the default
    /// timeouts (12s per image, 10s per search request).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn new(work_dir: impl Into<PathBuf>, target_size: (u32, u32)) -> Result<Self, reqwest::Error> {
        Ok(Self {
            image_client: http_client(Duration::from_secs(12))?,
            search_client: http_client(Duration::from_secs(10))?,
            search_url: "https://duckduckgo.com".to_string(),
            work_dir: work_dir.into(),
            target_size,
        })
    }

    /// Replace the per-request timeouts of image downloads and searches.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn with_timeouts(mut self, image: Duration, search: Duration) -> Result<Self, reqwest::Error> {
        self.image_client = http_client(image)?;
        self.search_client = http_client(search)?;
        Ok(self)
    }

    /// Point the search fallback at another endpoint.
    pub fn with_search_url(mut self, base: impl Into<String>) -> Self {
        self.search_url = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve a background image for an article.
    ///
    /// Tries `candidate_url` first, then an image search for
    /// `fallback_query`.
    ///
    /// # Arguments
    ///
    /// * `candidate_url` - Top image found on the article page, if any
    /// * `fallback_query` - Search terms, usually the display title; blank
    ///   skips the search
    ///
    /// # Returns
    ///
    /// The saved JPEG at the target size, or `None` to render on a solid
    /// background. Failures are logged, never returned.
    #[instrument(level = "info", skip(self))]
    pub async fn resolve(&self, candidate_url: Option<&str>, fallback_query: &str) -> Option<ImageAsset> {
        if let Some(url) = candidate_url.filter(|u| !u.trim().is_empty()) {
            match self.download_and_fit(url).await {
                Ok(asset) => return Some(asset),
                Err(e) => warn!(%url, error = %e, "Article image unusable"),
            }
        }

        if fallback_query.trim().is_empty() {
            warn!("No fallback query; skipping image search");
            return None;
        }

        info!(query = %fallback_query, "No valid article image, trying image search");
        match self.search_and_fit(fallback_query).await {
            Ok(asset) => Some(asset),
            Err(e @ (SearchError::NoResults | SearchError::Image(_))) => {
                info!(error = %e, "Image search found nothing usable");
                None
            }
            Err(e) => {
                warn!(error = %e, endpoint = %self.search_url, "Image search endpoint misbehaved");
                None
            }
        }
    }

    /// Download `url` and normalise it into the work directory.
    #[instrument(level = "debug", skip(self))]
    pub async fn download_and_fit(&self, url: &str) -> Result<ImageAsset, ImageError> {
        let resp = self.image_client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().await?;
        debug!(bytes = bytes.len(), "Downloaded image");

        let (width, height) = self.target_size;
        let jpeg = tokio::task::spawn_blocking(move || fit_to_jpeg(&bytes, width, height)).await??;

        fs::create_dir_all(&self.work_dir).await?;
        let file_path = self.work_dir.join(IMAGE_FILE_NAME);
        fs::write(&file_path, jpeg).await?;
        info!(path = %file_path.display(), "Saved normalised image");

        Ok(ImageAsset {
            file_path,
            width,
            height,
        })
    }

    async fn search_and_fit(&self, query: &str) -> Result<ImageAsset, SearchError> {
        let image_url = self.search_image_url(query).await?;
        info!(%image_url, "Image search hit");
        Ok(self.download_and_fit(&image_url).await?)
    }

    /// First image URL the search endpoint returns for `query`.
    #[instrument(level = "debug", skip(self))]
    pub async fn search_image_url(&self, query: &str) -> Result<String, SearchError> {
        let page_url = format!("{}/", self.search_url);
        let resp = self
            .search_client
            .get(&page_url)
            .query(&[("q", query)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }
        let page = resp.text().await?;
        let token = extract_vqd(&page).ok_or(SearchError::MissingToken)?;
        debug!(%token, "Got search token");

        let resp = self
            .search_client
            .get(format!("{}/i.js", self.search_url))
            .header(REFERER, &page_url)
            .query(&[("l", "us-en"), ("o", "json"), ("q", query), ("vqd", token.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        parsed
            .results
            .into_iter()
            .filter_map(|r| r.image)
            .find(|u| !u.trim().is_empty())
            .ok_or(SearchError::NoResults)
    }
}

fn extract_vqd(page: &str) -> Option<String> {
    VQD_SINGLE
        .captures(page)
        .or_else(|| VQD_DOUBLE.captures(page))
        .map(|c| c[1].to_string())
}

/// Decode, convert to RGB, crop-to-fill `width`x`height`, encode as JPEG.
fn fit_to_jpeg(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    let fitted = rgb.resize_to_fill(width, height, FilterType::Lanczos3).to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&fitted)
        .map_err(ImageError::Encode)?;
    Ok(out)
}
