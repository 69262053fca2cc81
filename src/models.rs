//! Data models shared by the pipeline stages.
//!
//! - [`ArticleRef`]: one row of the operator's article list (title + URL)
//! - [`ArticleRecord`]: a fetched and parsed article
//! - [`NarrationAsset`]: synthesized speech on disk plus its duration
//! - [`ImageAsset`]: a background image normalized to the target resolution
//! - [`VideoOutput`]: the terminal artifact of a pipeline run
//!
//! Rows coming from the spreadsheet use `Title` / `URL` headers, hence the
//! serde aliases on [`ArticleRef`].

use serde::Deserialize;
use std::path::PathBuf;

/// An entry of the article list the operator steps through.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleRef {
    /// Display title; may be empty, in which case the fetched title is used.
    #[serde(alias = "Title", default)]
    pub title: String,
    /// Article URL.
    #[serde(alias = "URL", alias = "Url")]
    pub url: String,
}

/// A parsed article page.
///
/// `title` and `body_text` may be empty when extraction only partially
/// succeeded; that is degraded data, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Headline as found on the page.
    pub title: String,
    /// Main body text, paragraphs separated by newlines.
    pub body_text: String,
    /// Representative image URL, absolute, if one was found.
    pub candidate_image_url: Option<String>,
    /// The URL the article was fetched from.
    pub source_url: String,
}

/// Synthesized narration audio.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationAsset {
    pub file_path: PathBuf,
    pub duration_seconds: f64,
}

/// A background image normalized to a fixed resolution and encoded as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub file_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOutput {
    /// Title rendered on the video.
    pub title: String,
    /// Where the video was written.
    pub output_path: PathBuf,
}
