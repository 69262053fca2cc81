//! Error types for the news-to-video pipeline.
//!
//! Every stage that can abort a run has its own error enum. The three
//! fatal stages are wrapped by [`PipelineError`], which keeps the failing
//! stage visible to the caller. Image resolution has no variant there: it
//! degrades to "no image", and its [`ImageError`] / [`SearchError`] values
//! only feed diagnostics.

use std::path::PathBuf;
use thiserror::Error;

/// Stage of a pipeline run, used when reporting fatal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Synthesis,
    Compose,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Synthesis => "synthesis",
            Stage::Compose => "composition",
        };
        f.write_str(name)
    }
}

/// Failure to download or parse an article page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid article URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Failure to produce narration audio.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("narration text is empty")]
    EmptyText,

    #[error("speech service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("speech service answered with HTTP {0}")]
    Status(u16),

    #[error("speech service returned no audio")]
    NoAudio,

    #[error("could not write narration to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read narration duration: {0}")]
    Probe(String),
}

/// Failure to render or encode the output video.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("could not prepare render inputs: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder exited with {status}: {stderr}")]
    Encoder { status: String, stderr: String },

    #[error("encoder reported success but {0} was not written")]
    MissingOutput(PathBuf),
}

/// Fatal outcome of [`crate::pipeline::Pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch stage failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("synthesis stage failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("composition stage failed: {0}")]
    Compose(#[from] ComposeError),
}

impl PipelineError {
    /// The stage that aborted the run.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch(_) => Stage::Fetch,
            PipelineError::Synthesis(_) => Stage::Synthesis,
            PipelineError::Compose(_) => Stage::Compose,
        }
    }
}

/// Reason a direct image download produced nothing.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("could not write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Reason the image search fallback produced nothing.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search answered with HTTP {0}")]
    Status(u16),

    #[error("search page carried no session token")]
    MissingToken,

    #[error("search results were not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("search returned no image results")]
    NoResults,

    #[error("result image unusable: {0}")]
    Image(#[from] ImageError),
}

/// Failure to load the article list.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no credentials available: {0}")]
    Credentials(String),

    #[error("sheet request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("sheet answered with HTTP {0}")]
    Status(u16),

    #[error("sheet has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse records: {0}")]
    Parse(String),
}

/// Failure to load configuration or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
