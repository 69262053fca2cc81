//! One article in, one video out.
//!
//! ```text
//! FETCH -> SUMMARIZE + SYNTHESIZE -> RESOLVE_IMAGE -> COMPOSE -> done
//! ```
//!
//! Fetch, synthesis and composition failures end the run with a
//! [`PipelineError`] naming the stage. Image resolution cannot fail: a
//! missing image renders on a solid background. An empty summary falls
//! back to narrating the title.
//!
//! Intermediate files live at fixed names inside the work directory and
//! are overwritten by the next run. [`Pipeline::run`] takes `&mut self`,
//! so one pipeline value can never have two runs in flight; separate
//! pipelines must be given separate work directories.

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::images::ImageResolver;
use crate::models::{ArticleRecord, VideoOutput};
use crate::scrapers::article::ArticleFetcher;
use crate::summary::summarize;
use crate::tts::{GoogleTts, SpeechSynthesizer};
use crate::video::{FfmpegEncoder, VideoComposer, VideoEncoder};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// File name of the narration track inside the work directory.
pub const NARRATION_FILE_NAME: &str = "narration.mp3";

/// Sequences fetch, narration, image resolution and composition.
#[derive(Debug)]
pub struct Pipeline<S, E> {
    fetcher: ArticleFetcher,
    resolver: ImageResolver,
    synthesizer: S,
    composer: VideoComposer<E>,
    work_dir: PathBuf,
    language: String,
    max_sentences: usize,
}

impl Pipeline<GoogleTts, FfmpegEncoder> {
    /// Production pipeline wired from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated application configuration
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let fetcher = ArticleFetcher::new(config.page_timeout())?;
        let resolver = ImageResolver::new(&config.work_dir, config.resolution)?
            .with_timeouts(config.image_timeout(), config.search_timeout())?
            .with_search_url(&config.image_search_url);
        let synthesizer = GoogleTts::new(config.tts_timeout())?
            .with_base_url(&config.tts_url)
            .with_ffprobe(&config.ffprobe);
        let encoder = FfmpegEncoder::new(&config.ffmpeg, config.font_file.clone()).with_temp_dir(&config.work_dir);
        let composer = VideoComposer::new(encoder)
            .with_resolution(config.resolution)
            .with_fps(config.fps)
            .with_header_text(&config.header_text)
            .with_min_duration(config.min_duration_secs);

        Ok(Pipeline::new(fetcher, resolver, synthesizer, composer, &config.work_dir)
            .with_language(&config.language)
            .with_max_sentences(config.max_sentences))
    }
}

impl<S: SpeechSynthesizer, E: VideoEncoder> Pipeline<S, E> {
    /// Assemble a pipeline from its stages.
    ///
    /// Narration is synthesized in English from at most three sentences
    /// unless changed with [`with_language`](Self::with_language) and
    /// [`with_max_sentences`](Self::with_max_sentences).
    pub fn new(
        fetcher: ArticleFetcher,
        resolver: ImageResolver,
        synthesizer: S,
        composer: VideoComposer<E>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            synthesizer,
            composer,
            work_dir: work_dir.into(),
            language: "en".to_string(),
            max_sentences: 3,
        }
    }

    /// Narration language code passed to the speech service.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// How many leading sentences of the body are narrated.
    pub fn with_max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    #[cfg(test)]
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    #[cfg(test)]
    pub fn composer(&self) -> &VideoComposer<E> {
        &self.composer
    }

    /// Render the article at `url` into `output_path`.
    ///
    /// Runs fetch, summary, narration, image resolution and composition in
    /// order. The narration track and background image are written to the
    /// work directory under fixed names and overwritten by the next run.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute http(s) URL of the article page
    /// * `title` - Title to show instead of the fetched headline; blank or
    ///   `None` keeps the fetched one. It is also the image search query.
    /// * `output_path` - Where the MP4 is written, replacing any existing file
    ///
    /// # Returns
    ///
    /// The title that was rendered and the output path.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Fetch`] if the URL is invalid or the page cannot be downloaded
    /// - [`PipelineError::Synthesis`] if the speech service fails
    /// - [`PipelineError::Compose`] if encoding fails; a partial output file is removed
    ///
    /// A missing or unusable image is not an error: the clip is rendered on
    /// a solid background.
    #[instrument(level = "info", skip(self, title), fields(output = %output_path.display()))]
    pub async fn run(
        &mut self,
        url: &str,
        title: Option<&str>,
        output_path: &Path,
    ) -> Result<VideoOutput, PipelineError> {
        let t0 = Instant::now();

        let article = self.fetcher.fetch(url).await.inspect_err(|e| {
            error!(error = %e, "Article fetch failed");
        })?;
        let display_title = display_title(title, &article);
        info!(title = %display_title, source = %article.source_url, "Running pipeline");
        match &article.candidate_image_url {
            Some(image) => info!(%image, "Top image found"),
            None => warn!("Article has no top image"),
        }

        let summary = summarize(&article.body_text, self.max_sentences);
        let script = narration_script(&summary, &display_title);
        if summary.is_empty() {
            warn!("Article body yielded no sentences; narrating the title");
        }
        let narration_path = self.work_dir.join(NARRATION_FILE_NAME);
        let narration = self
            .synthesizer
            .synthesize(&script, &narration_path, &self.language)
            .await
            .inspect_err(|e| error!(error = %e, "Narration synthesis failed"))?;

        let image = self
            .resolver
            .resolve(article.candidate_image_url.as_deref(), &display_title)
            .await;
        match &image {
            Some(asset) => info!(path = %asset.file_path.display(), "Final image path"),
            None => warn!("No image found; rendering on a solid background"),
        }

        if let Err(e) = self
            .composer
            .compose(&display_title, &narration, output_path, image.as_ref())
            .await
        {
            error!(error = %e, "Video composition failed");
            discard_partial_output(output_path).await;
            return Err(e.into());
        }

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            has_image = image.is_some(),
            "Pipeline complete"
        );
        Ok(VideoOutput {
            title: display_title,
            output_path: output_path.to_path_buf(),
        })
    }
}

/// Caller-supplied title if it has content, else the fetched one.
fn display_title(title: Option<&str>, article: &ArticleRecord) -> String {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| article.title.clone())
}

/// Text to narrate: the summary, or the title when the summary is empty.
pub fn narration_script(summary: &str, title: &str) -> String {
    if summary.trim().is_empty() {
        title.to_string()
    } else {
        summary.to_string()
    }
}

async fn discard_partial_output(output_path: &Path) {
    if tokio::fs::metadata(output_path).await.is_ok() {
        match tokio::fs::remove_file(output_path).await {
            Ok(()) => warn!(path = %output_path.display(), "Removed partial output"),
            Err(e) => warn!(path = %output_path.display(), error = %e, "Could not remove partial output"),
        }
    }
}
