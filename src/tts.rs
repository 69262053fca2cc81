//! Narration synthesis.
//!
//! [`SpeechSynthesizer`] is the seam the pipeline depends on. The shipped
//! implementation, [`GoogleTts`], uses the public translate TTS endpoint:
//! text is cut into chunks of at most [`MAX_CHUNK_CHARS`] characters on
//! word boundaries, each chunk is requested separately and the MP3 frames
//! are concatenated. The duration is then read back from the written file.

use crate::error::SynthesisError;
use crate::ffmpeg::media_duration;
use crate::models::NarrationAsset;
use crate::utils::{http_client, wrap_text};
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Longest text the speech endpoint accepts in one request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Converts a narration script into an audio file.
pub trait SpeechSynthesizer {
    /// Write speech for `text` to `output_path` and report its duration.
    ///
    /// Empty text is an error; callers substitute a fallback script first.
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        lang: &str,
    ) -> Result<NarrationAsset, SynthesisError>;
}

/// Speech via the Google Translate TTS endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
    base_url: String,
    ffprobe: String,
}

impl GoogleTts {
    /// Client for the public endpoint with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: "https://translate.google.com".to_string(),
            ffprobe: "ffprobe".to_string(),
        })
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_ffprobe(mut self, ffprobe: impl Into<String>) -> Self {
        self.ffprobe = ffprobe.into();
        self
    }

    /// Request speech for `text` and return the concatenated MP3 bytes.
    #[instrument(level = "info", skip(self, text), fields(chars = text.chars().count()))]
    pub async fn fetch_speech(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError> {
        let chunks = wrap_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx_s = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let resp = self
                .client
                .get(format!("{}/translate_tts", self.base_url))
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", lang),
                    ("client", "tw-ob"),
                    ("total", total.as_str()),
                    ("idx", idx_s.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SynthesisError::Status(status.as_u16()));
            }
            let bytes = resp.bytes().await?;
            debug!(idx, bytes = bytes.len(), "Received speech chunk");
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(SynthesisError::NoAudio);
        }
        Ok(audio)
    }
}

impl SpeechSynthesizer for GoogleTts {
    #[instrument(level = "info", skip(self, text), fields(path = %output_path.display()))]
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        lang: &str,
    ) -> Result<NarrationAsset, SynthesisError> {
        let t0 = Instant::now();
        let audio = self.fetch_speech(text, lang).await?;

        let write_err = |source| SynthesisError::Write {
            path: output_path.to_path_buf(),
            source,
        };
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        fs::write(output_path, &audio).await.map_err(write_err)?;

        let duration_seconds = media_duration(&self.ffprobe, output_path)
            .await
            .map_err(SynthesisError::Probe)?;
        info!(
            duration_seconds,
            bytes = audio.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Narration synthesized"
        );

        Ok(NarrationAsset {
            file_path: output_path.to_path_buf(),
            duration_seconds,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Writes a placeholder file and reports a fixed duration.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSpeech {
        pub duration: f64,
        pub fail: bool,
        pub texts: Mutex<Vec<String>>,
    }

    impl FakeSpeech {
        pub(crate) fn lasting(duration: f64) -> Self {
            Self {
                duration,
                ..Default::default()
            }
        }
    }

    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(
            &self,
            text: &str,
            output_path: &Path,
            _lang: &str,
        ) -> Result<NarrationAsset, SynthesisError> {
            self.texts.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(SynthesisError::Status(503));
            }
            if text.trim().is_empty() {
                return Err(SynthesisError::EmptyText);
            }
            std::fs::create_dir_all(output_path.parent().unwrap()).unwrap();
            std::fs::write(output_path, b"mp3").unwrap();
            Ok(NarrationAsset {
                file_path: output_path.to_path_buf(),
                duration_seconds: self.duration,
            })
        }
    }

    fn tts(server: &MockServer) -> GoogleTts {
        GoogleTts::new(Duration::from_secs(5)).unwrap().with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_fetch_speech_single_chunk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("q", "Markets closed higher."))
            .and(query_param("tl", "en"))
            .and(query_param("total", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = tts(&server).fetch_speech("Markets closed higher.", "en").await.unwrap();
        assert_eq!(audio, b"ID3audio");
    }

    #[tokio::test]
    async fn test_fetch_speech_concatenates_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"aa".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bb".to_vec()))
            .mount(&server)
            .await;

        let text = "word ".repeat(30);
        let audio = tts(&server).fetch_speech(&text, "en").await.unwrap();
        assert_eq!(audio, b"aabb");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let server = MockServer::start().await;
        let tmp = tempfile::tempdir().unwrap();
        let err = tts(&server)
            .synthesize("   ", &tmp.path().join("tts.mp3"), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyText));
    }

    #[tokio::test]
    async fn test_service_error_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = tts(&server).fetch_speech("Hello there.", "en").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Status(503)));
    }

    #[tokio::test]
    async fn test_empty_audio_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = tts(&server).fetch_speech("Hello there.", "en").await.unwrap_err();
        assert!(matches!(err, SynthesisError::NoAudio));
    }
}
