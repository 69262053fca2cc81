//! Video composition.
//!
//! [`VideoComposer`] turns a title, a narration track and an optional
//! background into a [`VideoSpec`], a fully resolved layout, and hands it
//! to a [`VideoEncoder`]. Layers, bottom to top:
//!
//! 1. background: the image stretched to the frame, or a dark grey fill
//! 2. the wrapped title near the bottom, on a red box that the encoder
//!    sizes from the rendered text
//! 3. a full-width header bar with the header text
//!
//! Every layer lasts `max(min_duration, narration duration)` seconds.

use crate::error::ComposeError;
use crate::ffmpeg;
use crate::models::{ImageAsset, NarrationAsset};
use crate::utils::wrap_text;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{info, instrument, warn};

pub const DEFAULT_RESOLUTION: (u32, u32) = (1280, 720);
pub const DEFAULT_FPS: u32 = 24;
pub const DEFAULT_HEADER_TEXT: &str = "BREAKING NEWS";
/// Shortest clip produced, whatever the narration length.
pub const MIN_DURATION_SECS: f64 = 5.0;
/// Title wrap width in characters.
pub const TITLE_WRAP_CHARS: usize = 50;

const TITLE_FONT_SIZE: u32 = 40;
const HEADER_FONT_SIZE: u32 = 50;
const TITLE_LINE_SPACING: u32 = 10;
const TITLE_BOX_PADDING: u32 = 20;
const TITLE_BOTTOM_MARGIN: u32 = 40;
/// Bytes of encoder stderr kept in [`ComposeError::Encoder`].
const STDERR_TAIL_BYTES: usize = 2000;

/// An opaque colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `0xRRGGBB`, the form ffmpeg colour options accept.
    pub fn hex(&self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

pub const BACKGROUND_COLOR: Rgb = Rgb(20, 20, 20);
pub const TITLE_BOX_COLOR: Rgb = Rgb(150, 0, 0);
pub const HEADER_COLOR: Rgb = Rgb(200, 0, 0);
pub const TEXT_COLOR: Rgb = Rgb(255, 255, 255);

/// Axis-aligned rectangle in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fully resolved description of one clip. Built per render, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSpec {
    pub resolution: (u32, u32),
    pub fps: u32,
    pub duration_seconds: f64,
    pub background: Option<ImageAsset>,
    pub header_text: String,
    pub header_bar: Rect,
    pub header_font_size: u32,
    pub title_text: String,
    /// Wrapped title; empty means no title layer at all.
    pub title_lines: Vec<String>,
    pub title_font_size: u32,
    /// Space between the title text and the edge of its box.
    pub title_box_padding: u32,
    /// Gap between the bottom of the title box and the frame edge.
    pub title_bottom_margin: u32,
}

impl VideoSpec {
    /// Lowest `y` the title text may start at so its box stays below the
    /// header bar.
    pub fn title_min_y(&self) -> u32 {
        self.header_bar.height + self.title_box_padding
    }
}

/// Clip length for a narration of `audio_seconds`.
pub fn clip_duration(audio_seconds: f64, min_seconds: f64) -> f64 {
    if audio_seconds.is_finite() {
        audio_seconds.max(min_seconds)
    } else {
        min_seconds
    }
}

/// Renders a [`VideoSpec`] plus narration into a file.
pub trait VideoEncoder {
    async fn encode(
        &self,
        spec: &VideoSpec,
        audio: &NarrationAsset,
        output_path: &Path,
    ) -> Result<(), ComposeError>;
}

/// Lays out and renders news clips.
#[derive(Debug, Clone)]
pub struct VideoComposer<E> {
    encoder: E,
    resolution: (u32, u32),
    fps: u32,
    header_text: String,
    min_duration: f64,
}

impl<E: VideoEncoder> VideoComposer<E> {
    /// Composer with the default 1280x720 / 24 fps / "BREAKING NEWS" layout.
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            resolution: DEFAULT_RESOLUTION,
            fps: DEFAULT_FPS,
            header_text: DEFAULT_HEADER_TEXT.to_string(),
            min_duration: MIN_DURATION_SECS,
        }
    }

    /// Frame size in pixels.
    pub fn with_resolution(mut self, resolution: (u32, u32)) -> Self {
        self.resolution = resolution;
        self
    }

    /// Output frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Banner text drawn on the header bar; blank leaves the bar empty.
    pub fn with_header_text(mut self, header_text: impl Into<String>) -> Self {
        self.header_text = header_text.into();
        self
    }

    /// Floor for the clip length in seconds.
    pub fn with_min_duration(mut self, seconds: f64) -> Self {
        self.min_duration = seconds;
        self
    }

    #[cfg(test)]
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Compute the layout for one clip.
    ///
    /// Pure: nothing is read from disk. The title box itself is sized by
    /// the encoder from the rendered glyphs, so only its padding and
    /// placement live in the spec.
    pub fn layout(&self, title: &str, audio: &NarrationAsset, image: Option<&ImageAsset>) -> VideoSpec {
        let (width, _) = self.resolution;

        let header_bar = Rect {
            x: 0,
            y: 0,
            width,
            height: HEADER_FONT_SIZE * 6 / 5 + 20,
        };

        VideoSpec {
            resolution: self.resolution,
            fps: self.fps,
            duration_seconds: clip_duration(audio.duration_seconds, self.min_duration),
            background: image.cloned(),
            header_text: self.header_text.clone(),
            header_bar,
            header_font_size: HEADER_FONT_SIZE,
            title_text: title.to_string(),
            title_lines: wrap_text(title, TITLE_WRAP_CHARS),
            title_font_size: TITLE_FONT_SIZE,
            title_box_padding: TITLE_BOX_PADDING,
            title_bottom_margin: TITLE_BOTTOM_MARGIN,
        }
    }

    /// Render `title` over `image` (or a solid fill) with `audio` into
    /// `output_path`, overwriting it.
    ///
    /// # Arguments
    ///
    /// * `title` - Headline for the title layer; wrapped at 50 characters
    /// * `audio` - Narration track; its duration sets the clip length,
    ///   never less than the configured minimum
    /// * `output_path` - Destination MP4; parent directories are created
    /// * `image` - Background image; a file that no longer exists falls
    ///   back to the solid fill
    ///
    /// # Returns
    ///
    /// The path that was written.
    ///
    /// # Errors
    ///
    /// Returns a [`ComposeError`] if the output directory cannot be created
    /// or the encoder fails.
    #[instrument(level = "info", skip(self, audio, image), fields(output = %output_path.display()))]
    pub async fn compose(
        &self,
        title: &str,
        audio: &NarrationAsset,
        output_path: &Path,
        image: Option<&ImageAsset>,
    ) -> Result<PathBuf, ComposeError> {
        let image = image.filter(|asset| {
            let exists = asset.file_path.is_file();
            if !exists {
                warn!(path = %asset.file_path.display(), "Background image missing; using solid fill");
            } else if (asset.width, asset.height) != self.resolution {
                warn!(
                    width = asset.width,
                    height = asset.height,
                    resolution = ?self.resolution,
                    "Background image size differs from the frame; the encoder will stretch it"
                );
            }
            exists
        });
        let spec = self.layout(title, audio, image);
        info!(
            duration_seconds = spec.duration_seconds,
            has_background = spec.background.is_some(),
            title_lines = spec.title_lines.len(),
            "Composing video"
        );

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let t0 = Instant::now();
        self.encoder.encode(&spec, audio, output_path).await?;
        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Video written");
        Ok(output_path.to_path_buf())
    }
}

/// Encodes clips with the `ffmpeg` binary (libx264 + AAC).
///
/// Title and header text reach `drawtext` through temporary files read
/// with `expansion=none`, so `%` in a headline is drawn as is.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg: String,
    font_file: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg", None)
    }
}

impl FfmpegEncoder {
    /// Encoder running the `ffmpeg` program, drawing text with `font_file`
    /// or ffmpeg's default font.
    pub fn new(ffmpeg: impl Into<String>, font_file: Option<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            font_file,
            temp_dir: None,
        }
    }

    /// Write the per-render text files into `dir` instead of the system
    /// temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn text_file(&self, prefix: &str, contents: &str) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(".txt");
        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    /// Arguments for one render.
    ///
    /// # Arguments
    ///
    /// * `spec` - Resolved layout
    /// * `audio` - Narration track, mapped as the only audio stream
    /// * `title_file` / `header_file` - Text files holding the wrapped title
    ///   and the header text
    /// * `output_path` - Destination, overwritten (`-y`)
    pub fn build_args(
        &self,
        spec: &VideoSpec,
        audio: &Path,
        title_file: &Path,
        header_file: &Path,
        output_path: &Path,
    ) -> Vec<String> {
        let (w, h) = spec.resolution;
        let fps = spec.fps.to_string();
        let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];

        match &spec.background {
            Some(image) => args.extend([
                "-loop".into(),
                "1".into(),
                "-framerate".into(),
                fps.clone(),
                "-i".into(),
                image.file_path.display().to_string(),
            ]),
            None => args.extend([
                "-f".into(),
                "lavfi".into(),
                "-i".into(),
                format!("color=c={}:s={w}x{h}:r={fps}", BACKGROUND_COLOR.hex()),
            ]),
        }
        args.extend(["-i".into(), audio.display().to_string()]);

        let font = self
            .font_file
            .as_ref()
            .map(|f| format!(":fontfile={}", quote_filter_value(&f.display().to_string())))
            .unwrap_or_default();

        let mut filters = vec![format!("[0:v]scale={w}:{h},setsar=1")];
        if !spec.title_lines.is_empty() {
            let pad = spec.title_box_padding;
            filters.push(format!(
                "drawtext=textfile={}{font}:expansion=none:fontsize={}:fontcolor={}:line_spacing={}\
                 :box=1:boxcolor={}@1.0:boxborderw={pad}\
                 :x=(w-text_w)/2:y='max({},h-text_h-{})'",
                quote_filter_value(&title_file.display().to_string()),
                spec.title_font_size,
                TEXT_COLOR.hex(),
                TITLE_LINE_SPACING,
                TITLE_BOX_COLOR.hex(),
                spec.title_min_y(),
                pad + spec.title_bottom_margin,
            ));
        }
        let bar = spec.header_bar;
        filters.push(format!(
            "drawbox=x=0:y=0:w={}:h={}:color={}@1.0:t=fill",
            bar.width,
            bar.height,
            HEADER_COLOR.hex()
        ));
        if !spec.header_text.trim().is_empty() {
            filters.push(format!(
                "drawtext=textfile={}{font}:expansion=none:fontsize={}:fontcolor={}:x=(w-text_w)/2:y=({}-text_h)/2",
                quote_filter_value(&header_file.display().to_string()),
                spec.header_font_size,
                TEXT_COLOR.hex(),
                bar.height
            ));
        }
        let graph = format!("{},format=yuv420p[v]", filters.join(","));

        args.extend([
            "-filter_complex".into(),
            graph,
            "-map".into(),
            "[v]".into(),
            "-map".into(),
            "1:a:0".into(),
            "-r".into(),
            fps,
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "medium".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
            "-t".into(),
            format!("{:.3}", spec.duration_seconds),
            "-movflags".into(),
            "+faststart".into(),
            "-y".into(),
            output_path.display().to_string(),
        ]);
        args
    }
}

impl VideoEncoder for FfmpegEncoder {
    #[instrument(level = "info", skip_all, fields(output = %output_path.display()))]
    async fn encode(
        &self,
        spec: &VideoSpec,
        audio: &NarrationAsset,
        output_path: &Path,
    ) -> Result<(), ComposeError> {
        // Both files are removed when dropped, on every return path.
        let title_file = self.text_file("news_title_", &spec.title_lines.join("\n"))?;
        let header_file = self.text_file("news_header_", &spec.header_text)?;

        let args = self.build_args(
            spec,
            &audio.file_path,
            title_file.path(),
            header_file.path(),
            output_path,
        );
        let out = ffmpeg::run(&self.ffmpeg, &args)
            .await
            .map_err(|source| ComposeError::Spawn {
                program: self.ffmpeg.clone(),
                source,
            })?;

        if !out.success {
            return Err(ComposeError::Encoder {
                status: out.status,
                stderr: stderr_tail(out.stderr.trim(), STDERR_TAIL_BYTES).to_string(),
            });
        }
        if !output_path.is_file() {
            return Err(ComposeError::MissingOutput(output_path.to_path_buf()));
        }
        Ok(())
    }
}

/// Last `max` bytes of `stderr`, starting on a char boundary.
fn stderr_tail(stderr: &str, max: usize) -> &str {
    let mut start = stderr.len().saturating_sub(max);
    while !stderr.is_char_boundary(start) {
        start += 1;
    }
    &stderr[start..]
}

/// Single-quote a filter option value.
fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "/").replace('\'', r"'\''"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records specs instead of encoding and writes a placeholder file.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingEncoder {
        pub specs: Mutex<Vec<VideoSpec>>,
        pub fail: bool,
    }

    impl VideoEncoder for RecordingEncoder {
        async fn encode(
            &self,
            spec: &VideoSpec,
            _audio: &NarrationAsset,
            output_path: &Path,
        ) -> Result<(), ComposeError> {
            self.specs.lock().unwrap().push(spec.clone());
            if self.fail {
                std::fs::write(output_path, b"partial")?;
                return Err(ComposeError::Encoder {
                    status: "exit status: 1".to_string(),
                    stderr: "encoder crashed".to_string(),
                });
            }
            std::fs::write(output_path, b"video")?;
            Ok(())
        }
    }

    fn narration(seconds: f64) -> NarrationAsset {
        NarrationAsset {
            file_path: PathBuf::from("/tmp/tts.mp3"),
            duration_seconds: seconds,
        }
    }

    fn composer() -> VideoComposer<RecordingEncoder> {
        VideoComposer::new(RecordingEncoder::default())
    }

    fn filter_graph(args: &[String]) -> &str {
        &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1]
    }

    #[test]
    fn test_short_narration_is_padded_to_floor() {
        for secs in [0.0, 0.4, 2.5, 4.999] {
            let spec = composer().layout("Title", &narration(secs), None);
            assert_eq!(spec.duration_seconds, 5.0);
        }
    }

    #[test]
    fn test_long_narration_sets_duration() {
        for secs in [5.0, 7.25, 63.1] {
            let spec = composer().layout("Title", &narration(secs), None);
            assert_eq!(spec.duration_seconds, secs);
        }
        assert_eq!(clip_duration(f64::NAN, 5.0), 5.0);
    }

    #[test]
    fn test_layout_geometry() {
        let title = "Officials confirm the bridge will reopen next week after repairs finish";
        let spec = composer().layout(title, &narration(8.0), None);

        assert_eq!(spec.resolution, (1280, 720));
        assert_eq!(spec.fps, 24);
        assert_eq!(spec.header_text, "BREAKING NEWS");
        assert_eq!(spec.header_bar, Rect { x: 0, y: 0, width: 1280, height: 80 });
        assert_eq!(spec.title_lines.len(), 2);
        assert_eq!(spec.title_box_padding, 20);
        assert_eq!(spec.title_bottom_margin, 40);
        assert_eq!(spec.title_min_y(), 100);
    }

    #[test]
    fn test_empty_title_has_no_title_layer() {
        let spec = composer().layout("", &narration(1.0), None);
        assert!(spec.title_lines.is_empty());

        let args = FfmpegEncoder::default().build_args(
            &spec,
            Path::new("/w/tts.mp3"),
            Path::new("/t/title.txt"),
            Path::new("/t/header.txt"),
            Path::new("/o/news.mp4"),
        );
        let graph = filter_graph(&args);
        assert!(!graph.contains("title.txt"));
        assert!(graph.contains("header.txt"));
    }

    #[tokio::test]
    async fn test_compose_missing_image_uses_solid_fill() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out/news.mp4");
        let ghost = ImageAsset {
            file_path: tmp.path().join("gone.jpg"),
            width: 1280,
            height: 720,
        };

        let c = composer();
        let written = c.compose("Title", &narration(3.0), &out, Some(&ghost)).await.unwrap();

        assert_eq!(written, out);
        assert!(out.exists());
        let specs = c.encoder().specs.lock().unwrap();
        assert_eq!(specs.len(), 1);
        assert!(specs[0].background.is_none());
        assert_eq!(specs[0].duration_seconds, 5.0);
    }

    #[test]
    fn test_ffmpeg_args_solid_background() {
        let spec = composer().layout("Storm warning", &narration(6.5), None);
        let args = FfmpegEncoder::default().build_args(
            &spec,
            Path::new("/w/tts.mp3"),
            Path::new("/t/title.txt"),
            Path::new("/t/header.txt"),
            Path::new("/o/news.mp4"),
        );
        let joined = args.join(" ");

        assert!(joined.contains("-f lavfi -i color=c=0x141414:s=1280x720:r=24"));
        assert!(joined.contains("-i /w/tts.mp3"));
        assert!(joined.contains("box=1:boxcolor=0x960000@1.0:boxborderw=20"));
        assert!(joined.contains("y='max(100,h-text_h-60)'"));
        assert!(joined.contains("textfile='/t/title.txt'"));
        assert!(joined.contains("drawbox=x=0:y=0:w=1280:h=80:color=0xC80000@1.0:t=fill"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-c:a aac"));
        assert!(joined.contains("-r 24"));
        assert!(joined.contains("-t 6.500"));
        assert_eq!(args.last().map(String::as_str), Some("/o/news.mp4"));

        let graph = filter_graph(&args);
        assert_eq!(graph.matches("drawtext=").count(), 2);
        assert_eq!(graph.matches(":expansion=none").count(), 2);
        assert_eq!(graph.matches("drawbox=").count(), 1, "only the header bar is a drawbox");
        let title_at = graph.find("title.txt").unwrap();
        let header_box_at = graph.find("0xC80000").unwrap();
        assert!(title_at < header_box_at, "header bar must be drawn over the title");
    }

    #[test]
    fn test_title_box_does_not_depend_on_glyph_widths() {
        let build = |title: &str| {
            let spec = composer().layout(title, &narration(6.0), None);
            let args = FfmpegEncoder::default().build_args(
                &spec,
                Path::new("/w/tts.mp3"),
                Path::new("/t/title.txt"),
                Path::new("/t/header.txt"),
                Path::new("/o/news.mp4"),
            );
            filter_graph(&args).to_string()
        };

        assert_eq!(build(&"i".repeat(50)), build(&"W".repeat(50)));
    }

    #[cfg(unix)]
    fn leftover_text_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("news_title_") || name.starts_with("news_header_"))
            .collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_encoder_failure_reports_status_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("news.mp4");
        let c = VideoComposer::new(FfmpegEncoder::new("false", None).with_temp_dir(tmp.path()));

        let err = c.compose("Storm", &narration(1.0), &out, None).await.unwrap_err();

        match err {
            ComposeError::Encoder { status, .. } => assert!(status.contains('1'), "status was {status}"),
            other => panic!("expected Encoder, got {other:?}"),
        }
        assert!(leftover_text_files(tmp.path()).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_encoder_success_without_file_is_missing_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("news.mp4");
        let c = VideoComposer::new(FfmpegEncoder::new("true", None).with_temp_dir(tmp.path()));

        let err = c.compose("Storm", &narration(1.0), &out, None).await.unwrap_err();

        assert!(matches!(err, ComposeError::MissingOutput(ref p) if p == &out), "got {err:?}");
        assert!(leftover_text_files(tmp.path()).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_percent_in_title_reaches_encoder_verbatim() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let texts = tempfile::tempdir().unwrap();
        let script = tmp.path().join("fake-ffmpeg.sh");
        let args_log = tmp.path().join("args.log");
        let title_log = tmp.path().join("title.log");
        // Logs its arguments, copies the title text file, then creates the
        // output named by the last argument.
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 printf '%s\\n' \"$@\" > '{args}'\n\
                 for a in \"$@\"; do last=\"$a\"; done\n\
                 cat {dir}/news_title_* > '{title}'\n\
                 : > \"$last\"\n",
                args = args_log.display(),
                title = title_log.display(),
                dir = texts.path().display(),
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let out = tmp.path().join("news.mp4");
        let encoder = FfmpegEncoder::new(script.display().to_string(), None).with_temp_dir(texts.path());
        let c = VideoComposer::new(encoder);

        c.compose("Inflation hits 3.2% in March", &narration(2.0), &out, None)
            .await
            .unwrap();

        assert!(out.exists());
        let args = std::fs::read_to_string(&args_log).unwrap();
        assert_eq!(args.matches(":expansion=none").count(), 2);
        assert_eq!(std::fs::read_to_string(&title_log).unwrap(), "Inflation hits 3.2% in March");
        assert!(leftover_text_files(texts.path()).is_empty());
    }

    #[test]
    fn test_stderr_tail_keeps_char_boundaries() {
        assert_eq!(stderr_tail("short", 100), "short");
        assert_eq!(stderr_tail("abcdef", 3), "def");
        // 'é' is two bytes; a cut through it moves forward to the next char.
        assert_eq!(stderr_tail("aéb", 2), "b");
        assert_eq!(stderr_tail("aéb", 3), "éb");
        let long = format!("{}last line", "x".repeat(5000));
        assert_eq!(stderr_tail(&long, STDERR_TAIL_BYTES).len(), STDERR_TAIL_BYTES);
        assert!(stderr_tail(&long, STDERR_TAIL_BYTES).ends_with("last line"));
    }

    #[test]
    fn test_ffmpeg_args_image_background_and_font() {
        let image = ImageAsset {
            file_path: PathBuf::from("/w/article_image.jpg"),
            width: 1280,
            height: 720,
        };
        let spec = composer().layout("Storm", &narration(2.0), Some(&image));
        let args = FfmpegEncoder::new("ffmpeg", Some(PathBuf::from("/fonts/Bold.ttf"))).build_args(
            &spec,
            Path::new("/w/tts.mp3"),
            Path::new("/t/title.txt"),
            Path::new("/t/header.txt"),
            Path::new("/o/news.mp4"),
        );
        let joined = args.join(" ");

        assert!(joined.contains("-loop 1 -framerate 24 -i /w/article_image.jpg"));
        assert!(!joined.contains("lavfi"));
        assert!(joined.contains("scale=1280:720"));
        assert!(joined.contains(":fontfile='/fonts/Bold.ttf'"));
        assert!(joined.contains("-t 5.000"));
    }

    #[test]
    fn test_quote_filter_value() {
        assert_eq!(quote_filter_value("/tmp/a.txt"), "'/tmp/a.txt'");
        assert_eq!(quote_filter_value("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(BACKGROUND_COLOR.hex(), "0x141414");
        assert_eq!(TITLE_BOX_COLOR.hex(), "0x960000");
    }
}
