//! Command-line interface definitions for News Video.
//!
//! Every flag overrides the matching key of the YAML config. Sheet
//! settings can also come from the environment.

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Video application.
///
/// # Examples
///
/// ```sh
/// # Browse the sheet and render on request
/// news_video --sheet-key 1AbC... --creds credentials.json
///
/// # Render one article and exit
/// news_video --url https://example.com/story --title "Storm hits coast"
///
/// # Render the third record of a local list
/// news_video --records-file articles.yaml --index 2 -o third.mp4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render this article URL and exit
    #[arg(short, long, conflicts_with = "index")]
    pub url: Option<String>,

    /// Title shown for --url instead of the fetched headline
    #[arg(short, long, requires = "url")]
    pub title: Option<String>,

    /// Render the record at this zero-based position of the list and exit
    #[arg(short, long)]
    pub index: Option<usize>,

    /// Render after every navigation command, not only on `generate`
    #[arg(long)]
    pub auto_generate: bool,

    /// Output video path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Spreadsheet key of the article list
    #[arg(long, env = "NEWS_VIDEO_SHEET_KEY")]
    pub sheet_key: Option<String>,

    /// Worksheet name inside the spreadsheet
    #[arg(long, env = "NEWS_VIDEO_WORKSHEET")]
    pub worksheet: Option<String>,

    /// JSON file holding `api_key` and/or `access_token` for the sheet
    #[arg(long, env = "NEWS_VIDEO_CREDENTIALS")]
    pub creds: Option<PathBuf>,

    /// Local YAML/JSON article list used instead of the sheet
    #[arg(short, long)]
    pub records_file: Option<PathBuf>,

    /// Directory for intermediate narration and image files
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Banner text across the top of the video
    #[arg(long)]
    pub header_text: Option<String>,
}

impl Cli {
    /// Copy every flag that was given onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = &self.output {
            config.output_path = v.clone();
        }
        if let Some(v) = &self.sheet_key {
            config.sheet_key = Some(v.clone());
        }
        if let Some(v) = &self.worksheet {
            config.worksheet = v.clone();
        }
        if let Some(v) = &self.creds {
            config.credentials_file = v.clone();
        }
        if let Some(v) = &self.records_file {
            config.records_file = Some(v.clone());
        }
        if let Some(v) = &self.work_dir {
            config.work_dir = v.clone();
        }
        if let Some(v) = &self.header_text {
            config.header_text = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_video",
            "--url",
            "https://example.com/story",
            "--title",
            "Storm",
            "--output",
            "./out.mp4",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://example.com/story"));
        assert_eq!(cli.title.as_deref(), Some("Storm"));
        assert_eq!(cli.output, Some(PathBuf::from("./out.mp4")));
        assert_eq!(cli.index, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_video", "-r", "/tmp/list.yaml", "-i", "2", "-o", "/tmp/v.mp4"]);

        assert_eq!(cli.records_file, Some(PathBuf::from("/tmp/list.yaml")));
        assert_eq!(cli.index, Some(2));
        assert!(!cli.auto_generate);
    }

    #[test]
    fn test_url_and_index_conflict() {
        let res = Cli::try_parse_from(["news_video", "--url", "https://example.com", "--index", "1"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_title_requires_url() {
        let res = Cli::try_parse_from(["news_video", "--title", "Orphan"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli::parse_from([
            "news_video",
            "--work-dir",
            "/tmp/nv",
            "--header-text",
            "LIVE",
            "--worksheet",
            "Today",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.work_dir, PathBuf::from("/tmp/nv"));
        assert_eq!(config.header_text, "LIVE");
        assert_eq!(config.worksheet, "Today");
        assert_eq!(config.output_path, PathBuf::from("news_output.mp4"));
        assert!(cli.url.is_none() && cli.index.is_none());
    }
}
