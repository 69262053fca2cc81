//! Article list sources.
//!
//! The operator's list of `{Title, URL}` rows is read once per session
//! through [`RecordSource`]. Two sources exist:
//!
//! - [`SheetSource`]: a worksheet read through the Google Sheets v4 API,
//!   first row as header, like a `get_all_records` call
//! - [`FileSource`]: a local YAML or JSON file holding the same rows

use crate::config::Credentials;
use crate::error::SourceError;
use crate::models::ArticleRef;
use crate::utils::http_client;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Supplies the ordered article list.
pub trait RecordSource {
    async fn load_records(&self) -> Result<Vec<ArticleRef>, SourceError>;
}

/// Worksheet of a Google spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetSource {
    client: Client,
    api_base: String,
    sheet_key: String,
    worksheet: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetSource {
    /// Reader for `worksheet` of the spreadsheet `sheet_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        sheet_key: impl Into<String>,
        worksheet: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(Duration::from_secs(15))?,
            api_base: "https://sheets.googleapis.com".to_string(),
            sheet_key: sheet_key.into(),
            worksheet: worksheet.into(),
            credentials,
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| SourceError::Parse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Parse(format!("{} cannot be a base URL", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.sheet_key.as_str(), "values", self.worksheet.as_str()]);
        Ok(url)
    }
}

impl RecordSource for SheetSource {
    #[instrument(level = "info", skip(self), fields(sheet = %self.sheet_key, worksheet = %self.worksheet))]
    async fn load_records(&self) -> Result<Vec<ArticleRef>, SourceError> {
        let mut request = self.client.get(self.values_url()?);
        request = match (&self.credentials.access_token, &self.credentials.api_key) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(key)) => request.query(&[("key", key.as_str())]),
            (None, None) => {
                return Err(SourceError::Credentials(
                    "credentials file holds neither access_token nor api_key".to_string(),
                ));
            }
        };

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        let range: ValueRange = resp.json().await?;
        let records = rows_to_records(range.values)?;
        info!(count = records.len(), "Loaded sheet records");
        Ok(records)
    }
}

/// Turn a header row plus data rows into records.
///
/// Column names are matched case-insensitively; rows without a URL are
/// skipped.
fn rows_to_records(rows: Vec<Vec<String>>) -> Result<Vec<ArticleRef>, SourceError> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let column = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let url_col = column("url").ok_or(SourceError::MissingColumn("URL"))?;
    let title_col = column("title");

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        let url = row.get(url_col).map(|s| s.trim()).unwrap_or_default();
        if url.is_empty() {
            warn!(row = i + 2, "Skipping row without URL");
            continue;
        }
        let title = title_col
            .and_then(|c| row.get(c))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        records.push(ArticleRef {
            title,
            url: url.to_string(),
        });
    }
    Ok(records)
}

/// Article list stored in a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    async fn load_records(&self) -> Result<Vec<ArticleRef>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let records: Vec<ArticleRef> = if is_json {
            serde_json::from_str(&raw).map_err(|e| SourceError::Parse(e.to_string()))?
        } else {
            serde_yaml::from_str(&raw).map_err(|e| SourceError::Parse(e.to_string()))?
        };

        let records: Vec<ArticleRef> = records
            .into_iter()
            .filter(|r| !r.url.trim().is_empty())
            .collect();
        debug!(count = records.len(), "Loaded file records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_rows_to_records() {
        let records = rows_to_records(rows(&[
            &["Title", "URL", "Notes"],
            &["First", "https://example.com/1", "x"],
            &["No link", ""],
            &["Second", " https://example.com/2 "],
        ]))
        .unwrap();

        assert_eq!(
            records,
            vec![
                ArticleRef {
                    title: "First".to_string(),
                    url: "https://example.com/1".to_string()
                },
                ArticleRef {
                    title: "Second".to_string(),
                    url: "https://example.com/2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_rows_without_url_column() {
        let err = rows_to_records(rows(&[&["Title", "Link"], &["a", "b"]])).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn("URL")));
    }

    #[test]
    fn test_empty_sheet() {
        assert!(rows_to_records(Vec::new()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sheet_source_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet123/values/Sheet1"))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"range": "Sheet1!A1:B3", "values": [["Title", "URL"], ["Storm", "https://example.com/storm"]]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let creds = Credentials {
            api_key: Some("k".to_string()),
            access_token: None,
        };
        let source = SheetSource::new("sheet123", "Sheet1", creds).unwrap().with_api_base(server.uri());
        let records = source.load_records().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Storm");
    }

    #[tokio::test]
    async fn test_sheet_source_with_token_and_spaced_worksheet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/abc/values/Daily%20News"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"values": []}"#))
            .expect(1)
            .mount(&server)
            .await;

        let creds = Credentials {
            api_key: None,
            access_token: Some("tok".to_string()),
        };
        let source = SheetSource::new("abc", "Daily News", creds).unwrap().with_api_base(server.uri());
        assert!(source.load_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sheet_source_requires_credentials() {
        let source = SheetSource::new("abc", "Sheet1", Credentials::default()).unwrap();
        let err = source.load_records().await.unwrap_err();
        assert!(matches!(err, SourceError::Credentials(_)));
    }

    #[tokio::test]
    async fn test_sheet_source_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let creds = Credentials {
            api_key: Some("k".to_string()),
            access_token: None,
        };
        let source = SheetSource::new("abc", "Sheet1", creds).unwrap().with_api_base(server.uri());
        assert!(matches!(
            source.load_records().await.unwrap_err(),
            SourceError::Status(403)
        ));
    }

    #[tokio::test]
    async fn test_file_source_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- Title: Storm hits coast\n  URL: https://example.com/storm\n- title: Quiet day\n  url: https://example.com/quiet\n- url: \"\""
        )
        .unwrap();

        let records = FileSource::new(file.path()).load_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Quiet day");
    }

    #[tokio::test]
    async fn test_file_source_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"[{{"Title": "A", "URL": "https://example.com/a"}}]"#).unwrap();

        let records = FileSource::new(file.path()).load_records().await.unwrap();
        assert_eq!(records[0].url, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let err = FileSource::new("/nonexistent/records.yaml")
            .load_records()
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
