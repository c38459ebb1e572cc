//! Document sources: where schema text comes from

use async_trait::async_trait;
use linkml_core::error::{LinkMLError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Location of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaLocation {
    /// Local file
    File(PathBuf),
    /// Remote document fetched over HTTP(S)
    Url(Url),
}

impl SchemaLocation {
    /// Interpret a string as a URL (`http`, `https`, `file`) or a local path
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ParseError` for malformed URLs.
    pub fn parse(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let url = Url::parse(location)
                .map_err(|e| LinkMLError::parse(format!("Invalid URL '{location}': {e}")))?;
            return Ok(Self::Url(url));
        }
        if location.starts_with("file://") {
            let url = Url::parse(location)
                .map_err(|e| LinkMLError::parse(format!("Invalid URL '{location}': {e}")))?;
            let path = url
                .to_file_path()
                .map_err(|()| LinkMLError::parse(format!("Not a local file URL: {location}")))?;
            return Ok(Self::File(path));
        }
        Ok(Self::File(PathBuf::from(location)))
    }

    /// Document format implied by the extension, `yaml` when there is none
    #[must_use]
    pub fn format(&self) -> &'static str {
        let extension = match self {
            Self::File(path) => path.extension().and_then(|e| e.to_str()).map(str::to_string),
            Self::Url(url) => Path::new(url.path())
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string),
        };
        match extension.as_deref() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => "json",
            _ => "yaml",
        }
    }

    /// Whether the last path segment carries an extension
    #[must_use]
    pub fn has_extension(&self) -> bool {
        match self {
            Self::File(path) => path.extension().is_some(),
            Self::Url(url) => Path::new(url.path()).extension().is_some(),
        }
    }

    /// Append `.{extension}` to the last path segment
    #[must_use]
    pub fn with_extension(&self, extension: &str) -> Self {
        match self {
            Self::File(path) => {
                let mut os = path.clone().into_os_string();
                os.push(format!(".{extension}"));
                Self::File(PathBuf::from(os))
            }
            Self::Url(url) => {
                let mut url = url.clone();
                let path = format!("{}.{extension}", url.path());
                url.set_path(&path);
                Self::Url(url)
            }
        }
    }

    /// Resolve `relative` against the directory holding this document
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ParseError` if the URL join fails.
    pub fn sibling(&self, relative: &str) -> Result<Self> {
        match self {
            Self::File(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::File(dir.join(relative)))
            }
            Self::Url(url) => url
                .join(relative)
                .map(Self::Url)
                .map_err(|e| LinkMLError::parse(format!("Cannot resolve '{relative}' against {url}: {e}"))),
        }
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Source of raw schema text
///
/// Import loading goes through this trait so callers can serve documents
/// from memory, a cache or a sandbox instead of the network.
#[async_trait]
pub trait SchemaSource: Send + Sync + fmt::Debug {
    /// Read the document at `location`
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::IoError` for local failures and
    /// `LinkMLError::ImportLoadError` for remote ones.
    async fn read(&self, location: &SchemaLocation) -> Result<String>;

    /// Whether a document exists at `location`
    async fn exists(&self, location: &SchemaLocation) -> bool;
}

/// Reads local files with `tokio::fs` and remote documents with `reqwest`
#[derive(Debug, Clone, Default)]
pub struct DefaultSchemaSource {
    http_client: reqwest::Client,
}

impl DefaultSchemaSource {
    /// Create a new source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchemaSource for DefaultSchemaSource {
    async fn read(&self, location: &SchemaLocation) -> Result<String> {
        match location {
            SchemaLocation::File(path) => Ok(tokio::fs::read_to_string(path).await?),
            SchemaLocation::Url(url) => {
                let response = self
                    .http_client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| LinkMLError::import(url.as_str(), format!("Failed to fetch URL: {e}")))?;

                if !response.status().is_success() {
                    return Err(LinkMLError::import(
                        url.as_str(),
                        format!(
                            "HTTP error {}: {}",
                            response.status(),
                            response.status().canonical_reason().unwrap_or("Unknown")
                        ),
                    ));
                }

                response
                    .text()
                    .await
                    .map_err(|e| LinkMLError::import(url.as_str(), format!("Failed to read response: {e}")))
            }
        }
    }

    async fn exists(&self, location: &SchemaLocation) -> bool {
        match location {
            SchemaLocation::File(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            // Remote existence is only known by fetching.
            SchemaLocation::Url(_) => true,
        }
    }
}
