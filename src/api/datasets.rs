//! Dataset endpoints

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use super::types::{Dataset, DatasetPage, DatasetQuery};
use crate::error::{ClientError, Result};
use crate::http::{AuthenticatedClient, PendingRequest, RawResponse, decode_payload};
use crate::utils::percent_encode;

/// `/datasets/*` endpoints
#[derive(Debug, Clone, Copy)]
pub struct DatasetsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> DatasetsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Search datasets
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request or undecodable body.
    pub async fn list(&self, query: &DatasetQuery) -> Result<DatasetPage> {
        let mut request = PendingRequest::get("/datasets");
        request.query = query.to_query();
        self.client.request_json(request).await
    }

    /// Fetch one dataset
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` with status 404 for an unknown id.
    pub async fn detail(&self, id: &str) -> Result<Dataset> {
        self.client
            .request_json(PendingRequest::get(dataset_path(id, "")))
            .await
    }

    /// All category names
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request or undecodable body.
    pub async fn categories(&self) -> Result<Vec<String>> {
        self.client
            .request_json(PendingRequest::get("/datasets/categories"))
            .await
    }

    /// Count a view of the dataset
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request.
    pub async fn record_view(&self, id: &str) -> Result<()> {
        self.client
            .request(PendingRequest::post(dataset_path(id, "/view")))
            .await?;
        Ok(())
    }

    /// Count a download and return the data file URL
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request, or `ClientError::JsonDecode`
    /// if the body carries no URL.
    pub async fn download(&self, id: &str) -> Result<String> {
        let response = self
            .client
            .request(PendingRequest::get(dataset_path(id, "/download")))
            .await?;
        download_url(&response)
    }

    /// Export the dataset as CSV
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request.
    pub async fn download_csv(&self, id: &str) -> Result<Download> {
        let response = self
            .client
            .request(
                PendingRequest::get(dataset_path(id, "/download.csv")).header("Accept", "text/csv"),
            )
            .await?;

        let file_name = response
            .header("content-disposition")
            .and_then(content_disposition_file_name)
            .unwrap_or_else(|| format!("{id}.csv"));

        Ok(Download {
            content_type: response.header("content-type").map(str::to_string),
            file_name,
            bytes: response.body,
        })
    }
}

/// A downloaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Content type reported by the server
    pub content_type: Option<String>,
    /// File name from `Content-Disposition`, or `<id>.csv`
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the file into `dir` and return its path
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the file cannot be written.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "Saved download");
        Ok(path)
    }
}

fn dataset_path(id: &str, suffix: &str) -> String {
    format!("/datasets/{}{suffix}", percent_encode(id))
}

/// The download endpoint answers with a bare URL, a JSON string, or an object
/// holding the URL.
fn download_url(response: &RawResponse) -> Result<String> {
    let text = response.text();
    let trimmed = text.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(trimmed.to_string());
    }

    let value: serde_json::Value = decode_payload(&response.body)?;
    let url = match &value {
        serde_json::Value::String(url) => Some(url.clone()),
        serde_json::Value::Object(map) => ["url", "downloadUrl", "dataUrl"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string),
        _ => None,
    };

    url.ok_or_else(|| {
        ClientError::JsonDecode(<serde_json::Error as serde::de::Error>::custom(format!(
            "no download URL in response: {value}"
        )))
    })
}

/// Extract a safe file name from a `Content-Disposition` header
fn content_disposition_file_name(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for part in header.split(';').map(str::trim) {
        if let Some(value) = part.strip_prefix("filename*=") {
            // RFC 5987: charset'language'value
            extended = value
                .rsplit('\'')
                .next()
                .and_then(|encoded| percent_decode_str(encoded).decode_utf8().ok())
                .map(|decoded| decoded.into_owned());
        } else if let Some(value) = part.strip_prefix("filename=") {
            plain = Some(value.trim_matches('"').to_string());
        }
    }

    let name = extended.or(plain)?;
    Path::new(&name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
