//! CSV upload with local pre-checks.
//!
//! The server validates headers against its schema; locally we only make
//! sure the file is a readable, non-empty CSV under the upload limit so
//! obvious mistakes never leave the machine.

use crate::api::client::InsightsClient;
use crate::api::models::IngestionResult;
use crate::error::{IngestionError, StorageError};
use std::fs;
use std::path::Path;

/// Largest file the server accepts
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// A CSV file that passed the local checks
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub file_name: String,
    pub headers: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Read `path` and run the pre-upload checks
pub fn prepare_upload(path: &Path) -> crate::Result<CsvUpload> {
    let display = path.to_string_lossy().to_string();

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(IngestionError::UnsupportedFileType { path: display }.into());
    }

    let io_error = |source| StorageError::FileIo {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let size = fs::metadata(path).map_err(io_error)?.len();
    if size == 0 {
        return Err(IngestionError::EmptyFile { path: display }.into());
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(IngestionError::FileTooLarge {
            path: display,
            size,
            limit: MAX_UPLOAD_BYTES,
        }
        .into());
    }

    let bytes = fs::read(path).map_err(io_error)?;
    let headers = read_headers(&bytes, &display)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.csv".to_string());

    Ok(CsvUpload {
        file_name,
        headers,
        bytes,
    })
}

fn read_headers(bytes: &[u8], path: &str) -> Result<Vec<String>, IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestionError::Malformed {
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(IngestionError::MissingHeader {
            path: path.to_string(),
        });
    }
    Ok(headers)
}

pub struct IngestionService<'a> {
    client: &'a InsightsClient,
}

impl<'a> IngestionService<'a> {
    pub fn new(client: &'a InsightsClient) -> Self {
        Self { client }
    }

    /// Check and upload a CSV export, replacing the server's dataset
    pub async fn upload(&self, path: &Path) -> crate::Result<IngestionResult> {
        let upload = prepare_upload(path)?;
        log::info!(
            "Uploading {} ({} bytes, {} columns)",
            upload.file_name,
            upload.bytes.len(),
            upload.headers.len()
        );
        let result = self
            .client
            .upload_csv(&upload.file_name, upload.bytes)
            .await?;
        Ok(result)
    }

    /// Restore the server's bundled sample dataset
    pub async fn reload(&self) -> crate::Result<IngestionResult> {
        Ok(self.client.reload_sample().await?)
    }
}
