use regex::Regex;
use url::Url;
use worker::Fetch;

use crate::error::ApiError;

/// Extracts the document id, the path segment after `/d/`, from a share link.
pub fn extract_document_id(share_url: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(share_url)?;
    let id_re = Regex::new(r"/d/(?P<id>[A-Za-z0-9_-]+)")
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    id_re
        .captures(parsed.path())
        .and_then(|capture| capture.name("id"))
        .map(|value| value.as_str().to_string())
        .ok_or_else(|| {
            ApiError::BadRequest(format!("no spreadsheet document id in '{share_url}'"))
        })
}

#[must_use]
pub fn workbook_export_url(document_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{document_id}/export?format=xlsx")
}

pub async fn fetch_workbook_bytes(share_url: &str) -> Result<Vec<u8>, ApiError> {
    let document_id = extract_document_id(share_url)?;
    let download = Url::parse(&workbook_export_url(&document_id))?;

    let mut response = Fetch::Url(download).send().await?;
    let status = response.status_code();
    if status >= 400 {
        return Err(ApiError::Upstream(format!(
            "failed to fetch timetable workbook: status {status}"
        )));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ApiError::Upstream(
            "fetched timetable workbook is empty".to_string(),
        ));
    }
    Ok(bytes)
}
