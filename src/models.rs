use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use timetable_normalize::NormalizedTable;

use crate::error::ApiError;

pub const CAMPUS_SOURCES_VAR: &str = "CAMPUS_SOURCES";
pub const DEFAULT_CAMPUS_SOURCES: [(&str, &str); 2] = [
    (
        "New Delhi",
        "https://docs.google.com/spreadsheets/d/1hxMVAdZM-aaHY1IDy7Hg8wLPdevSEhVx/edit?usp=sharing&ouid=106900160560444308561&rtpof=true&sd=true",
    ),
    (
        "Gurgaon",
        "https://docs.google.com/spreadsheets/d/1owRJJCGwo9J5o24grEM3IWHECb4oE2NL/edit?usp=sharing&ouid=106900160560444308561&rtpof=true&sd=true",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampusSource {
    pub campus: String,
    pub url: String,
}

#[must_use]
pub fn default_campus_sources() -> Vec<CampusSource> {
    DEFAULT_CAMPUS_SOURCES
        .iter()
        .map(|(campus, url)| CampusSource {
            campus: (*campus).to_string(),
            url: (*url).to_string(),
        })
        .collect()
}

/// Parses a `{ "<campus>": "<share url>" }` override, sorted by campus name.
pub fn parse_campus_sources(raw: &str) -> Result<Vec<CampusSource>, ApiError> {
    let entries = serde_json::from_str::<BTreeMap<String, String>>(raw)?;
    if entries.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "{CAMPUS_SOURCES_VAR} must name at least one campus"
        )));
    }

    Ok(entries
        .into_iter()
        .map(|(campus, url)| CampusSource { campus, url })
        .collect())
}

/// Lower-cased campus name with runs of other characters collapsed to `-`.
#[must_use]
pub fn campus_slug(campus: &str) -> String {
    campus
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalized table of one campus as stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedTable {
    pub campus: String,
    pub fetched_at: String,
    pub table: NormalizedTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampusListResponse {
    pub items: Vec<CampusSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectsResponse {
    pub campus: String,
    pub subjects: Vec<String>,
    pub manual_entry_required: bool,
    pub row_labels: Vec<String>,
    pub fetched_at: String,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
