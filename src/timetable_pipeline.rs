use chrono::{DateTime, SecondsFormat};
use timetable_normalize::{
    ExportOptions, NormalizationReport, NormalizeOptions, NormalizedTable, Personalized, Selection,
    export_personal_timetable, normalize_workbook_bytes, personalize,
};

use crate::cache;
use crate::error::ApiError;
use crate::models::{CachedTable, CampusSource, campus_slug};
use crate::source_fetch;

pub const TABLE_CACHE_TTL_SECONDS: u32 = 6 * 60 * 60;
pub const TABLE_CACHE_KEY_PREFIX: &str = "table:campus:v1:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCacheStatus {
    Hit,
    Miss,
    Bypass,
}

impl TableCacheStatus {
    pub const fn as_header_value(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

pub fn table_cache_key(campus: &str) -> String {
    format!("{TABLE_CACHE_KEY_PREFIX}{}", campus_slug(campus))
}

/// RFC 3339 timestamp for a Unix time in milliseconds.
pub fn format_fetched_at(unix_millis: i64) -> String {
    DateTime::from_timestamp_millis(unix_millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub async fn get_or_build_table_with_status(
    source: &CampusSource,
) -> Result<(CachedTable, TableCacheStatus), ApiError> {
    let cache_key = table_cache_key(&source.campus);
    if let Some(cached) = cache::read_json::<CachedTable>(&cache_key).await? {
        return Ok((cached, TableCacheStatus::Hit));
    }

    let built = build_table_from_source(source).await?;
    put_table_in_cache(&built).await?;
    Ok((built, TableCacheStatus::Miss))
}

pub async fn rebuild_table_with_status(
    source: &CampusSource,
) -> Result<(CachedTable, TableCacheStatus), ApiError> {
    let built = build_table_from_source(source).await?;
    put_table_in_cache(&built).await?;
    Ok((built, TableCacheStatus::Bypass))
}

async fn put_table_in_cache(cached: &CachedTable) -> Result<(), ApiError> {
    cache::write_json(
        &table_cache_key(&cached.campus),
        cached,
        TABLE_CACHE_TTL_SECONDS,
    )
    .await
}

pub async fn sync_all_campuses(sources: &[CampusSource]) -> Result<(), ApiError> {
    if sources.is_empty() {
        return Err(ApiError::NotFound("no campus sources configured".to_string()));
    }

    for source in sources {
        if let Err(error) = rebuild_table_with_status(source).await {
            worker::console_error!(
                "timetable sync failed for campus {} ({}): {}",
                source.campus,
                source.url,
                error
            );
        }
    }

    Ok(())
}

async fn build_table_from_source(source: &CampusSource) -> Result<CachedTable, ApiError> {
    let workbook = source_fetch::fetch_workbook_bytes(&source.url).await?;
    let now_millis = i64::try_from(worker::Date::now().as_millis()).unwrap_or(i64::MAX);
    let (cached, report) =
        normalize_campus_workbook(&source.campus, &workbook, format_fetched_at(now_millis))?;

    worker::console_log!(
        "timetable normalization completed: campus={}, rows={}, columns={}, subjects={}, merged_regions={}",
        source.campus,
        report.row_count,
        report.column_count,
        report.subject_count,
        report.merged_region_count
    );
    for warning in &report.warnings {
        worker::console_log!(
            "timetable warning for {}: {:?} {}",
            source.campus,
            warning.code,
            warning.message
        );
    }

    Ok(cached)
}

pub fn normalize_campus_workbook(
    campus: &str,
    workbook: &[u8],
    fetched_at: String,
) -> Result<(CachedTable, NormalizationReport), ApiError> {
    let (table, report) = normalize_workbook_bytes(workbook, &NormalizeOptions::default())?;
    let cached = CachedTable {
        campus: campus.to_string(),
        fetched_at,
        table,
    };
    Ok((cached, report))
}

/// Filters `table` by `selection` and renders the workbook download.
pub fn build_personal_workbook(
    table: &NormalizedTable,
    selection: &Selection,
) -> Result<Vec<u8>, ApiError> {
    match personalize(table, selection) {
        Personalized::Table(personal) => {
            Ok(export_personal_timetable(&personal, &ExportOptions::default())?)
        }
        Personalized::NothingSelected(warning) => Err(ApiError::EmptySelection(warning.message)),
    }
}
