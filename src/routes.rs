use std::collections::HashMap;

use serde::Serialize;
use timetable_normalize::{Selection, XLSX_MIME_TYPE, download_file_name, extract_subjects};
use worker::{Context, Env, Request, Response, Result, RouteContext, Router};

use crate::error::ApiError;
use crate::models::{
    CAMPUS_SOURCES_VAR, CampusListResponse, CampusSource, SubjectsResponse, campus_slug,
    default_campus_sources, parse_campus_sources,
};
use crate::timetable_pipeline::{self, TableCacheStatus};

#[derive(Debug, Clone)]
pub struct AppState {
    pub sources: Vec<CampusSource>,
}

/// Campus catalogue from `CAMPUS_SOURCES`, or the built-in defaults.
pub fn campus_sources_from_env(env: &Env) -> Vec<CampusSource> {
    let Ok(raw) = env.var(CAMPUS_SOURCES_VAR).map(|value| value.to_string()) else {
        return default_campus_sources();
    };

    parse_campus_sources(&raw).unwrap_or_else(|error| {
        worker::console_error!("ignoring invalid {CAMPUS_SOURCES_VAR}: {error}");
        default_campus_sources()
    })
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let state = AppState {
        sources: campus_sources_from_env(&env),
    };

    Router::with_data(state)
        .get_async("/api/v1/campuses", campuses_route)
        .get_async("/api/v1/subjects", subjects_route)
        .get_async("/api/v1/timetable", timetable_route)
        .run(req, env)
        .await
}

async fn campuses_route(_req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    json_response(&CampusListResponse {
        items: ctx.data.sources.clone(),
    })
}

async fn subjects_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match subjects_response(&req, &ctx.data.sources).await {
        Ok((response, status)) => {
            let mut response_out = json_response(&response)?;
            response_out
                .headers_mut()
                .set("X-Cache-Status", status.as_header_value())?;
            Ok(response_out)
        }
        Err(error) => error.into_response(),
    }
}

async fn timetable_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match timetable_response(&req, &ctx.data.sources).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn subjects_response(
    req: &Request,
    sources: &[CampusSource],
) -> Result<(SubjectsResponse, TableCacheStatus), ApiError> {
    let query = parse_query(req)?;
    let source = resolve_campus(sources, parse_campus_query(&query)?)?;
    let (cached, status) = load_table(source, parse_force_query(&query)).await?;

    let subjects = extract_subjects(&cached.table);
    let response = SubjectsResponse {
        campus: cached.campus.clone(),
        manual_entry_required: subjects.is_empty(),
        subjects: subjects.into_vec(),
        row_labels: cached
            .table
            .distinct_row_labels()
            .into_iter()
            .map(str::to_string)
            .collect(),
        fetched_at: cached.fetched_at,
        cached: status == TableCacheStatus::Hit,
    };
    Ok((response, status))
}

async fn timetable_response(req: &Request, sources: &[CampusSource]) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let source = resolve_campus(sources, parse_campus_query(&query)?)?;
    let selection = parse_subjects_query(&query);
    if selection.is_empty() {
        return Err(ApiError::EmptySelection(
            "select at least one subject to generate a timetable".to_string(),
        ));
    }

    let (cached, status) = load_table(source, parse_force_query(&query)).await?;
    let workbook = timetable_pipeline::build_personal_workbook(&cached.table, &selection)?;

    let mut response = Response::from_bytes(workbook)?;
    response.headers_mut().set("Content-Type", XLSX_MIME_TYPE)?;
    response.headers_mut().set(
        "Content-Disposition",
        &format!(
            "attachment; filename=\"{}\"",
            download_file_name(&source.campus)
        ),
    )?;
    response
        .headers_mut()
        .set("X-Cache-Status", status.as_header_value())?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

async fn load_table(
    source: &CampusSource,
    force: bool,
) -> Result<(crate::models::CachedTable, TableCacheStatus), ApiError> {
    if force {
        timetable_pipeline::rebuild_table_with_status(source).await
    } else {
        timetable_pipeline::get_or_build_table_with_status(source).await
    }
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

pub fn parse_campus_query(query: &HashMap<String, String>) -> Result<&str, ApiError> {
    query
        .get("campus")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest("campus query parameter is required".to_string()))
}

pub fn parse_subjects_query(query: &HashMap<String, String>) -> Selection {
    query
        .get("subjects")
        .map(|value| Selection::parse_list(value))
        .unwrap_or_default()
}

pub fn parse_force_query(query: &HashMap<String, String>) -> bool {
    query.get("force").is_some_and(|value| {
        let lowered = value.trim().to_ascii_lowercase();
        lowered == "true" || lowered == "1" || lowered == "yes"
    })
}

/// Finds a campus by name, ignoring case, or by its slug.
pub fn resolve_campus<'a>(
    sources: &'a [CampusSource],
    campus: &str,
) -> Result<&'a CampusSource, ApiError> {
    let wanted = campus_slug(campus);
    sources
        .iter()
        .find(|source| {
            source.campus.eq_ignore_ascii_case(campus) || campus_slug(&source.campus) == wanted
        })
        .ok_or_else(|| ApiError::NotFound(format!("unknown campus '{campus}'")))
}
